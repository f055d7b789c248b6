//! Vesting status summary for a single grant

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{GrantRecord, GrantStore};
use crate::error::{Result, VestingError};
use crate::grant::GrantStatus;
use crate::schedule::calculate_vesting_schedule;

/// Current vesting position of a grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingStatus {
    pub grant_id: String,
    pub total_granted: u64,
    pub vested: u64,
    pub unvested: u64,
    pub forfeited: u64,
    pub exercised: u64,

    /// Vested shares not yet exercised
    pub exercisable: u64,

    /// Date and size of the next pending tranche, if any
    pub next_vest_date: Option<NaiveDate>,
    pub next_vest_shares: Option<u64>,
}

/// Reports vesting status from a grant store
#[derive(Debug, Clone)]
pub struct VestingStatusReporter<S> {
    store: S,
}

impl<S: GrantStore> VestingStatusReporter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Summarize a grant's vesting position with a single store read
    ///
    /// Store failures are returned to the caller as-is; nothing is retried here.
    pub async fn get_vesting_status(&self, grant_id: &str) -> Result<VestingStatus> {
        let record = self
            .store
            .fetch_grant(grant_id)
            .await?
            .ok_or_else(|| VestingError::NotFound {
                grant_id: grant_id.to_string(),
            })?;

        summarize(&record)
    }
}

fn summarize(record: &GrantRecord) -> Result<VestingStatus> {
    let grant = &record.grant;
    grant.check_counters()?;

    // Only active grants have anything left to vest
    let next = if grant.status != GrantStatus::Active {
        None
    } else if record.tranches.is_empty() {
        // No persisted history: take the next tranche from a fresh schedule
        calculate_vesting_schedule(grant)?
            .into_iter()
            .find(|t| t.cumulative_shares > grant.shares_vested)
    } else {
        record
            .tranches
            .iter()
            .filter(|t| t.is_pending())
            .min_by_key(|t| t.vest_date)
            .cloned()
    };

    log::debug!(
        "grant {}: {} vested, {} unvested, next vest {:?}",
        grant.id,
        grant.shares_vested,
        grant.shares_remaining,
        next.as_ref().map(|t| t.vest_date)
    );

    Ok(VestingStatus {
        grant_id: grant.id.clone(),
        total_granted: grant.shares_granted,
        vested: grant.shares_vested,
        unvested: grant.shares_remaining,
        forfeited: grant.shares_forfeited,
        exercised: grant.shares_exercised,
        exercisable: grant.shares_exercisable(),
        next_vest_date: next.as_ref().map(|t| t.vest_date),
        next_vest_shares: next.map(|t| t.shares_vesting),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grant::{GrantType, StockGrant, VestingFrequency, VestingSchedule};
    use crate::schedule::{TrancheStatus, VestingTranche};
    use crate::status::InMemoryGrantStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn grant(id: &str) -> StockGrant {
        StockGrant::new(
            id,
            "E-1",
            "C-1",
            GrantType::Rsu,
            date(2024, 1, 15),
            4_800,
            VestingSchedule::standard_four_year(VestingFrequency::Monthly),
        )
    }

    fn vested_after_cliff(id: &str) -> StockGrant {
        let mut g = grant(id);
        g.shares_vested = 1_300;
        g.shares_remaining = 3_500;
        g.shares_exercised = 300;
        g
    }

    #[tokio::test]
    async fn test_status_from_tranche_history() {
        let mut store = InMemoryGrantStore::new();
        store.insert(
            vested_after_cliff("G-1"),
            vec![
                VestingTranche {
                    vest_date: date(2025, 3, 15),
                    shares_vesting: 100,
                    cumulative_shares: 1_400,
                    status: TrancheStatus::Scheduled,
                },
                VestingTranche {
                    vest_date: date(2025, 1, 15),
                    shares_vesting: 1_200,
                    cumulative_shares: 1_200,
                    status: TrancheStatus::Vested,
                },
                VestingTranche {
                    vest_date: date(2025, 2, 15),
                    shares_vesting: 100,
                    cumulative_shares: 1_300,
                    status: TrancheStatus::Vested,
                },
            ],
        );
        let reporter = VestingStatusReporter::new(store);

        let status = reporter.get_vesting_status("G-1").await.unwrap();
        assert_eq!(status.total_granted, 4_800);
        assert_eq!(status.vested, 1_300);
        assert_eq!(status.unvested, 3_500);
        assert_eq!(status.forfeited, 0);
        assert_eq!(status.exercisable, 1_000);
        assert_eq!(status.next_vest_date, Some(date(2025, 3, 15)));
        assert_eq!(status.next_vest_shares, Some(100));
    }

    #[tokio::test]
    async fn test_status_without_history_uses_schedule() {
        let mut store = InMemoryGrantStore::new();
        store.insert(grant("G-new"), Vec::new());
        store.insert(vested_after_cliff("G-mid"), Vec::new());
        let reporter = VestingStatusReporter::new(store);

        let fresh = reporter.get_vesting_status("G-new").await.unwrap();
        assert_eq!(fresh.next_vest_date, Some(date(2025, 1, 15)));
        assert_eq!(fresh.next_vest_shares, Some(1_200));

        let mid = reporter.get_vesting_status("G-mid").await.unwrap();
        assert_eq!(mid.next_vest_date, Some(date(2025, 3, 15)));
        assert_eq!(mid.next_vest_shares, Some(100));
    }

    #[tokio::test]
    async fn test_fully_vested_has_no_next() {
        let mut g = grant("G-done");
        g.status = GrantStatus::FullyVested;
        g.shares_vested = 4_800;
        g.shares_remaining = 0;
        let mut store = InMemoryGrantStore::new();
        store.insert(g, Vec::new());

        let status = VestingStatusReporter::new(store)
            .get_vesting_status("G-done")
            .await
            .unwrap();
        assert_eq!(status.unvested, 0);
        assert_eq!(status.next_vest_date, None);
        assert_eq!(status.next_vest_shares, None);
    }

    #[tokio::test]
    async fn test_inactive_grant_ignores_pending_history() {
        let mut g = vested_after_cliff("G-left");
        g.status = GrantStatus::Forfeited;
        g.shares_forfeited = g.shares_remaining;
        g.shares_remaining = 0;
        let mut store = InMemoryGrantStore::new();
        store.insert(
            g,
            vec![VestingTranche {
                vest_date: date(2025, 3, 15),
                shares_vesting: 100,
                cumulative_shares: 1_400,
                status: TrancheStatus::Scheduled,
            }],
        );

        let status = VestingStatusReporter::new(store)
            .get_vesting_status("G-left")
            .await
            .unwrap();
        assert_eq!(status.forfeited, 3_500);
        assert_eq!(status.next_vest_date, None);
        assert_eq!(status.next_vest_shares, None);
    }

    #[tokio::test]
    async fn test_unknown_grant() {
        let reporter = VestingStatusReporter::new(InMemoryGrantStore::new());
        let err = reporter.get_vesting_status("missing").await.unwrap_err();
        assert!(matches!(err, VestingError::NotFound { ref grant_id } if grant_id == "missing"));
    }

    #[tokio::test]
    async fn test_inconsistent_counters_rejected() {
        let mut g = grant("G-bad");
        g.shares_vested = 100;
        let mut store = InMemoryGrantStore::new();
        store.insert(g, Vec::new());

        let err = VestingStatusReporter::new(store)
            .get_vesting_status("G-bad")
            .await
            .unwrap_err();
        assert!(matches!(err, VestingError::CounterMismatch { .. }));
    }

    struct UnavailableStore {
        calls: AtomicUsize,
    }

    impl GrantStore for UnavailableStore {
        async fn fetch_grant(&self, _grant_id: &str) -> Result<Option<GrantRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(VestingError::Store {
                message: "connection reset".to_string(),
                transient: true,
            })
        }
    }

    #[tokio::test]
    async fn test_store_errors_surface_without_retry() {
        let reporter = VestingStatusReporter::new(UnavailableStore {
            calls: AtomicUsize::new(0),
        });

        let err = reporter.get_vesting_status("G-1").await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(reporter.store().calls.load(Ordering::SeqCst), 1);
    }
}
