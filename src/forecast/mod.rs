//! Month-by-month vesting forecast
//!
//! Re-buckets the tranches of a schedule into calendar months starting one month
//! after the grant date, with a running cumulative total.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::calendar::{add_months, month_key};
use crate::error::Result;
use crate::grant::StockGrant;
use crate::schedule::calculate_vesting_schedule;

/// Vesting in one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRow {
    /// `YYYY-MM` month key
    pub month: String,

    /// Shares vesting during the month
    pub shares_vesting: u64,

    /// Shares vested up to and including the month
    pub cumulative_vested: u64,
}

/// Forecast `horizon_months` months of vesting for a grant
pub fn forecast_vesting(grant: &StockGrant, horizon_months: u32) -> Result<Vec<ForecastRow>> {
    let tranches = calculate_vesting_schedule(grant)?;
    // Bounds the row count before anything is allocated
    add_months(grant.grant_date, horizon_months)?;

    let mut by_month: BTreeMap<String, u64> = BTreeMap::new();
    for tranche in &tranches {
        *by_month.entry(month_key(tranche.vest_date)).or_insert(0) += tranche.shares_vesting;
    }

    let mut rows = Vec::with_capacity(horizon_months as usize);
    let mut cumulative = 0u64;
    for offset in 1..=horizon_months {
        let month = month_key(add_months(grant.grant_date, offset)?);
        let shares_vesting = by_month.get(&month).copied().unwrap_or(0);
        cumulative += shares_vesting;
        rows.push(ForecastRow {
            month,
            shares_vesting,
            cumulative_vested: cumulative,
        });
    }

    log::debug!(
        "grant {}: forecast {} months, {} of {} shares vest in horizon",
        grant.id,
        horizon_months,
        cumulative,
        grant.shares_granted
    );

    Ok(rows)
}

/// Summary statistics for a forecast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub total_months: u32,
    pub months_with_vesting: u32,
    pub total_vesting: u64,
    pub first_vest_month: Option<String>,
    pub final_cumulative: u64,
}

impl ForecastSummary {
    pub fn from_rows(rows: &[ForecastRow]) -> Self {
        let vesting_months: Vec<&ForecastRow> =
            rows.iter().filter(|r| r.shares_vesting > 0).collect();

        Self {
            total_months: rows.len() as u32,
            months_with_vesting: vesting_months.len() as u32,
            total_vesting: rows.iter().map(|r| r.shares_vesting).sum(),
            first_vest_month: vesting_months.first().map(|r| r.month.clone()),
            final_cumulative: rows.last().map(|r| r.cumulative_vested).unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grant::{GrantType, VestingFrequency, VestingSchedule};
    use crate::error::VestingError;
    use crate::schedule::shares_vested_as_of;
    use chrono::NaiveDate;

    fn grant(shares: u64, cliff: u32, months: u32, frequency: VestingFrequency) -> StockGrant {
        StockGrant::new(
            "G-1",
            "E-1",
            "C-1",
            GrantType::Rsu,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            shares,
            VestingSchedule::new(cliff, months, frequency),
        )
    }

    #[test]
    fn test_cliff_month_bucket() {
        let rows = forecast_vesting(&grant(4_800, 12, 48, VestingFrequency::Monthly), 48).unwrap();

        assert_eq!(rows.len(), 48);
        assert_eq!(rows[0].month, "2024-02");
        assert!(rows[..11].iter().all(|r| r.shares_vesting == 0));
        assert_eq!(rows[11].month, "2025-01");
        assert_eq!(rows[11].shares_vesting, 1_200);
        assert_eq!(rows[12].shares_vesting, 100);
        assert_eq!(rows[47].month, "2028-01");
        assert_eq!(rows[47].cumulative_vested, 4_800);
    }

    #[test]
    fn test_quarterly_gaps() {
        let rows = forecast_vesting(&grant(4_000, 0, 12, VestingFrequency::Quarterly), 12).unwrap();

        let vesting: Vec<u64> = rows.iter().map(|r| r.shares_vesting).collect();
        assert_eq!(vesting, vec![0, 0, 1_000, 0, 0, 1_000, 0, 0, 1_000, 0, 0, 1_000]);
    }

    #[test]
    fn test_partial_horizon_matches_schedule() {
        let g = grant(9_973, 12, 48, VestingFrequency::Monthly);
        let tranches = calculate_vesting_schedule(&g).unwrap();

        for horizon in [6, 12, 13, 30] {
            let rows = forecast_vesting(&g, horizon).unwrap();
            let horizon_end = add_months(g.grant_date, horizon).unwrap();
            let bucket_total: u64 = rows.iter().map(|r| r.shares_vesting).sum();

            assert_eq!(bucket_total, shares_vested_as_of(&tranches, horizon_end));
            assert_eq!(rows.last().unwrap().cumulative_vested, bucket_total);
            for pair in rows.windows(2) {
                assert!(pair[1].cumulative_vested >= pair[0].cumulative_vested);
            }
        }
    }

    #[test]
    fn test_horizon_beyond_schedule() {
        let rows = forecast_vesting(&grant(4_000, 0, 48, VestingFrequency::Annually), 60).unwrap();

        assert_eq!(rows.len(), 60);
        assert!(rows[48..].iter().all(|r| r.shares_vesting == 0));
        assert_eq!(rows[59].cumulative_vested, 4_000);
    }

    #[test]
    fn test_zero_horizon() {
        let rows = forecast_vesting(&grant(4_000, 0, 48, VestingFrequency::Annually), 0).unwrap();
        assert!(rows.is_empty());
        assert_eq!(ForecastSummary::from_rows(&rows).final_cumulative, 0);
    }

    #[test]
    fn test_horizon_past_calendar_range_rejected() {
        let err = forecast_vesting(&grant(4_800, 0, 48, VestingFrequency::Monthly), u32::MAX)
            .unwrap_err();
        assert!(matches!(err, VestingError::DateOverflow { months: u32::MAX }));
    }

    #[test]
    fn test_invalid_grant_propagates() {
        assert!(forecast_vesting(&grant(0, 0, 48, VestingFrequency::Annually), 12).is_err());
    }

    #[test]
    fn test_summary() {
        let rows = forecast_vesting(&grant(4_800, 12, 48, VestingFrequency::Quarterly), 24).unwrap();
        let summary = ForecastSummary::from_rows(&rows);

        assert_eq!(summary.total_months, 24);
        // cliff plus quarters at months 15, 18, 21, 24
        assert_eq!(summary.months_with_vesting, 5);
        assert_eq!(summary.total_vesting, 1_200 + 4 * 300);
        assert_eq!(summary.first_vest_month.as_deref(), Some("2025-01"));
        assert_eq!(summary.final_cumulative, summary.total_vesting);
    }
}
