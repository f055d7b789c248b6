//! Grant store boundary
//!
//! Grants, their counters and tranche history live in an external store. The engine
//! only reads from it, one record per query.

use std::collections::HashMap;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::grant::StockGrant;
use crate::schedule::VestingTranche;

/// A grant as persisted: current counters plus realized and scheduled tranches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantRecord {
    pub grant: StockGrant,

    /// Tranche history in vest-date order (may be empty if the store keeps none)
    #[serde(default)]
    pub tranches: Vec<VestingTranche>,
}

/// Read access to the grant store
///
/// Timeouts and transient-failure retries belong to the store client; failures surface
/// as [`crate::VestingError::Store`].
pub trait GrantStore {
    /// Fetch a grant record by identifier, `None` when no such grant exists
    fn fetch_grant(&self, grant_id: &str) -> impl Future<Output = Result<Option<GrantRecord>>> + Send;
}

/// Grant store held in memory, built from a loaded grant book
#[derive(Debug, Clone, Default)]
pub struct InMemoryGrantStore {
    records: HashMap<String, GrantRecord>,
}

impl InMemoryGrantStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from grants and their tranche history keyed by grant id
    pub fn from_book(
        grants: Vec<StockGrant>,
        mut history: HashMap<String, Vec<VestingTranche>>,
    ) -> Self {
        let mut store = Self::new();
        for grant in grants {
            let tranches = history.remove(&grant.id).unwrap_or_default();
            store.insert(grant, tranches);
        }
        store
    }

    pub fn insert(&mut self, grant: StockGrant, mut tranches: Vec<VestingTranche>) {
        tranches.sort_by_key(|t| t.vest_date);
        self.records
            .insert(grant.id.clone(), GrantRecord { grant, tranches });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl GrantStore for InMemoryGrantStore {
    async fn fetch_grant(&self, grant_id: &str) -> Result<Option<GrantRecord>> {
        Ok(self.records.get(grant_id).cloned())
    }
}
