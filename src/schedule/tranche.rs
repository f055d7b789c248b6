//! Tranche output structures

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VestingError};

/// Whether a tranche is still pending or has been realized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrancheStatus {
    Scheduled,
    Vested,
    Forfeited,
}

impl TrancheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrancheStatus::Scheduled => "scheduled",
            TrancheStatus::Vested => "vested",
            TrancheStatus::Forfeited => "forfeited",
        }
    }
}

impl FromStr for TrancheStatus {
    type Err = VestingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "scheduled" => Ok(TrancheStatus::Scheduled),
            "vested" => Ok(TrancheStatus::Vested),
            "forfeited" => Ok(TrancheStatus::Forfeited),
            other => Err(VestingError::validation(
                "tranche_status",
                format!("unknown tranche status {other:?}"),
            )),
        }
    }
}

/// One discrete vesting event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingTranche {
    pub vest_date: NaiveDate,

    /// Shares vesting on this date
    pub shares_vesting: u64,

    /// Running total up to and including this tranche
    pub cumulative_shares: u64,

    pub status: TrancheStatus,
}

impl VestingTranche {
    pub fn scheduled(vest_date: NaiveDate, shares_vesting: u64, cumulative_shares: u64) -> Self {
        Self {
            vest_date,
            shares_vesting,
            cumulative_shares,
            status: TrancheStatus::Scheduled,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TrancheStatus::Scheduled
    }
}
