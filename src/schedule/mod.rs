//! Vesting schedule calculation
//!
//! Turns a grant's vesting terms into an ordered list of tranches whose share
//! counts always sum to the shares granted.

mod calculator;
mod tranche;

pub use calculator::{calculate_vesting_schedule, shares_vested_as_of};
pub use tranche::{TrancheStatus, VestingTranche};
