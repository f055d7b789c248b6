//! Tranche generation for time-based vesting

use chrono::NaiveDate;

use super::VestingTranche;
use crate::calendar::add_months;
use crate::error::{Result, VestingError};
use crate::grant::StockGrant;

/// Build the ordered tranche list for a grant
///
/// The cliff tranche (if any) vests the pro-rata share of the schedule it covers,
/// rounded half-up. Shares left after the cliff are split evenly across the periodic
/// tranches by floor division, and the remainder lands on the last tranche so the
/// final cumulative total equals `shares_granted` exactly.
///
/// Fails with [`VestingError::Validation`] before producing anything when the terms are
/// malformed.
pub fn calculate_vesting_schedule(grant: &StockGrant) -> Result<Vec<VestingTranche>> {
    if grant.shares_granted == 0 {
        return Err(VestingError::validation(
            "shares_granted",
            "must be greater than zero",
        ));
    }
    let schedule = &grant.vesting_schedule;
    schedule.validate()?;
    // Bounds the tranche count before anything is allocated
    add_months(grant.grant_date, schedule.vesting_months)?;

    let period = schedule.vesting_frequency.period_months();
    let period_count = schedule.post_cliff_months() / period;
    let has_cliff = schedule.cliff_months > 0;

    let mut tranches = Vec::with_capacity(period_count as usize + usize::from(has_cliff));
    let mut cumulative = 0u64;

    let cliff_shares = if has_cliff {
        let shares = pro_rata_round(
            grant.shares_granted,
            schedule.cliff_months,
            schedule.vesting_months,
        );
        cumulative += shares;
        tranches.push(VestingTranche::scheduled(
            add_months(grant.grant_date, schedule.cliff_months)?,
            shares,
            cumulative,
        ));
        shares
    } else {
        0
    };

    let remaining = grant.shares_granted - cliff_shares;
    if period_count > 0 {
        let per_period = remaining / u64::from(period_count);
        for k in 1..=period_count {
            let shares = if k == period_count {
                remaining - per_period * u64::from(period_count - 1)
            } else {
                per_period
            };
            cumulative += shares;
            tranches.push(VestingTranche::scheduled(
                add_months(grant.grant_date, schedule.cliff_months + k * period)?,
                shares,
                cumulative,
            ));
        }
    }

    debug_assert_eq!(cumulative, grant.shares_granted);
    log::debug!(
        "grant {}: {} tranches ({} cliff shares, {} periodic {})",
        grant.id,
        tranches.len(),
        cliff_shares,
        period_count,
        schedule.vesting_frequency
    );

    Ok(tranches)
}

/// `round(shares * part / whole)` with halves rounded up, without overflow
fn pro_rata_round(shares: u64, part: u32, whole: u32) -> u64 {
    let numerator = 2 * u128::from(shares) * u128::from(part) + u128::from(whole);
    (numerator / (2 * u128::from(whole))) as u64
}

/// Shares in non-forfeited tranches vesting on or before `as_of`
pub fn shares_vested_as_of(tranches: &[VestingTranche], as_of: NaiveDate) -> u64 {
    tranches
        .iter()
        .filter(|t| t.vest_date <= as_of && t.status != super::TrancheStatus::Forfeited)
        .map(|t| t.shares_vesting)
        .sum()
}
