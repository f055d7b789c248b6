//! Vesting engine for batch computation over a grant book
//!
//! The calculators are pure, so a book of grants is fanned out across threads and
//! each grant's result is kept separately: one malformed grant does not sink the batch.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rayon::prelude::*;

use crate::calendar::{add_months, month_keys_between};
use crate::error::{Result, VestingError};
use crate::forecast::{forecast_vesting, ForecastRow};
use crate::grant::StockGrant;
use crate::schedule::{calculate_vesting_schedule, VestingTranche};

/// Default forecast horizon: a standard four-year schedule
pub const DEFAULT_FORECAST_HORIZON_MONTHS: u32 = 48;

/// Engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Months covered by forecasts
    pub forecast_horizon_months: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            forecast_horizon_months: DEFAULT_FORECAST_HORIZON_MONTHS,
        }
    }
}

impl EngineConfig {
    pub fn with_horizon(mut self, months: u32) -> Self {
        self.forecast_horizon_months = months;
        self
    }
}

/// Result of a computation for one grant in a batch
#[derive(Debug)]
pub struct GrantOutcome<T> {
    pub grant_id: String,
    pub result: Result<T>,
}

/// Monthly vesting across a whole book
#[derive(Debug, Default)]
pub struct BookForecast {
    /// Book-wide rows in month order, cumulative across all grants
    pub rows: Vec<ForecastRow>,

    /// Number of grants that contributed to the rows
    pub grants_included: usize,

    /// Grants whose terms could not be forecast
    pub failures: Vec<(String, VestingError)>,
}

/// A grant's forecast rows with the first and last month they cover
type WindowedForecast = (Vec<ForecastRow>, Option<(NaiveDate, NaiveDate)>);

/// Runs schedule and forecast calculations with a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct VestingEngine {
    config: EngineConfig,
}

impl VestingEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn schedule(&self, grant: &StockGrant) -> Result<Vec<VestingTranche>> {
        calculate_vesting_schedule(grant)
    }

    /// Forecast over the configured horizon
    pub fn forecast(&self, grant: &StockGrant) -> Result<Vec<ForecastRow>> {
        forecast_vesting(grant, self.config.forecast_horizon_months)
    }

    /// Schedules for every grant, in input order
    pub fn schedule_book(&self, grants: &[StockGrant]) -> Vec<GrantOutcome<Vec<VestingTranche>>> {
        grants
            .par_iter()
            .map(|grant| GrantOutcome {
                grant_id: grant.id.clone(),
                result: self.schedule(grant),
            })
            .collect()
    }

    /// Forecast every grant and aggregate the results by calendar month
    ///
    /// Rows run without gaps from the earliest to the latest forecast month of any grant.
    pub fn forecast_book(&self, grants: &[StockGrant]) -> BookForecast {
        let horizon = self.config.forecast_horizon_months;
        let outcomes: Vec<GrantOutcome<WindowedForecast>> = grants
            .par_iter()
            .map(|grant| GrantOutcome {
                grant_id: grant.id.clone(),
                result: self.forecast(grant).and_then(|rows| {
                    let window = if rows.is_empty() {
                        None
                    } else {
                        Some((
                            add_months(grant.grant_date, 1)?,
                            add_months(grant.grant_date, horizon)?,
                        ))
                    };
                    Ok((rows, window))
                }),
            })
            .collect();

        let mut by_month: BTreeMap<String, u64> = BTreeMap::new();
        let mut span: Option<(NaiveDate, NaiveDate)> = None;
        let mut book = BookForecast::default();
        for outcome in outcomes {
            match outcome.result {
                Ok((rows, window)) => {
                    book.grants_included += 1;
                    for row in rows {
                        *by_month.entry(row.month).or_insert(0) += row.shares_vesting;
                    }
                    if let Some((first, last)) = window {
                        span = Some(match span {
                            Some((lo, hi)) => (lo.min(first), hi.max(last)),
                            None => (first, last),
                        });
                    }
                }
                Err(err) => {
                    log::warn!("grant {} skipped: {}", outcome.grant_id, err);
                    book.failures.push((outcome.grant_id, err));
                }
            }
        }

        if let Some((first, last)) = span {
            let mut cumulative = 0u64;
            book.rows = month_keys_between(first, last)
                .into_iter()
                .map(|month| {
                    let shares_vesting = by_month.get(&month).copied().unwrap_or(0);
                    cumulative += shares_vesting;
                    ForecastRow {
                        month,
                        shares_vesting,
                        cumulative_vested: cumulative,
                    }
                })
                .collect();
        }

        book
    }
}
