//! Performance and market condition evaluation
//!
//! Performance conditions scale vesting by achievement across three bands; market
//! conditions are all-or-nothing gates. Both read actual metric values from a plain
//! metric-name to value map supplied by the caller.

mod market;
mod performance;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use market::{
    evaluate_market_conditions, evaluate_market_detailed, MarketCondition, MarketOutcome,
};
pub use performance::{
    earned_shares, evaluate_performance_conditions, evaluate_performance_detailed,
    PerformanceCondition, PerformanceOutcome, FULLY_EARNED_PCT,
};

/// Actual metric values keyed by metric name
pub type MetricActuals = HashMap<String, f64>;

/// Performance and market conditions attached to one grant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionSet {
    #[serde(default)]
    pub performance: Vec<PerformanceCondition>,

    #[serde(default)]
    pub market: Vec<MarketCondition>,
}

impl ConditionSet {
    /// Earned percentage from the performance conditions, or zero when a market gate fails
    pub fn earned_pct(&self, actuals: &MetricActuals) -> crate::error::Result<f64> {
        if !evaluate_market_conditions(&self.market, actuals) {
            return Ok(0.0);
        }
        evaluate_performance_conditions(&self.performance, actuals)
    }
}
