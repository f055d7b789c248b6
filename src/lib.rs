//! Vesting Engine - schedules, conditions, forecasts and status for equity grants
//!
//! This library provides:
//! - Tranche schedules from cliff / duration / frequency terms, summing exactly to the grant
//! - Performance condition evaluation across threshold, target and maximum bands
//! - Market condition gates
//! - Month-by-month vesting forecasts
//! - Vesting status summaries read from an external grant store

pub mod calendar;
pub mod conditions;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod grant;
pub mod schedule;
pub mod status;

// Re-export commonly used types
pub use conditions::{
    evaluate_market_conditions, evaluate_performance_conditions, ConditionSet, MarketCondition,
    MetricActuals, PerformanceCondition,
};
pub use engine::{EngineConfig, VestingEngine};
pub use error::{Result, VestingError};
pub use forecast::{forecast_vesting, ForecastRow, ForecastSummary};
pub use grant::{GrantStatus, GrantType, StockGrant, VestingFrequency, VestingSchedule, VestingType};
pub use schedule::{calculate_vesting_schedule, TrancheStatus, VestingTranche};
pub use status::{GrantStore, InMemoryGrantStore, VestingStatus, VestingStatusReporter};
