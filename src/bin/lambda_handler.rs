//! AWS Lambda handler for vesting calculations
//!
//! Accepts a JSON request naming an action (schedule, forecast or evaluate) and
//! returns the computed tranches, forecast rows or condition outcomes.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use vesting_engine::conditions::{
    earned_shares, evaluate_market_detailed, evaluate_performance_detailed, ConditionSet,
    MarketOutcome, PerformanceOutcome,
};
use vesting_engine::engine::DEFAULT_FORECAST_HORIZON_MONTHS;
use vesting_engine::{
    forecast_vesting, ForecastRow, ForecastSummary, MetricActuals, StockGrant, VestingEngine,
    VestingTranche,
};

/// Input for one invocation
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum VestingRequest {
    Schedule {
        grant: StockGrant,
    },
    Forecast {
        grant: StockGrant,
        #[serde(default = "default_horizon_months")]
        horizon_months: u32,
    },
    Evaluate {
        #[serde(default)]
        conditions: ConditionSet,
        #[serde(default)]
        actuals: MetricActuals,
        /// Target share count to scale by the earned percentage
        #[serde(default)]
        shares: Option<u64>,
    },
}

fn default_horizon_months() -> u32 {
    DEFAULT_FORECAST_HORIZON_MONTHS
}

/// Output of one invocation; only the fields for the requested action are set
#[derive(Debug, Default, Serialize)]
pub struct VestingResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tranches: Option<Vec<VestingTranche>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast: Option<Vec<ForecastRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast_summary: Option<ForecastSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<Vec<PerformanceOutcome>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market: Option<Vec<MarketOutcome>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earned_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earned_shares: Option<u64>,
    pub execution_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn respond(request: VestingRequest) -> vesting_engine::Result<VestingResponse> {
    let mut response = VestingResponse::default();
    match request {
        VestingRequest::Schedule { grant } => {
            response.tranches = Some(VestingEngine::default().schedule(&grant)?);
        }
        VestingRequest::Forecast {
            grant,
            horizon_months,
        } => {
            let rows = forecast_vesting(&grant, horizon_months)?;
            response.forecast_summary = Some(ForecastSummary::from_rows(&rows));
            response.forecast = Some(rows);
        }
        VestingRequest::Evaluate {
            conditions,
            actuals,
            shares,
        } => {
            let earned_pct = conditions.earned_pct(&actuals)?;
            response.performance = Some(evaluate_performance_detailed(
                &conditions.performance,
                &actuals,
            )?);
            response.market = Some(evaluate_market_detailed(&conditions.market, &actuals));
            response.earned_pct = Some(earned_pct);
            response.earned_shares = shares.map(|s| earned_shares(s, earned_pct));
        }
    }
    Ok(response)
}

/// Lambda handler function
async fn handler(event: LambdaEvent<VestingRequest>) -> Result<VestingResponse, Error> {
    let start = std::time::Instant::now();

    // Rejected requests come back with the error set and nothing partial
    let mut response = respond(event.payload).unwrap_or_else(|err| {
        log::warn!("request rejected: {}", err);
        VestingResponse {
            error: Some(err.to_string()),
            ..Default::default()
        }
    });
    response.execution_time_ms = start.elapsed().as_millis() as u64;

    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
