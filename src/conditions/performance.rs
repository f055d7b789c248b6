//! Performance conditions: piecewise-linear payout across threshold, target and maximum

use serde::{Deserialize, Serialize};

use super::MetricActuals;
use crate::error::{Result, VestingError};

/// Earned percentage when there is nothing to evaluate
pub const FULLY_EARNED_PCT: f64 = 100.0;

/// A business KPI with three ascending achievement bands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceCondition {
    /// Metric name looked up in the actuals map
    pub metric: String,

    pub threshold: f64,
    pub target: f64,
    pub maximum: f64,

    /// Vesting percentage earned at each band
    pub threshold_pct: f64,
    pub target_pct: f64,
    pub maximum_pct: f64,

    /// Free-form label, not interpreted
    #[serde(default)]
    pub measurement_period: String,
}

impl PerformanceCondition {
    /// Condition paying `threshold_pct`/`target_pct`/`maximum_pct` at the given bands
    pub fn new(
        metric: impl Into<String>,
        (threshold, threshold_pct): (f64, f64),
        (target, target_pct): (f64, f64),
        (maximum, maximum_pct): (f64, f64),
    ) -> Self {
        Self {
            metric: metric.into(),
            threshold,
            target,
            maximum,
            threshold_pct,
            target_pct,
            maximum_pct,
            measurement_period: String::new(),
        }
    }

    /// Bands must be finite and ascending
    pub fn validate(&self) -> Result<()> {
        let values = [
            ("threshold", self.threshold),
            ("target", self.target),
            ("maximum", self.maximum),
            ("threshold_pct", self.threshold_pct),
            ("target_pct", self.target_pct),
            ("maximum_pct", self.maximum_pct),
        ];
        for (field, value) in values {
            if !value.is_finite() {
                return Err(VestingError::validation(
                    field,
                    format!("{}: {} is not finite", self.metric, field),
                ));
            }
        }
        if self.threshold > self.target {
            return Err(VestingError::validation(
                "threshold",
                format!("{}: threshold {} above target {}", self.metric, self.threshold, self.target),
            ));
        }
        if self.target > self.maximum {
            return Err(VestingError::validation(
                "target",
                format!("{}: target {} above maximum {}", self.metric, self.target, self.maximum),
            ));
        }
        Ok(())
    }

    /// Percentage earned for an actual metric value
    ///
    /// When bands coincide, the highest band reached pays: an actual equal to a threshold
    /// that is also the target earns `target_pct`.
    pub fn earned_pct(&self, actual: f64) -> f64 {
        if actual < self.threshold {
            0.0
        } else if actual >= self.maximum {
            self.maximum_pct
        } else if actual >= self.target {
            // target <= actual < maximum, so maximum > target
            interpolate(actual, self.target, self.maximum, self.target_pct, self.maximum_pct)
        } else {
            // threshold <= actual < target
            interpolate(actual, self.threshold, self.target, self.threshold_pct, self.target_pct)
        }
    }
}

/// Linear interpolation of `x` in `[x0, x1)` onto `[y0, y1)`
fn interpolate(x: f64, x0: f64, x1: f64, y0: f64, y1: f64) -> f64 {
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// Result of evaluating one performance condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceOutcome {
    pub metric: String,

    /// Actual value, `None` when the metric was missing from the actuals
    pub actual: Option<f64>,

    pub earned_pct: f64,
}

/// Evaluate each condition on its own
///
/// A metric missing from `actuals` is evaluated as a value of 0.
pub fn evaluate_performance_detailed(
    conditions: &[PerformanceCondition],
    actuals: &MetricActuals,
) -> Result<Vec<PerformanceOutcome>> {
    conditions
        .iter()
        .map(|condition| {
            condition.validate()?;
            let actual = actuals.get(&condition.metric).copied();
            let value = match actual {
                Some(v) if !v.is_finite() => {
                    return Err(VestingError::validation(
                        "actuals",
                        format!("{} actual {} is not finite", condition.metric, v),
                    ))
                }
                Some(v) => v,
                None => {
                    log::warn!(
                        "performance metric {:?} missing from actuals, evaluating as 0",
                        condition.metric
                    );
                    0.0
                }
            };
            Ok(PerformanceOutcome {
                metric: condition.metric.clone(),
                actual,
                earned_pct: condition.earned_pct(value),
            })
        })
        .collect()
}

/// Aggregate earned percentage: equal-weighted mean of the per-condition results,
/// or 100 when there are no conditions
pub fn evaluate_performance_conditions(
    conditions: &[PerformanceCondition],
    actuals: &MetricActuals,
) -> Result<f64> {
    if conditions.is_empty() {
        return Ok(FULLY_EARNED_PCT);
    }
    let outcomes = evaluate_performance_detailed(conditions, actuals)?;
    let total: f64 = outcomes.iter().map(|o| o.earned_pct).sum();
    Ok(total / outcomes.len() as f64)
}

/// Whole shares earned at `earned_pct` percent of `shares`, rounded down
pub fn earned_shares(shares: u64, earned_pct: f64) -> u64 {
    if !earned_pct.is_finite() || earned_pct <= 0.0 {
        return 0;
    }
    (shares as f64 * earned_pct / 100.0).floor() as u64
}
