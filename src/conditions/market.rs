//! Market conditions: binary gates on stock price, TSR and similar metrics

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::MetricActuals;

/// A market metric that must reach a target for the grant to vest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketCondition {
    /// Metric name looked up in the actuals map (e.g. stock price, TSR)
    pub metric: String,

    /// Bar the actual value must meet or exceed
    pub target: f64,

    pub measurement_date: NaiveDate,

    /// Reserved for comparison against a peer index. Not evaluated: the target is
    /// always applied as an absolute bar.
    #[serde(default)]
    pub relative: bool,
}

impl MarketCondition {
    pub fn new(metric: impl Into<String>, target: f64, measurement_date: NaiveDate) -> Self {
        Self {
            metric: metric.into(),
            target,
            measurement_date,
            relative: false,
        }
    }

    /// Whether `actual` clears the target
    pub fn is_met_by(&self, actual: f64) -> bool {
        actual >= self.target
    }
}

/// Result of evaluating one market condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOutcome {
    pub metric: String,
    pub actual: Option<f64>,
    pub met: bool,
}

/// Evaluate each condition on its own; a missing metric is unmet
pub fn evaluate_market_detailed(
    conditions: &[MarketCondition],
    actuals: &MetricActuals,
) -> Vec<MarketOutcome> {
    conditions
        .iter()
        .map(|condition| {
            if condition.relative {
                log::warn!(
                    "relative comparison for market metric {:?} is not implemented, applying absolute target",
                    condition.metric
                );
            }
            let actual = actuals.get(&condition.metric).copied();
            MarketOutcome {
                metric: condition.metric.clone(),
                actual,
                met: actual.is_some_and(|v| condition.is_met_by(v)),
            }
        })
        .collect()
}

/// True when every condition is met (vacuously true for no conditions)
pub fn evaluate_market_conditions(conditions: &[MarketCondition], actuals: &MetricActuals) -> bool {
    evaluate_market_detailed(conditions, actuals)
        .iter()
        .all(|outcome| outcome.met)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measured() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 12, 31).unwrap()
    }

    fn conditions() -> Vec<MarketCondition> {
        vec![
            MarketCondition::new("stock_price", 50.0, measured()),
            MarketCondition::new("tsr", 0.15, measured()),
        ]
    }

    fn actuals(pairs: &[(&str, f64)]) -> MetricActuals {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_no_conditions_pass() {
        assert!(evaluate_market_conditions(&[], &MetricActuals::new()));
    }

    #[test]
    fn test_all_met() {
        assert!(evaluate_market_conditions(
            &conditions(),
            &actuals(&[("stock_price", 50.0), ("tsr", 0.22)])
        ));
    }

    #[test]
    fn test_any_unmet_fails() {
        assert!(!evaluate_market_conditions(
            &conditions(),
            &actuals(&[("stock_price", 49.99), ("tsr", 0.22)])
        ));
    }

    #[test]
    fn test_missing_metric_fails() {
        let outcomes = evaluate_market_detailed(&conditions(), &actuals(&[("stock_price", 75.0)]));
        assert!(outcomes[0].met);
        assert_eq!(outcomes[1].actual, None);
        assert!(!outcomes[1].met);
        assert!(!evaluate_market_conditions(
            &conditions(),
            &actuals(&[("stock_price", 75.0)])
        ));
    }

    #[test]
    fn test_relative_flag_is_inert() {
        let mut relative = MarketCondition::new("tsr", 0.15, measured());
        relative.relative = true;

        assert!(evaluate_market_conditions(&[relative.clone()], &actuals(&[("tsr", 0.15)])));
        assert!(!evaluate_market_conditions(&[relative], &actuals(&[("tsr", 0.14)])));
    }

    #[test]
    fn test_relative_defaults_off_when_deserialized() {
        let condition: MarketCondition = serde_json::from_str(
            r#"{"metric":"stock_price","target":42.0,"measurement_date":"2026-12-31"}"#,
        )
        .unwrap();
        assert!(!condition.relative);
        assert_eq!(condition.measurement_date, measured());
    }
}
