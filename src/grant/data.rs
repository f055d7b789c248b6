//! Grant terms, vesting schedules and lifecycle counters

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VestingError};

/// Equity instrument type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GrantType {
    /// Restricted stock unit
    Rsu,
    /// Incentive stock option
    Iso,
    /// Non-qualified stock option
    Nso,
}

impl GrantType {
    /// Options carry a strike price and an expiration date
    pub fn is_option(&self) -> bool {
        matches!(self, GrantType::Iso | GrantType::Nso)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GrantType::Rsu => "RSU",
            GrantType::Iso => "ISO",
            GrantType::Nso => "NSO",
        }
    }
}

impl FromStr for GrantType {
    type Err = VestingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "RSU" => Ok(GrantType::Rsu),
            "ISO" => Ok(GrantType::Iso),
            "NSO" => Ok(GrantType::Nso),
            other => Err(VestingError::validation(
                "grant_type",
                format!("unknown grant type {other:?}"),
            )),
        }
    }
}

/// What gates the vesting of a grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VestingType {
    TimeBased,
    PerformanceBased,
    MarketBased,
}

impl FromStr for VestingType {
    type Err = VestingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "TIME_BASED" => Ok(VestingType::TimeBased),
            "PERFORMANCE_BASED" => Ok(VestingType::PerformanceBased),
            "MARKET_BASED" => Ok(VestingType::MarketBased),
            other => Err(VestingError::validation(
                "vesting_type",
                format!("unknown vesting type {other:?}"),
            )),
        }
    }
}

/// Cadence of vesting after any cliff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VestingFrequency {
    Monthly,
    Quarterly,
    Annually,
}

impl VestingFrequency {
    /// Length of one vesting period in months
    pub fn period_months(&self) -> u32 {
        match self {
            VestingFrequency::Monthly => 1,
            VestingFrequency::Quarterly => 3,
            VestingFrequency::Annually => 12,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VestingFrequency::Monthly => "monthly",
            VestingFrequency::Quarterly => "quarterly",
            VestingFrequency::Annually => "annually",
        }
    }
}

impl FromStr for VestingFrequency {
    type Err = VestingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "monthly" => Ok(VestingFrequency::Monthly),
            "quarterly" => Ok(VestingFrequency::Quarterly),
            "annually" => Ok(VestingFrequency::Annually),
            other => Err(VestingError::validation(
                "vesting_frequency",
                format!("unrecognized frequency {other:?}, expected monthly, quarterly or annually"),
            )),
        }
    }
}

impl fmt::Display for VestingFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a grant, owned by the grant store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GrantStatus {
    #[default]
    Active,
    FullyVested,
    Exercised,
    Forfeited,
    Cancelled,
    Expired,
}

impl FromStr for GrantStatus {
    type Err = VestingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ACTIVE" => Ok(GrantStatus::Active),
            "FULLY_VESTED" => Ok(GrantStatus::FullyVested),
            "EXERCISED" => Ok(GrantStatus::Exercised),
            "FORFEITED" => Ok(GrantStatus::Forfeited),
            "CANCELLED" => Ok(GrantStatus::Cancelled),
            "EXPIRED" => Ok(GrantStatus::Expired),
            other => Err(VestingError::validation(
                "status",
                format!("unknown grant status {other:?}"),
            )),
        }
    }
}

/// Cliff, duration and cadence of a time-based vesting schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingSchedule {
    /// Months before anything vests (0 = no cliff)
    pub cliff_months: u32,

    /// Total schedule length in months, cliff included
    pub vesting_months: u32,

    /// Cadence after the cliff
    pub vesting_frequency: VestingFrequency,
}

impl VestingSchedule {
    pub fn new(cliff_months: u32, vesting_months: u32, vesting_frequency: VestingFrequency) -> Self {
        Self {
            cliff_months,
            vesting_months,
            vesting_frequency,
        }
    }

    /// The common four-year schedule with a one-year cliff
    pub fn standard_four_year(vesting_frequency: VestingFrequency) -> Self {
        Self::new(12, 48, vesting_frequency)
    }

    /// Months remaining after the cliff
    pub fn post_cliff_months(&self) -> u32 {
        self.vesting_months.saturating_sub(self.cliff_months)
    }

    /// Check the schedule terms before any tranche is produced
    pub fn validate(&self) -> Result<()> {
        if self.vesting_months == 0 {
            return Err(VestingError::validation(
                "vesting_months",
                "must be greater than zero",
            ));
        }
        if self.cliff_months > self.vesting_months {
            return Err(VestingError::validation(
                "cliff_months",
                format!(
                    "cliff of {} months exceeds vesting period of {} months",
                    self.cliff_months, self.vesting_months
                ),
            ));
        }
        let period = self.vesting_frequency.period_months();
        if self.post_cliff_months() % period != 0 {
            return Err(VestingError::validation(
                "vesting_frequency",
                format!(
                    "{} months after the cliff is not a whole number of {} periods",
                    self.post_cliff_months(),
                    self.vesting_frequency
                ),
            ));
        }
        Ok(())
    }
}

/// A stock or option award: immutable terms plus store-owned lifecycle counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockGrant {
    // Identity
    pub id: String,
    pub employee_id: String,
    pub company_id: String,
    #[serde(default)]
    pub erp_id: Option<String>,

    // Terms
    pub grant_type: GrantType,
    pub grant_date: NaiveDate,
    pub shares_granted: u64,
    /// Exercise price, options only
    #[serde(default)]
    pub strike_price: Option<f64>,
    #[serde(default)]
    pub fair_value_per_share: f64,
    #[serde(default)]
    pub total_fair_value: f64,
    pub vesting_type: VestingType,
    pub vesting_schedule: VestingSchedule,
    /// Options only
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
    #[serde(default)]
    pub post_term_exercise_days: u32,
    #[serde(default)]
    pub agreement_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,

    // Lifecycle counters (read, never written, by this engine)
    #[serde(default)]
    pub status: GrantStatus,
    #[serde(default)]
    pub shares_vested: u64,
    #[serde(default)]
    pub shares_exercised: u64,
    #[serde(default)]
    pub shares_forfeited: u64,
    #[serde(default)]
    pub shares_remaining: u64,
}

impl StockGrant {
    /// Create a freshly issued, time-based grant with nothing vested yet
    pub fn new(
        id: impl Into<String>,
        employee_id: impl Into<String>,
        company_id: impl Into<String>,
        grant_type: GrantType,
        grant_date: NaiveDate,
        shares_granted: u64,
        vesting_schedule: VestingSchedule,
    ) -> Self {
        Self {
            id: id.into(),
            employee_id: employee_id.into(),
            company_id: company_id.into(),
            erp_id: None,
            grant_type,
            grant_date,
            shares_granted,
            strike_price: None,
            fair_value_per_share: 0.0,
            total_fair_value: 0.0,
            vesting_type: VestingType::TimeBased,
            vesting_schedule,
            expiration_date: None,
            post_term_exercise_days: 0,
            agreement_id: None,
            notes: None,
            status: GrantStatus::Active,
            shares_vested: 0,
            shares_exercised: 0,
            shares_forfeited: 0,
            shares_remaining: shares_granted,
        }
    }

    /// Attach option terms
    pub fn with_option_terms(mut self, strike_price: f64, expiration_date: NaiveDate) -> Self {
        self.strike_price = Some(strike_price);
        self.expiration_date = Some(expiration_date);
        self
    }

    /// Set the grant-date fair value; the total follows from the share count
    pub fn with_fair_value(mut self, fair_value_per_share: f64) -> Self {
        self.fair_value_per_share = fair_value_per_share;
        self.total_fair_value = fair_value_per_share * self.shares_granted as f64;
        self
    }

    pub fn with_vesting_type(mut self, vesting_type: VestingType) -> Self {
        self.vesting_type = vesting_type;
        self
    }

    /// Validate the vesting terms and instrument-specific fields
    pub fn validate(&self) -> Result<()> {
        if self.shares_granted == 0 {
            return Err(VestingError::validation(
                "shares_granted",
                "must be greater than zero",
            ));
        }
        self.vesting_schedule.validate()?;

        if self.grant_type.is_option() {
            match self.strike_price {
                Some(strike) if strike.is_finite() && strike >= 0.0 => {}
                Some(strike) => {
                    return Err(VestingError::validation(
                        "strike_price",
                        format!("{strike} is not a valid exercise price"),
                    ))
                }
                None => {
                    return Err(VestingError::validation(
                        "strike_price",
                        format!("required for {} grants", self.grant_type.as_str()),
                    ))
                }
            }
            match self.expiration_date {
                Some(expiry) if expiry > self.grant_date => {}
                Some(_) => {
                    return Err(VestingError::validation(
                        "expiration_date",
                        "must fall after the grant date",
                    ))
                }
                None => {
                    return Err(VestingError::validation(
                        "expiration_date",
                        format!("required for {} grants", self.grant_type.as_str()),
                    ))
                }
            }
        } else if self.strike_price.is_some() {
            return Err(VestingError::validation(
                "strike_price",
                "RSU grants carry no exercise price",
            ));
        }

        Ok(())
    }

    /// Verify that the store-owned counters reconcile to the granted share count
    pub fn check_counters(&self) -> Result<()> {
        let accounted = self
            .shares_vested
            .checked_add(self.shares_forfeited)
            .and_then(|n| n.checked_add(self.shares_remaining));
        if accounted != Some(self.shares_granted) {
            return Err(VestingError::CounterMismatch {
                grant_id: self.id.clone(),
                granted: self.shares_granted,
                vested: self.shares_vested,
                forfeited: self.shares_forfeited,
                remaining: self.shares_remaining,
            });
        }
        if self.shares_exercised > self.shares_vested {
            return Err(VestingError::validation(
                "shares_exercised",
                format!(
                    "grant {} exercised {} shares but only {} have vested",
                    self.id, self.shares_exercised, self.shares_vested
                ),
            ));
        }
        Ok(())
    }

    /// Vested shares not yet exercised
    pub fn shares_exercisable(&self) -> u64 {
        self.shares_vested.saturating_sub(self.shares_exercised)
    }
}
