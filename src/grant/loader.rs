//! Load grant books and tranche history from CSV

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::Reader;
use serde::Deserialize;

use super::{GrantStatus, GrantType, StockGrant, VestingFrequency, VestingSchedule, VestingType};
use crate::error::{Result, VestingError};
use crate::schedule::{TrancheStatus, VestingTranche};

/// Default location of the grant book
pub const DEFAULT_GRANT_BOOK_PATH: &str = "data/grants.csv";

/// Default location of realized and scheduled tranche history
pub const DEFAULT_TRANCHE_HISTORY_PATH: &str = "data/tranches.csv";

/// Raw CSV row of the grant book
#[derive(Debug, Deserialize)]
struct GrantRow {
    id: String,
    employee_id: String,
    company_id: String,
    erp_id: Option<String>,
    grant_type: String,
    grant_date: NaiveDate,
    shares_granted: u64,
    strike_price: Option<f64>,
    fair_value_per_share: Option<f64>,
    total_fair_value: Option<f64>,
    vesting_type: String,
    cliff_months: u32,
    vesting_months: u32,
    vesting_frequency: String,
    expiration_date: Option<NaiveDate>,
    post_term_exercise_days: Option<u32>,
    agreement_id: Option<String>,
    notes: Option<String>,
    status: Option<String>,
    shares_vested: Option<u64>,
    shares_exercised: Option<u64>,
    shares_forfeited: Option<u64>,
    shares_remaining: Option<u64>,
}

impl GrantRow {
    fn into_grant(self) -> Result<StockGrant> {
        let grant_type: GrantType = self.grant_type.parse()?;
        let vesting_type: VestingType = self.vesting_type.parse()?;
        let vesting_frequency: VestingFrequency = self.vesting_frequency.parse()?;
        let status = match self.status.as_deref() {
            Some(s) => s.parse()?,
            None => GrantStatus::Active,
        };

        let fair_value_per_share = self.fair_value_per_share.unwrap_or(0.0);
        let total_fair_value = self
            .total_fair_value
            .unwrap_or(fair_value_per_share * self.shares_granted as f64);

        let shares_vested = self.shares_vested.unwrap_or(0);
        let shares_forfeited = self.shares_forfeited.unwrap_or(0);
        // A blank remaining count is derived from the other counters
        let shares_remaining = match self.shares_remaining {
            Some(n) => n,
            None => self
                .shares_granted
                .checked_sub(shares_vested.saturating_add(shares_forfeited))
                .ok_or_else(|| {
                    VestingError::validation(
                        "shares_remaining",
                        format!("grant {} vested and forfeited exceed shares granted", self.id),
                    )
                })?,
        };

        Ok(StockGrant {
            id: self.id,
            employee_id: self.employee_id,
            company_id: self.company_id,
            erp_id: self.erp_id,
            grant_type,
            grant_date: self.grant_date,
            shares_granted: self.shares_granted,
            strike_price: self.strike_price,
            fair_value_per_share,
            total_fair_value,
            vesting_type,
            vesting_schedule: VestingSchedule::new(
                self.cliff_months,
                self.vesting_months,
                vesting_frequency,
            ),
            expiration_date: self.expiration_date,
            post_term_exercise_days: self.post_term_exercise_days.unwrap_or(0),
            agreement_id: self.agreement_id,
            notes: self.notes,
            status,
            shares_vested,
            shares_exercised: self.shares_exercised.unwrap_or(0),
            shares_forfeited,
            shares_remaining,
        })
    }
}

/// Raw CSV row of the tranche history
#[derive(Debug, Deserialize)]
struct TrancheRow {
    grant_id: String,
    vest_date: NaiveDate,
    shares_vesting: u64,
    cumulative_shares: u64,
    status: String,
}

/// Load all grants from a CSV file
pub fn load_grants<P: AsRef<Path>>(path: P) -> Result<Vec<StockGrant>> {
    let reader = Reader::from_path(path)?;
    read_grants(reader)
}

/// Load grants from any reader (e.g., string buffer, network stream)
pub fn load_grants_from_reader<R: Read>(reader: R) -> Result<Vec<StockGrant>> {
    read_grants(Reader::from_reader(reader))
}

/// Load grants from the default grant book location
pub fn load_default_book() -> Result<Vec<StockGrant>> {
    load_grants(DEFAULT_GRANT_BOOK_PATH)
}

fn read_grants<R: Read>(mut reader: Reader<R>) -> Result<Vec<StockGrant>> {
    let mut grants = Vec::new();
    for result in reader.deserialize() {
        let row: GrantRow = result?;
        grants.push(row.into_grant()?);
    }
    log::debug!("loaded {} grants", grants.len());
    Ok(grants)
}

/// Load tranche history from a CSV file, grouped by grant and ordered by vest date
pub fn load_tranche_history<P: AsRef<Path>>(
    path: P,
) -> Result<HashMap<String, Vec<VestingTranche>>> {
    let reader = Reader::from_path(path)?;
    read_tranches(reader)
}

/// Load tranche history from any reader
pub fn load_tranche_history_from_reader<R: Read>(
    reader: R,
) -> Result<HashMap<String, Vec<VestingTranche>>> {
    read_tranches(Reader::from_reader(reader))
}

fn read_tranches<R: Read>(mut reader: Reader<R>) -> Result<HashMap<String, Vec<VestingTranche>>> {
    let mut history: HashMap<String, Vec<VestingTranche>> = HashMap::new();
    for result in reader.deserialize() {
        let row: TrancheRow = result?;
        let status: TrancheStatus = row.status.parse()?;
        history.entry(row.grant_id).or_default().push(VestingTranche {
            vest_date: row.vest_date,
            shares_vesting: row.shares_vesting,
            cumulative_shares: row.cumulative_shares,
            status,
        });
    }
    for tranches in history.values_mut() {
        tranches.sort_by_key(|t| t.vest_date);
    }
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOK: &str = "\
id,employee_id,company_id,erp_id,grant_type,grant_date,shares_granted,strike_price,fair_value_per_share,total_fair_value,vesting_type,cliff_months,vesting_months,vesting_frequency,expiration_date,post_term_exercise_days,agreement_id,notes,status,shares_vested,shares_exercised,shares_forfeited,shares_remaining
G-100,E-7,C-1,ERP-9,RSU,2024-01-15,4800,,20.0,,TIME_BASED,12,48,monthly,,,AGR-1,new hire,ACTIVE,1200,,,
G-101,E-8,C-1,,ISO,2023-07-01,10000,4.25,1.9,19000.0,TIME_BASED,0,48,quarterly,2033-07-01,90,,,ACTIVE,2500,500,0,7500
";

    #[test]
    fn test_load_grants_from_reader() {
        let grants = load_grants_from_reader(BOOK.as_bytes()).expect("Failed to load grants");
        assert_eq!(grants.len(), 2);

        let rsu = &grants[0];
        assert_eq!(rsu.id, "G-100");
        assert_eq!(rsu.erp_id.as_deref(), Some("ERP-9"));
        assert_eq!(rsu.grant_type, GrantType::Rsu);
        assert_eq!(rsu.strike_price, None);
        assert_eq!(rsu.total_fair_value, 96_000.0);
        assert_eq!(rsu.vesting_schedule, VestingSchedule::new(12, 48, VestingFrequency::Monthly));
        assert_eq!(rsu.shares_remaining, 3_600);
        assert!(rsu.check_counters().is_ok());

        let iso = &grants[1];
        assert_eq!(iso.grant_type, GrantType::Iso);
        assert_eq!(iso.strike_price, Some(4.25));
        assert_eq!(iso.expiration_date, NaiveDate::from_ymd_opt(2033, 7, 1));
        assert_eq!(iso.post_term_exercise_days, 90);
        assert_eq!(iso.shares_exercisable(), 2_000);
        assert!(iso.validate().is_ok());
    }

    #[test]
    fn test_unknown_frequency_rejected() {
        let book = BOOK.replace("quarterly", "biweekly");
        let err = load_grants_from_reader(book.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            VestingError::Validation { field: "vesting_frequency", .. }
        ));
    }

    #[test]
    fn test_load_tranche_history_groups_and_sorts() {
        let csv = "\
grant_id,vest_date,shares_vesting,cumulative_shares,status
G-1,2025-02-15,100,1300,scheduled
G-1,2025-01-15,1200,1200,vested
G-2,2024-04-01,625,625,vested
";
        let history = load_tranche_history_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(history.len(), 2);

        let g1 = &history["G-1"];
        assert_eq!(g1.len(), 2);
        assert_eq!(g1[0].status, TrancheStatus::Vested);
        assert_eq!(g1[1].status, TrancheStatus::Scheduled);
        assert!(g1[0].vest_date < g1[1].vest_date);
    }
}
