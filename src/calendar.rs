//! Period calendar: month arithmetic and month labels
//!
//! Adding months clamps to the last day of the target month, so a grant dated
//! January 31st vests on February 28th (or 29th) one month later.

use chrono::{Datelike, Months, NaiveDate};

use crate::error::{Result, VestingError};

/// Add `months` calendar months to `date`
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or(VestingError::DateOverflow { months })
}

/// Label a date with its `YYYY-MM` month key
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Month keys from the month of `first` through the month of `last`, inclusive
pub fn month_keys_between(first: NaiveDate, last: NaiveDate) -> Vec<String> {
    let (mut year, mut month) = (first.year(), first.month());
    let end = (last.year(), last.month());
    let mut keys = Vec::new();
    while (year, month) <= end {
        keys.push(format!("{year:04}-{month:02}"));
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    keys
}
