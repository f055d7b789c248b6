//! Grant data structures and grant book loading

mod data;
pub mod loader;

pub use data::{GrantStatus, GrantType, StockGrant, VestingFrequency, VestingSchedule, VestingType};
pub use loader::{
    load_default_book, load_grants, load_grants_from_reader, load_tranche_history,
    load_tranche_history_from_reader, DEFAULT_GRANT_BOOK_PATH, DEFAULT_TRANCHE_HISTORY_PATH,
};
