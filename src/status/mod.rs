//! Vesting status reporting over an external grant store

mod reporter;
mod store;

pub use reporter::{VestingStatus, VestingStatusReporter};
pub use store::{GrantRecord, GrantStore, InMemoryGrantStore};
