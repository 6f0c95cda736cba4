pub mod config;
pub mod errors;
pub mod filters;
pub mod grouping;
pub mod logging;
pub mod persistence;

pub use errors::FilterError;
pub use filters::{FilterStore, ScopeState};
pub use grouping::{IssueGrouping, group_issues};
