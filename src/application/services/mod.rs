//! Application services

pub mod order;
pub mod query;

pub use order::{BulkReport, OrderService, Outcome, DEFAULT_MAX_DEPTH};
pub use query::{CategorySnapshot, QueryService};
