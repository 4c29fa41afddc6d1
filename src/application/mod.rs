//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod api;
pub mod error;
pub mod services;

pub use api::{CategoryApi, CategoryResponse, OrderAction, UpdateOrderRequest};
pub use error::{ApplicationError, ApplicationResult};
pub use services::{BulkReport, OrderService, Outcome, QueryService};
