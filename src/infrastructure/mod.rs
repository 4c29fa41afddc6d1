//! Infrastructure layer: store adapters, I/O implementations and DI container
//!
//! This layer implements I/O boundary traits and wires up services.

pub mod di;
pub mod error;
pub mod store;
pub mod traits;

pub use error::{InfraError, InfraResult, StoreError, StoreResult};
pub use store::{JsonFileTermStore, MemoryTermStore, MetaKeys};
pub use traits::{FileSystem, RealFileSystem, TermFilter, TermStore};
