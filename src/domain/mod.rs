//! Domain layer: entities and tree logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;

pub use arena::{ArenaNode, TermArena};
pub use builder::{CategoryTree, TreeBuilder};
pub use entities::*;
pub use error::DomainError;
