//! Category tree ordering engine
//!
//! Keeps an explicit rank and hierarchy for categories held in an external
//! taxonomy store: sibling moves, promotion and demotion across levels,
//! cycle-safe reparenting, layout hints and childless classification.
//!
//! Layers:
//! - [`domain`]: terms, tree nodes and the tree builder (no I/O)
//! - [`application`]: order engine, query facade and transport facade
//! - [`infrastructure`]: store trait and adapters, DI container
//! - [`cli`]: command line surface

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
