//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::TermId;

/// Domain errors represent business rule violations.
///
/// The order engine reports them as rejected outcomes, not as `Err`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("category not found: {0}")]
    NotFound(TermId),

    #[error("cannot move category {id}: {reason}")]
    InvalidTransition { id: TermId, reason: &'static str },

    #[error("cannot make {new_parent} the parent of {id}: would create a cycle")]
    CycleRejected { id: TermId, new_parent: TermId },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
