//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::api::{STATUS_BAD_REQUEST, STATUS_CONFLICT, STATUS_NOT_FOUND};
use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::exitcode;
use crate::infrastructure::{InfraError, StoreError};

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    /// Unsuccessful response from the transport facade
    #[error("{message}")]
    Request { status: u16, message: String },

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("output encoding failed: {0}")]
    Output(#[from] serde_json::Error),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => exitcode::USAGE,
            CliError::Output(_) => exitcode::SOFTWARE,
            CliError::Request { status, .. } => match *status {
                STATUS_NOT_FOUND => exitcode::NOINPUT,
                STATUS_BAD_REQUEST | STATUS_CONFLICT => exitcode::DATAERR,
                _ => exitcode::IOERR,
            },
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => exitcode::IOERR,
                InfraError::Application(app) => match app {
                    ApplicationError::Domain(DomainError::NotFound(_)) => exitcode::NOINPUT,
                    ApplicationError::Domain(_) => exitcode::DATAERR,
                    ApplicationError::Store(StoreError::TermNotFound(_)) => exitcode::NOINPUT,
                    ApplicationError::Store(StoreError::Serialization { .. }) => {
                        exitcode::DATAERR
                    }
                    ApplicationError::Store(StoreError::Unavailable(_)) => exitcode::UNAVAILABLE,
                    ApplicationError::Store(StoreError::Io { .. }) => exitcode::IOERR,
                    ApplicationError::Config { .. } => exitcode::CONFIG,
                },
            },
        }
    }
}
