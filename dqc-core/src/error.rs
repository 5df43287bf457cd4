// dqc-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DqcError {
    // --- Domain (validation, conflicts, lookups) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Domain(#[from] DomainError),

    // --- Infrastructure (IO, parsing, warehouse) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Infrastructure(#[from] InfrastructureError),

    #[error("Internal Error: {0}")]
    #[diagnostic(code(dqc::internal))]
    InternalError(String),
}

impl From<std::io::Error> for DqcError {
    fn from(err: std::io::Error) -> Self {
        DqcError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl From<duckdb::Error> for DqcError {
    fn from(err: duckdb::Error) -> Self {
        DqcError::Infrastructure(InfrastructureError::from(err))
    }
}
