// dqc-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

use crate::domain::error::DomainError;

#[derive(Error, Debug, Diagnostic)]
pub enum DatabaseError {
    #[error("DuckDB Engine Error: {0}")]
    #[diagnostic(
        code(dqc::infra::database::duckdb),
        help("An error occurred inside the SQL engine.")
    )]
    DuckDB(#[from] duckdb::Error),

    #[error("Database connection lock poisoned")]
    #[diagnostic(code(dqc::infra::database::poisoned))]
    Poisoned,
}

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- DATABASE ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DatabaseError),

    // --- FILESYSTEM ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(dqc::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG DOCUMENTS ---
    #[error("YAML Parsing Error in '{path}': {source}")]
    #[diagnostic(
        code(dqc::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("JSON Error: {0}")]
    #[diagnostic(code(dqc::infra::json))]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(dqc::infra::config))]
    ConfigError(String),

    #[error("Config path not found: '{0}'")]
    #[diagnostic(
        code(dqc::infra::config_missing),
        help("Pass an existing file or directory containing the YAML config documents.")
    )]
    ConfigNotFound(String),

    // --- TEMPLATING ---
    #[error("Template Rendering Error: {0}")]
    #[diagnostic(
        code(dqc::infra::template),
        help("Check the Jinja syntax ({{ ... }}) inside the macro SQL file.")
    )]
    TemplateError(#[from] minijinja::Error),

    // --- SQL DRY RUN ---
    #[error("Generated SQL for '{rule_binding_id}' does not parse: {message}")]
    #[diagnostic(
        code(dqc::infra::sql_validation),
        help("Inspect the rendered SQL or rerun with --skip-sql-validation.")
    )]
    SqlValidation {
        rule_binding_id: String,
        message: String,
    },

    // Domain failures raised while an adapter was doing its job (merge conflicts, ...).
    #[error(transparent)]
    #[diagnostic(transparent)]
    Domain(#[from] DomainError),
}

impl From<duckdb::Error> for InfrastructureError {
    fn from(err: duckdb::Error) -> Self {
        InfrastructureError::Database(DatabaseError::DuckDB(err))
    }
}

impl InfrastructureError {
    /// Collapses into a domain error for adapters sitting behind a domain port.
    pub fn into_domain(self, wrap: fn(String) -> DomainError) -> DomainError {
        match self {
            InfrastructureError::Domain(inner) => inner,
            other => wrap(other.to_string()),
        }
    }
}
