// dqc-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

/// Maximum number of identifiers echoed back in a not-found diagnostic.
pub const MAX_LISTED_IDS: usize = 50;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Invalid config '{config_id}': {message}")]
    #[diagnostic(code(dqc::domain::validation))]
    InvalidConfig { config_id: String, message: String },

    #[error(
        "Detected Duplicated Config ID(s): {ids:?}. If a config ID is repeated, it must be for an identical configuration.\nDuplicated config contents:\n{existing}\n{incoming}"
    )]
    #[diagnostic(
        code(dqc::domain::conflict),
        help("Remove one of the declarations or make them identical.")
    )]
    DuplicateConfig {
        ids: Vec<String>,
        existing: String,
        incoming: String,
    },

    #[error("{kind} ID '{id}' not found in '{kind}' config cache. Available IDs:\n{available}")]
    #[diagnostic(code(dqc::domain::not_found))]
    ConfigNotFound {
        kind: String,
        id: String,
        available: String,
    },

    #[error(
        "Column '{column_id}' declares type '{declared_type}' which has no supported mapping for database {dialect}"
    )]
    #[diagnostic(
        code(dqc::domain::unsupported_type),
        help("Cast the column to a supported type in a view and point the entity at it.")
    )]
    UnsupportedColumnType {
        column_id: String,
        declared_type: String,
        dialect: String,
    },

    #[error("Failed to load {kind} from file path: {path}")]
    #[diagnostic(code(dqc::domain::missing_required))]
    MissingRequiredConfig { kind: String, path: String },

    #[error("No entities found for requested rule bindings: {0:?}")]
    #[diagnostic(code(dqc::domain::no_entities))]
    NoEntitiesFound(Vec<String>),

    #[error("Config store error: {0}")]
    #[diagnostic(code(dqc::domain::store))]
    Store(String),

    #[error("Config source error: {0}")]
    #[diagnostic(
        code(dqc::domain::source),
        help("Check that the config path exists and every document is valid YAML.")
    )]
    Source(String),
}

impl DomainError {
    pub fn invalid(config_id: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::InvalidConfig {
            config_id: config_id.into(),
            message: message.into(),
        }
    }
}

/// Renders an id listing capped at [`MAX_LISTED_IDS`] entries.
pub fn bounded_listing(ids: &[String]) -> String {
    if ids.is_empty() {
        return "  (none loaded)".to_string();
    }
    let mut out: Vec<String> = ids
        .iter()
        .take(MAX_LISTED_IDS)
        .map(|id| format!("  - {}", id))
        .collect();
    if ids.len() > MAX_LISTED_IDS {
        out.push(format!("  ... and {} more", ids.len() - MAX_LISTED_IDS));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_listing_caps_output() {
        let ids: Vec<String> = (0..60).map(|i| format!("ID_{}", i)).collect();
        let listing = bounded_listing(&ids);
        assert!(listing.contains("ID_49"));
        assert!(!listing.contains("ID_50\n"));
        assert!(listing.ends_with("... and 10 more"));
    }

    #[test]
    fn test_bounded_listing_empty() {
        assert_eq!(bounded_listing(&[]), "  (none loaded)");
    }
}
