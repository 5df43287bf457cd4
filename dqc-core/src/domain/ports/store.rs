// dqc-core/src/domain/ports/store.rs

use serde_json::Value;

use crate::domain::config::ConfigKind;
use crate::domain::error::DomainError;

/// Keyed storage for canonical config payloads, one logical table per kind.
/// Ids arrive already normalized.
pub trait ConfigStore: Send + Sync {
    /// Upsert: re-putting an id replaces the previous payload.
    fn put(&mut self, kind: ConfigKind, id: &str, payload: Value) -> Result<(), DomainError>;

    fn get(&self, kind: ConfigKind, id: &str) -> Result<Option<Value>, DomainError>;

    /// Drops every row of `kind`, so a reload replaces the kind instead of extending it.
    fn clear(&mut self, kind: ConfigKind) -> Result<(), DomainError>;

    /// All ids of `kind`, sorted.
    fn ids(&self, kind: ConfigKind) -> Result<Vec<String>, DomainError>;
}
