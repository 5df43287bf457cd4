// dqc-core/src/domain/ports/source.rs

use std::path::Path;

use crate::domain::config::ConfigKind;
use crate::domain::error::DomainError;
use crate::domain::merge::ConfigCollection;

/// Produces the merged collection of one kind from wherever config documents live.
pub trait ConfigSource: Send + Sync {
    fn load(&self, path: &Path, kind: ConfigKind) -> Result<ConfigCollection, DomainError>;
}
