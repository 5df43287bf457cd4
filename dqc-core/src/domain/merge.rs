// dqc-core/src/domain/merge.rs

// Combines config fragments found across documents into one collection per kind.

use serde_json::Value;
use std::collections::BTreeSet;

use crate::domain::config::raw::{self, RawConfig};
use crate::domain::config::{ConfigKind, MergeStrategy};
use crate::domain::error::DomainError;

/// Merged configs of one kind, before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigCollection {
    Map(RawConfig),
    Set(Vec<Value>),
}

impl ConfigCollection {
    pub fn empty(kind: ConfigKind) -> Self {
        match kind.merge_strategy() {
            MergeStrategy::Map => ConfigCollection::Map(RawConfig::new()),
            MergeStrategy::Set => ConfigCollection::Set(Vec::new()),
        }
    }

    /// Wraps a document node in the collection shape its kind expects.
    pub fn from_node(kind: ConfigKind, node: &Value) -> Result<Self, DomainError> {
        match (kind.merge_strategy(), node) {
            (_, Value::Null) => Ok(Self::empty(kind)),
            (MergeStrategy::Map, Value::Object(map)) => {
                // Ids differing only in case collapse onto one key and must agree.
                let mut out = RawConfig::new();
                for (id, value) in map {
                    let mut single = RawConfig::new();
                    single.insert(raw::normalize_id(id), value.clone());
                    out = merge_maps(out, single)?;
                }
                Ok(ConfigCollection::Map(out))
            }
            (MergeStrategy::Set, Value::Array(items)) => Ok(ConfigCollection::Set(items.clone())),
            (strategy, other) => Err(DomainError::invalid(
                kind.as_str(),
                format!(
                    "Config node '{}' must be a {}, got:\n{}",
                    kind.as_str(),
                    if strategy == MergeStrategy::Map {
                        "mapping of config IDs"
                    } else {
                        "list"
                    },
                    raw::payload(other)
                ),
            )),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        match self {
            ConfigCollection::Map(m) => m.len(),
            ConfigCollection::Set(s) => s.len(),
        }
    }

    pub fn merge(self, other: ConfigCollection) -> Result<ConfigCollection, DomainError> {
        match (self, other) {
            (ConfigCollection::Map(old), ConfigCollection::Map(new)) => {
                merge_maps(old, new).map(ConfigCollection::Map)
            }
            (ConfigCollection::Set(old), ConfigCollection::Set(new)) => {
                merge_sets(old, new).map(ConfigCollection::Set)
            }
            (old, new) => Err(DomainError::invalid(
                "merge",
                format!(
                    "Cannot merge config collections of different shapes: {:?} and {:?}",
                    old, new
                ),
            )),
        }
    }

    pub fn ids(&self) -> Vec<String> {
        match self {
            ConfigCollection::Map(m) => m.keys().cloned().collect(),
            ConfigCollection::Set(_) => Vec::new(),
        }
    }
}

/// Union of two id -> config maps. Shared ids must carry deep-equal payloads.
pub fn merge_maps(old: RawConfig, new: RawConfig) -> Result<RawConfig, DomainError> {
    if old.is_empty() {
        return Ok(new);
    }
    if new.is_empty() {
        return Ok(old);
    }

    let mut existing = RawConfig::new();
    let mut incoming = RawConfig::new();
    for (id, value) in &new {
        if let Some(previous) = old.get(id) {
            existing.insert(id.clone(), previous.clone());
            incoming.insert(id.clone(), value.clone());
        }
    }
    if existing != incoming {
        return Err(DomainError::DuplicateConfig {
            ids: existing.keys().cloned().collect(),
            existing: raw::map_payload(&existing),
            incoming: raw::map_payload(&incoming),
        });
    }

    let mut merged = old;
    merged.extend(new);
    Ok(merged)
}

/// Both sides must hold the same members when non-empty; no silent extension.
pub fn merge_sets(old: Vec<Value>, new: Vec<Value>) -> Result<Vec<Value>, DomainError> {
    if old.is_empty() {
        return Ok(new);
    }
    if new.is_empty() {
        return Ok(old);
    }
    if set_members(&old) != set_members(&new) {
        return Err(DomainError::DuplicateConfig {
            ids: vec![ConfigKind::RuleDimensions.as_str().to_string()],
            existing: raw::payload(&Value::Array(old)),
            incoming: raw::payload(&Value::Array(new)),
        });
    }
    Ok(old)
}

fn set_members(values: &[Value]) -> BTreeSet<String> {
    values
        .iter()
        .map(|v| {
            raw::scalar_to_string(v)
                .unwrap_or_else(|| v.to_string())
                .trim()
                .to_uppercase()
        })
        .collect()
}
