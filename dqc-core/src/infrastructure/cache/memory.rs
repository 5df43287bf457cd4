// dqc-core/src/infrastructure/cache/memory.rs

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use crate::domain::config::ConfigKind;
use crate::domain::error::DomainError;
use crate::domain::ports::ConfigStore;

/// Single-run store. Sorted per kind so id listings are stable.
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    tables: HashMap<ConfigKind, BTreeMap<String, Value>>,
}

impl ConfigStore for InMemoryConfigStore {
    fn put(&mut self, kind: ConfigKind, id: &str, payload: Value) -> Result<(), DomainError> {
        self.tables
            .entry(kind)
            .or_default()
            .insert(id.to_string(), payload);
        Ok(())
    }

    fn clear(&mut self, kind: ConfigKind) -> Result<(), DomainError> {
        self.tables.remove(&kind);
        Ok(())
    }

    fn get(&self, kind: ConfigKind, id: &str) -> Result<Option<Value>, DomainError> {
        Ok(self.tables.get(&kind).and_then(|t| t.get(id)).cloned())
    }

    fn ids(&self, kind: ConfigKind) -> Result<Vec<String>, DomainError> {
        Ok(self
            .tables
            .get(&kind)
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_put_is_an_upsert() {
        let mut store = InMemoryConfigStore::default();
        store.put(ConfigKind::RowFilter, "A", json!({"v": 1})).unwrap();
        store.put(ConfigKind::RowFilter, "A", json!({"v": 2})).unwrap();
        assert_eq!(
            store.get(ConfigKind::RowFilter, "A").unwrap(),
            Some(json!({"v": 2}))
        );
        assert_eq!(store.ids(ConfigKind::RowFilter).unwrap(), vec!["A"]);
    }

    #[test]
    fn test_clear_drops_one_kind() {
        let mut store = InMemoryConfigStore::default();
        store.put(ConfigKind::Rule, "A", json!({})).unwrap();
        store.put(ConfigKind::Entity, "A", json!({})).unwrap();
        store.clear(ConfigKind::Rule).unwrap();
        assert!(store.ids(ConfigKind::Rule).unwrap().is_empty());
        assert_eq!(store.ids(ConfigKind::Entity).unwrap(), vec!["A"]);
    }

    #[test]
    fn test_kinds_are_isolated() {
        let mut store = InMemoryConfigStore::default();
        store.put(ConfigKind::Rule, "A", json!({})).unwrap();
        assert_eq!(store.get(ConfigKind::Entity, "A").unwrap(), None);
        assert!(store.ids(ConfigKind::Entity).unwrap().is_empty());
    }
}
