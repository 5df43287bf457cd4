// dqc-core/src/domain/cache.rs

// Symbol table of validated configs. Populated once per run, read-only afterwards.

use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

use crate::domain::batching::EntitySummary;
use crate::domain::config::raw::normalize_id;
use crate::domain::config::{
    ConfigKind, ConfigModel, Entity, ReferenceColumns, RowFilter, Rule, RuleBinding,
    RuleDimensions,
};
use crate::domain::error::{DomainError, bounded_listing};
use crate::domain::merge::ConfigCollection;
use crate::domain::ports::ConfigStore;

pub struct ConfigsCache {
    store: Box<dyn ConfigStore>,
}

impl ConfigsCache {
    pub fn new(store: Box<dyn ConfigStore>) -> Self {
        Self { store }
    }

    /// Replaces every config of `kind` with the validated `collection`. Returns the number of rows written.
    #[instrument(skip(self, collection), fields(kind = %kind))]
    pub fn load_all(
        &mut self,
        kind: ConfigKind,
        collection: &ConfigCollection,
    ) -> Result<usize, DomainError> {
        // A persistent store may still hold rows from an earlier run.
        self.store.clear(kind)?;
        let written = match (kind, collection) {
            (ConfigKind::RuleDimensions, ConfigCollection::Set(values)) => {
                let dimensions = RuleDimensions::parse(values)?;
                for dimension in &dimensions.dimensions {
                    self.store
                        .put(kind, dimension, Value::String(dimension.clone()))?;
                }
                dimensions.dimensions.len()
            }
            (ConfigKind::Rule, ConfigCollection::Map(configs)) => {
                let allowed = self.get_rule_dimensions()?;
                for (id, value) in configs {
                    let id = normalize_id(id);
                    let rule = Rule::parse(&id, value)?;
                    rule.validate_dimension(&allowed.dimensions)?;
                    self.store.put(kind, &id, rule.to_raw())?;
                }
                configs.len()
            }
            (_, ConfigCollection::Map(configs)) if kind != ConfigKind::RuleDimensions => {
                for (id, value) in configs {
                    let id = normalize_id(id);
                    let model = ConfigModel::parse(kind, &id, value)?;
                    self.store.put(kind, &id, model.to_raw())?;
                }
                configs.len()
            }
            (_, other) => {
                return Err(DomainError::invalid(
                    kind.as_str(),
                    format!(
                        "Collection shape does not match config kind '{}': {:?}",
                        kind, other
                    ),
                ));
            }
        };
        info!(kind = %kind, count = written, "Loaded configs into cache");
        Ok(written)
    }

    pub fn ids(&self, kind: ConfigKind) -> Result<Vec<String>, DomainError> {
        self.store.ids(kind)
    }

    fn fetch(&self, kind: ConfigKind, id: &str) -> Result<(String, Value), DomainError> {
        let key = normalize_id(id);
        match self.store.get(kind, &key)? {
            Some(payload) => Ok((key, payload)),
            None => Err(DomainError::ConfigNotFound {
                kind: kind.display_name().to_string(),
                id: key,
                available: bounded_listing(&self.store.ids(kind)?),
            }),
        }
    }

    pub fn get_entity(&self, entity_id: &str) -> Result<Entity, DomainError> {
        let (id, payload) = self.fetch(ConfigKind::Entity, entity_id)?;
        Entity::parse(&id, &payload)
    }

    pub fn get_rule(&self, rule_id: &str) -> Result<Rule, DomainError> {
        let (id, payload) = self.fetch(ConfigKind::Rule, rule_id)?;
        Rule::parse(&id, &payload)
    }

    pub fn get_rule_binding(&self, rule_binding_id: &str) -> Result<RuleBinding, DomainError> {
        let (id, payload) = self.fetch(ConfigKind::RuleBinding, rule_binding_id)?;
        RuleBinding::parse(&id, &payload)
    }

    pub fn get_row_filter(&self, row_filter_id: &str) -> Result<RowFilter, DomainError> {
        let (id, payload) = self.fetch(ConfigKind::RowFilter, row_filter_id)?;
        RowFilter::parse(&id, &payload)
    }

    pub fn get_reference_columns(
        &self,
        reference_columns_id: &str,
    ) -> Result<ReferenceColumns, DomainError> {
        let (id, payload) = self.fetch(ConfigKind::ReferenceColumns, reference_columns_id)?;
        ReferenceColumns::parse(&id, &payload)
    }

    pub fn get_rule_dimensions(&self) -> Result<RuleDimensions, DomainError> {
        let dimensions = self.store.ids(ConfigKind::RuleDimensions)?;
        Ok(RuleDimensions {
            dimensions: dimensions.into_iter().collect(),
        })
    }

    /// Walks binding -> entity for the targets and groups bindings per `(schema, table)`,
    /// keeping the order in which targets were given. Unknown binding ids are skipped.
    #[instrument(skip(self))]
    pub fn entity_summaries(
        &self,
        target_rule_binding_ids: &[String],
    ) -> Result<Vec<EntitySummary>, DomainError> {
        let mut order: Vec<(String, String)> = Vec::new();
        let mut grouped: BTreeMap<(String, String), Vec<(String, usize)>> = BTreeMap::new();

        for target in target_rule_binding_ids {
            let key = normalize_id(target);
            let Some(payload) = self.store.get(ConfigKind::RuleBinding, &key)? else {
                debug!(rule_binding_id = %key, "Binding not in cache, skipped for batching");
                continue;
            };
            let binding = RuleBinding::parse(&key, &payload)?;
            let entity = self.get_entity(&binding.entity_id)?;
            let table = (entity.schema_name, entity.table_name);

            let bindings = grouped.entry(table.clone()).or_insert_with(|| {
                order.push(table.clone());
                Vec::new()
            });
            if !bindings.iter().any(|(id, _)| id == &key) {
                bindings.push((key, binding.rule_ids.len()));
            }
        }

        if order.is_empty() {
            return Err(DomainError::NoEntitiesFound(
                target_rule_binding_ids.to_vec(),
            ));
        }

        Ok(order
            .into_iter()
            .map(|table| {
                let rule_bindings = grouped.remove(&table).unwrap_or_default();
                EntitySummary {
                    schema_name: table.0,
                    table_name: table.1,
                    rule_bindings,
                }
            })
            .collect())
    }
}
