// dqc-core/src/domain/config/entity.rs

use regex::Regex;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::debug;

use crate::domain::config::column_type::{CanonicalType, DeclaredColumnType, SourceDialect};
use crate::domain::config::raw::{self, RawConfig};
use crate::domain::error::{DomainError, bounded_listing};

/// Per-dialect templates for entity naming fields. Placeholders are filled from the raw config.
fn entity_config_template(dialect: SourceDialect, config_key: &str) -> Option<&'static str> {
    match (dialect, config_key) {
        (SourceDialect::MySql | SourceDialect::Redshift, "table_name") => Some("{table_name}"),
        (SourceDialect::MySql | SourceDialect::Redshift, "schema_name") => Some("{schema_name}"),
        (SourceDialect::MySql | SourceDialect::Redshift, "instance_name") => Some("{project_name}"),
        (SourceDialect::MySql | SourceDialect::Redshift, "resource_type") => {
            Some("{resource_type}")
        }
        _ => None,
    }
}

fn re_template_argument() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .unwrap_or_else(|_| Regex::new("$^").unwrap_or_else(|_| unreachable!()))
    })
}

fn template_arguments(template: &str) -> Vec<String> {
    re_template_argument()
        .captures_iter(template)
        .map(|c| c[1].to_string())
        .collect()
}

/// Fills a dialect template from `configs_map`. When a placeholder cannot be satisfied,
/// falls back to a literal `config_key` entry, otherwise reports the incomplete config.
pub fn resolve_entity_config(
    entity_id: &str,
    configs_map: &RawConfig,
    dialect: SourceDialect,
    config_key: &str,
) -> Result<String, DomainError> {
    let template = entity_config_template(dialect, config_key).ok_or_else(|| {
        DomainError::invalid(
            entity_id,
            format!(
                "Entity Config ID '{}' with source_database '{}' has unsupported config value '{}'.",
                entity_id, dialect, config_key
            ),
        )
    })?;

    let arguments = template_arguments(template);
    let mut rendered = template.to_string();
    let mut complete = true;
    for argument in &arguments {
        let value = configs_map
            .get(argument)
            .filter(|v| !raw::is_empty_value(v))
            .and_then(raw::scalar_to_string);
        match value {
            Some(v) => rendered = rendered.replace(&format!("{{{}}}", argument), &v),
            None => {
                complete = false;
                break;
            }
        }
    }
    if complete {
        return Ok(rendered);
    }

    if let Some(literal) = configs_map
        .get(config_key)
        .filter(|v| !raw::is_empty_value(v))
        .and_then(raw::scalar_to_string)
    {
        return Ok(literal);
    }

    Err(DomainError::invalid(
        entity_id,
        format!(
            "Entity Config ID '{}' with source_database '{}' has incomplete config values.\nConfigs required: '{:?}'.\nConfigs supplied: '{}'.",
            entity_id,
            dialect,
            arguments,
            raw::map_payload(configs_map)
        ),
    ))
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityColumn {
    pub column_id: String,
    pub column_name: String,
    pub declared_type: DeclaredColumnType,
    pub source_dialect: SourceDialect,
}

impl EntityColumn {
    pub fn parse(
        column_id: &str,
        value: &Value,
        source_dialect: SourceDialect,
    ) -> Result<Self, DomainError> {
        let map = raw::as_object(column_id, value, "Column config")?;
        let column_name = raw::required_str(column_id, map, "name")?;
        let data_type = raw::required_str(column_id, map, "data_type")?;
        let declared_type = DeclaredColumnType::parse(&data_type).ok_or_else(|| {
            DomainError::invalid(
                column_id,
                format!(
                    "Invalid Column Type '{}' for Database {}. Allowed types: {:?}",
                    data_type,
                    source_dialect,
                    DeclaredColumnType::ALL
                        .iter()
                        .map(|t| t.as_str())
                        .collect::<Vec<_>>()
                ),
            )
        })?;
        // Unmapped types are rejected at load time, not when SQL is generated.
        source_dialect.canonical_type(column_id, declared_type)?;

        Ok(Self {
            column_id: column_id.to_string(),
            column_name,
            declared_type,
            source_dialect,
        })
    }

    pub fn canonical_type(&self) -> Result<CanonicalType, DomainError> {
        self.source_dialect
            .canonical_type(&self.column_id, self.declared_type)
    }

    pub fn to_raw(&self) -> Value {
        json!({
            "name": self.column_name,
            "data_type": self.declared_type.as_str(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentOverride {
    pub schema_name: String,
    pub table_name: String,
    /// Everything else declared for the environment (`environment`, `override`, ...).
    pub extra: RawConfig,
}

impl EnvironmentOverride {
    pub fn to_raw(&self) -> Value {
        let mut out = RawConfig::new();
        out.insert("schema_name".into(), Value::String(self.schema_name.clone()));
        out.insert("table_name".into(), Value::String(self.table_name.clone()));
        for (k, v) in &self.extra {
            out.insert(k.clone(), v.clone());
        }
        Value::Object(out)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub entity_id: String,
    pub source_dialect: SourceDialect,
    pub table_name: String,
    pub schema_name: String,
    pub columns: BTreeMap<String, EntityColumn>,
    pub environment_override: BTreeMap<String, EnvironmentOverride>,
    pub partition_fields: Option<Value>,
}

impl Entity {
    pub fn parse(entity_id: &str, value: &Value) -> Result<Self, DomainError> {
        let map = raw::as_object(entity_id, value, "Entity config")?;
        debug!(entity_id, "Parsing entity config");

        let source_database = raw::required_str(entity_id, map, "source_database")?;
        let source_dialect = SourceDialect::parse(&source_database).ok_or_else(|| {
            DomainError::invalid(
                entity_id,
                format!(
                    "Entity Config ID '{}' has unsupported source_database '{}'. Allowed values: {:?}",
                    entity_id,
                    source_database.to_uppercase(),
                    SourceDialect::allowed_values()
                ),
            )
        })?;

        let table_name = resolve_entity_config(entity_id, map, source_dialect, "table_name")?;
        let schema_name = resolve_entity_config(entity_id, map, source_dialect, "schema_name")?;

        let partition_fields = map.get("partition_fields").filter(|v| !v.is_null()).cloned();

        let columns_value = raw::required(entity_id, map, "columns")?;
        let columns_map = raw::as_object(entity_id, columns_value, "Entity 'columns'")?;
        let mut columns = BTreeMap::new();
        for (column_id, column_config) in columns_map {
            let column_id = raw::normalize_id(column_id);
            if columns.contains_key(&column_id) {
                return Err(DomainError::invalid(
                    entity_id,
                    format!(
                        "Entity Config ID '{}' declares column '{}' more than once (column IDs are case-insensitive).",
                        entity_id, column_id
                    ),
                ));
            }
            let column = EntityColumn::parse(&column_id, column_config, source_dialect)?;
            columns.insert(column_id, column);
        }

        let environment_override = match map.get("environment_override") {
            None | Some(Value::Null) => BTreeMap::new(),
            Some(Value::Object(overrides)) => Self::parse_overrides(
                entity_id,
                overrides,
                source_dialect,
                &table_name,
            )?,
            Some(other) => {
                return Err(DomainError::invalid(
                    entity_id,
                    format!(
                        "Entity Config ID '{}' has an 'environment_override' that is not a mapping:\n{}",
                        entity_id,
                        raw::payload(other)
                    ),
                ));
            }
        };

        Ok(Entity {
            entity_id: entity_id.to_string(),
            source_dialect,
            table_name,
            schema_name,
            columns,
            environment_override,
            partition_fields,
        })
    }

    fn parse_overrides(
        entity_id: &str,
        overrides: &RawConfig,
        dialect: SourceDialect,
        base_table_name: &str,
    ) -> Result<BTreeMap<String, EnvironmentOverride>, DomainError> {
        let mut out = BTreeMap::new();
        for (key, value) in overrides {
            let entry = raw::as_object(entity_id, value, "Environment override")?;
            let target_env = raw::required_str(entity_id, entry, "environment")?;
            if !target_env.eq_ignore_ascii_case(key) {
                return Err(DomainError::invalid(
                    entity_id,
                    format!(
                        "Environment target key {} must match value '{}'.",
                        key, target_env
                    ),
                ));
            }
            let override_value = raw::required(entity_id, entry, "override")?;
            let override_configs = raw::as_object(entity_id, override_value, "'override'")?;

            let schema_name =
                resolve_entity_config(entity_id, override_configs, dialect, "schema_name")?;
            let table_name =
                resolve_entity_config(entity_id, override_configs, dialect, "table_name")
                    .unwrap_or_else(|_| base_table_name.to_string());

            let extra: RawConfig = entry
                .iter()
                .filter(|(k, _)| k.as_str() != "schema_name" && k.as_str() != "table_name")
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();

            out.insert(
                target_env,
                EnvironmentOverride {
                    schema_name,
                    table_name,
                    extra,
                },
            );
        }
        Ok(out)
    }

    /// Canonical map form. Empty `environment_override` is dropped.
    pub fn to_raw(&self) -> Value {
        let columns: RawConfig = self
            .columns
            .iter()
            .map(|(id, c)| (id.clone(), c.to_raw()))
            .collect();

        let mut out = RawConfig::new();
        out.insert(
            "source_database".into(),
            Value::String(self.source_dialect.as_str().to_string()),
        );
        out.insert("table_name".into(), Value::String(self.table_name.clone()));
        out.insert("schema_name".into(), Value::String(self.schema_name.clone()));
        out.insert("columns".into(), Value::Object(columns));
        out.insert(
            "partition_fields".into(),
            self.partition_fields.clone().unwrap_or(Value::Null),
        );
        if !self.environment_override.is_empty() {
            let overrides: RawConfig = self
                .environment_override
                .iter()
                .map(|(env, o)| (env.clone(), o.to_raw()))
                .collect();
            out.insert("environment_override".into(), Value::Object(overrides));
        }
        Value::Object(out)
    }

    pub fn fully_qualified_table_name(&self) -> String {
        format!("{}.{}", self.schema_name, self.table_name)
    }

    pub fn resolve_column(&self, column_id: &str) -> Result<&EntityColumn, DomainError> {
        let key = raw::normalize_id(column_id);
        self.columns.get(&key).ok_or_else(|| {
            let available: Vec<String> = self.columns.keys().cloned().collect();
            DomainError::invalid(
                &self.entity_id,
                format!(
                    "Column ID '{}' not found in Entity Config ID '{}'.\nAvailable column_ids:\n{}\nComplete entity configs:\n{}",
                    key,
                    self.entity_id,
                    bounded_listing(&available),
                    raw::payload(&self.to_raw())
                ),
            )
        })
    }

    /// Applies the override declared for `environment`, if any (case-insensitive match).
    pub fn for_environment(&self, environment: &str) -> Entity {
        let mut entity = self.clone();
        if let Some(o) = self
            .environment_override
            .iter()
            .find(|(env, _)| env.eq_ignore_ascii_case(environment))
            .map(|(_, o)| o)
        {
            debug!(
                entity_id = %self.entity_id,
                environment,
                "Applying environment override"
            );
            entity.schema_name = o.schema_name.clone();
            entity.table_name = o.table_name.clone();
        }
        entity
    }
}
