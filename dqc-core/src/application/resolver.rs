// dqc-core/src/application/resolver.rs

// Joins one rule binding across the cache into a self-contained, fingerprinted tree.

use serde::Serialize;
use serde_json::{Map, Value, json};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use crate::domain::cache::ConfigsCache;
use crate::domain::config::RawConfig;
use crate::error::DqcError;
use crate::ports::executor::QueryExecutor;

/// Watermark used when a binding has never run.
pub const WATERMARK_FLOOR: &str = "2022-01-01 00:00:00";

/// Run-scoped settings shared by every binding of one invocation.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub dq_summary_table_name: String,
    pub dq_summary_schema: String,
    pub environment: Option<String>,
    pub metadata: RawConfig,
    pub dq_summary_table_exists: bool,
    pub progress_watermark: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedRuleBinding {
    pub rule_binding_id: String,
    pub configs: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    pub dq_summary_table_name: String,
    pub metadata: RawConfig,
    pub dq_summary_table_exists: bool,
    pub configs_hashsum: String,
    pub progress_watermark: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_watermark_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_timestamp_value: Option<Value>,
    pub high_watermark_filter_exists: bool,
}

impl ResolvedRuleBinding {
    /// Template context (the tree as a JSON object).
    pub fn to_context(&self) -> Result<Value, DqcError> {
        serde_json::to_value(self).map_err(|e| DqcError::Infrastructure(e.into()))
    }

    pub fn fully_qualified_table_name(&self) -> String {
        let entity = &self.configs["entity_configs"];
        format!(
            "{}.{}",
            entity["schema_name"].as_str().unwrap_or_default(),
            entity["table_name"].as_str().unwrap_or_default()
        )
    }
}

/// SHA-256 over the canonical (sorted-key, whitespace-free) JSON form.
pub fn configs_hashsum(configs: &Value) -> Result<String, DqcError> {
    let canonical = serde_json_canonicalizer::to_vec(configs)
        .map_err(|e| DqcError::InternalError(format!("JSON canonicalization failed: {}", e)))?;
    Ok(hex::encode(Sha256::digest(&canonical)))
}

fn sql_quote(value: &str) -> String {
    value.replace('\'', "''")
}

pub fn high_watermark_query(
    dq_summary_schema: &str,
    dq_summary_table_name: &str,
    fully_qualified_table_name: &str,
    rule_binding_id: &str,
) -> String {
    format!(
        "SELECT
    CAST(COALESCE(MAX(execution_ts), CAST('{floor}' AS TIMESTAMP)) AS VARCHAR) AS high_watermark,
    CAST(CURRENT_TIMESTAMP AS VARCHAR) AS current_timestamp_value
FROM {schema}.{table}
WHERE table_id = '{table_id}'
AND rule_binding_id = '{binding}'",
        floor = WATERMARK_FLOOR,
        schema = dq_summary_schema,
        table = dq_summary_table_name,
        table_id = sql_quote(fully_qualified_table_name),
        binding = sql_quote(rule_binding_id),
    )
}

fn now_value() -> Value {
    Value::String(chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string())
}

pub struct RuleBindingResolver<'a> {
    cache: &'a ConfigsCache,
    executor: &'a dyn QueryExecutor,
    options: &'a ResolveOptions,
}

impl<'a> RuleBindingResolver<'a> {
    pub fn new(
        cache: &'a ConfigsCache,
        executor: &'a dyn QueryExecutor,
        options: &'a ResolveOptions,
    ) -> Self {
        Self {
            cache,
            executor,
            options,
        }
    }

    /// The denormalized `configs` part of the tree. Any missing reference fails the binding.
    pub fn resolve_configs(&self, rule_binding_id: &str) -> Result<Value, DqcError> {
        let binding = self.cache.get_rule_binding(rule_binding_id)?;

        let mut entity = self.cache.get_entity(&binding.entity_id)?;
        if let Some(environment) = &self.options.environment {
            entity = entity.for_environment(environment);
        }

        let column = match &binding.column_id {
            Some(column_id) => Some(entity.resolve_column(column_id)?.clone()),
            None => None,
        };
        let column_configs = match &column {
            Some(c) => Some(json!({
                "name": c.column_name,
                "data_type": c.declared_type.as_str(),
                "canonical_type": c.canonical_type()?.as_str(),
            })),
            None => None,
        };

        let row_filter = self.cache.get_row_filter(&binding.row_filter_id)?;
        let reference_columns = match &binding.reference_columns_id {
            Some(id) => Some(self.cache.get_reference_columns(id)?),
            None => None,
        };

        // Rule order drives check order in the generated SQL.
        let mut rule_configs = Vec::with_capacity(binding.rule_ids.len());
        for rule_id in &binding.rule_ids {
            let mut rule = self.cache.get_rule(rule_id)?;
            if let Some(c) = &column {
                rule.params
                    .entry("column")
                    .or_insert_with(|| Value::String(c.column_name.clone()));
            }
            let mut resolved = rule.to_resolved();
            if let Some(map) = resolved.as_object_mut() {
                map.insert("rule_id".into(), Value::String(rule.rule_id.clone()));
            }
            rule_configs.push(resolved);
        }

        Ok(json!({
            "rule_binding_id": binding.rule_binding_id,
            "entity_id": binding.entity_id,
            "entity_configs": entity.to_raw(),
            "column_id": binding.column_id,
            "column_configs": column_configs,
            "rule_ids": binding.rule_ids,
            "rule_configs": rule_configs,
            "row_filter_id": binding.row_filter_id,
            "row_filter_configs": row_filter.to_raw(),
            "reference_columns_id": binding.reference_columns_id,
            "reference_columns_configs": reference_columns.map(|r| r.to_raw()),
            "incremental_time_filter_column": binding.incremental_time_filter_column,
            "metadata": binding.metadata,
        }))
    }

    #[instrument(skip(self))]
    pub async fn resolve(&self, rule_binding_id: &str) -> Result<ResolvedRuleBinding, DqcError> {
        let configs = self.resolve_configs(rule_binding_id)?;
        let configs_hashsum = configs_hashsum(&configs)?;

        // Binding-declared metadata wins over caller metadata.
        let mut metadata = self.options.metadata.clone();
        if let Some(declared) = configs["metadata"].as_object() {
            for (k, v) in declared {
                metadata.insert(k.clone(), v.clone());
            }
        }

        let mut resolved = ResolvedRuleBinding {
            rule_binding_id: configs["rule_binding_id"]
                .as_str()
                .unwrap_or(rule_binding_id)
                .to_string(),
            configs,
            environment: self.options.environment.clone(),
            dq_summary_table_name: self.options.dq_summary_table_name.clone(),
            metadata,
            dq_summary_table_exists: self.options.dq_summary_table_exists,
            configs_hashsum,
            progress_watermark: self.options.progress_watermark,
            high_watermark_value: None,
            current_timestamp_value: None,
            high_watermark_filter_exists: false,
        };

        let incremental = resolved.configs["incremental_time_filter_column"]
            .as_str()
            .is_some_and(|c| !c.is_empty());
        if incremental {
            let (high, now) = self
                .high_watermark(
                    &resolved.fully_qualified_table_name(),
                    &resolved.rule_binding_id,
                )
                .await?;
            resolved.high_watermark_value = Some(high);
            resolved.current_timestamp_value = Some(now);
            resolved.high_watermark_filter_exists = true;
        }

        info!(
            rule_binding_id = %resolved.rule_binding_id,
            hashsum = %resolved.configs_hashsum,
            incremental,
            "Resolved rule binding"
        );
        Ok(resolved)
    }

    async fn high_watermark(
        &self,
        fully_qualified_table_name: &str,
        rule_binding_id: &str,
    ) -> Result<(Value, Value), DqcError> {
        if !self.options.dq_summary_table_exists {
            debug!(rule_binding_id, "No run history table, using watermark floor");
            return Ok((Value::String(WATERMARK_FLOOR.to_string()), now_value()));
        }

        let query = high_watermark_query(
            &self.options.dq_summary_schema,
            &self.options.dq_summary_table_name,
            fully_qualified_table_name,
            rule_binding_id,
        );
        debug!(query = %query, "High watermark query");
        let rows = self.executor.execute(&query).await?;

        let mut high = Value::String(WATERMARK_FLOOR.to_string());
        let mut now = now_value();
        if let Some(row) = rows.last() {
            if let Some(v) = row.first().filter(|v| !v.is_null()) {
                high = v.clone();
            }
            if let Some(v) = row.get(1).filter(|v| !v.is_null()) {
                now = v.clone();
            }
        }
        Ok((high, now))
    }
}

/// Caller metadata as a map; non-object values are rejected.
pub fn metadata_from_value(value: Option<Value>) -> Result<RawConfig, DqcError> {
    match value {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(DqcError::InternalError(format!(
            "metadata must be a JSON object, got {}",
            other
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::application::loader::prepare_configs_cache;
    use crate::application::loader::tests::orders_source;
    use crate::domain::config::ConfigKind;
    use crate::infrastructure::cache::InMemoryConfigStore;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;

    /// Records queries and replays a fixed watermark row.
    #[derive(Default)]
    pub(crate) struct MockExecutor {
        pub queries: Mutex<Vec<String>>,
        pub row: Option<Vec<Value>>,
        pub summary_exists: bool,
    }

    #[async_trait]
    impl QueryExecutor for MockExecutor {
        async fn execute(&self, query: &str) -> Result<Vec<Vec<Value>>, DqcError> {
            self.queries.lock().unwrap().push(query.to_string());
            Ok(self.row.clone().into_iter().collect())
        }

        async fn table_exists(&self, _table: &str, _schema: &str) -> Result<bool, DqcError> {
            Ok(self.summary_exists)
        }

        fn engine_name(&self) -> &str {
            "mock"
        }
    }

    fn options(exists: bool) -> ResolveOptions {
        let mut metadata = Map::new();
        metadata.insert("owner".into(), json!("platform"));
        metadata.insert("run".into(), json!("nightly"));
        ResolveOptions {
            dq_summary_table_name: "test_dq_summary".into(),
            dq_summary_schema: "data_sciences".into(),
            environment: None,
            metadata,
            dq_summary_table_exists: exists,
            progress_watermark: true,
        }
    }

    fn cache() -> ConfigsCache {
        prepare_configs_cache(
            &orders_source(),
            Path::new("configs"),
            Box::new(InMemoryConfigStore::default()),
        )
        .map_err(|e| e.to_string())
        .unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_resolution() -> anyhow::Result<()> {
        let cache = cache();
        let executor = MockExecutor::default();
        let opts = options(false);
        let resolver = RuleBindingResolver::new(&cache, &executor, &opts);

        let resolved = resolver.resolve("orders_checks").await?;
        let configs = &resolved.configs;
        assert_eq!(configs["entity_configs"]["table_name"], "orders");
        assert_eq!(configs["entity_configs"]["schema_name"], "sales");
        assert_eq!(configs["entity_configs"]["columns"]["STATUS"]["data_type"], "VARCHAR");
        assert_eq!(configs["rule_configs"][0]["rule_id"], "NOT_NULL");
        assert_eq!(configs["rule_configs"][0]["dimension"], "COMPLETENESS");
        assert_eq!(configs["rule_configs"][0]["rule_sql_expr"], "status IS NOT NULL");
        assert_eq!(
            configs["rule_configs"][1]["rule_sql_expr"],
            "status ~ '^(open|closed)$'"
        );
        assert_eq!(configs["row_filter_configs"]["filter_sql_expr"], "active = true");
        assert_eq!(
            configs["reference_columns_configs"]["include_reference_columns"],
            json!(["order_id", "status"])
        );
        assert_eq!(resolved.configs_hashsum.len(), 64);
        assert!(!resolved.high_watermark_filter_exists);
        assert!(executor.queries.lock().unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_binding_metadata_wins() -> anyhow::Result<()> {
        let cache = cache();
        let executor = MockExecutor::default();
        let opts = options(false);
        let resolved = RuleBindingResolver::new(&cache, &executor, &opts)
            .resolve("ORDERS_CHECKS")
            .await?;
        assert_eq!(resolved.metadata["owner"], "sales");
        assert_eq!(resolved.metadata["run"], "nightly");
        Ok(())
    }

    #[tokio::test]
    async fn test_fingerprint_is_deterministic() -> anyhow::Result<()> {
        let cache = cache();
        let executor = MockExecutor::default();
        let opts = options(false);
        let resolver = RuleBindingResolver::new(&cache, &executor, &opts);
        let a = resolver.resolve("orders_checks").await?;
        let b = resolver.resolve("Orders_Checks").await?;
        assert_eq!(a.configs_hashsum, b.configs_hashsum);

        let other = resolver.resolve("orders_incremental").await?;
        assert_ne!(a.configs_hashsum, other.configs_hashsum);
        Ok(())
    }

    #[test]
    fn test_hashsum_ignores_key_order() -> anyhow::Result<()> {
        let a: Value = serde_json::from_str(r#"{"b": 1, "a": {"y": 2, "x": 1}}"#)?;
        let b: Value = serde_json::from_str(r#"{"a": {"x": 1, "y": 2}, "b": 1}"#)?;
        assert_eq!(configs_hashsum(&a)?, configs_hashsum(&b)?);
        Ok(())
    }

    #[tokio::test]
    async fn test_incremental_binding_queries_watermark() -> anyhow::Result<()> {
        let cache = cache();
        let executor = MockExecutor {
            row: Some(vec![json!("2024-03-01 10:00:00"), json!("2024-03-02 00:00:00")]),
            summary_exists: true,
            ..Default::default()
        };
        let opts = options(true);
        let resolved = RuleBindingResolver::new(&cache, &executor, &opts)
            .resolve("orders_incremental")
            .await?;

        assert!(resolved.high_watermark_filter_exists);
        assert_eq!(resolved.high_watermark_value, Some(json!("2024-03-01 10:00:00")));
        assert_eq!(resolved.current_timestamp_value, Some(json!("2024-03-02 00:00:00")));

        let queries = executor.queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert!(queries[0].contains("FROM data_sciences.test_dq_summary"));
        assert!(queries[0].contains("table_id = 'sales.orders'"));
        assert!(queries[0].contains("rule_binding_id = 'ORDERS_INCREMENTAL'"));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_history_table_uses_floor() -> anyhow::Result<()> {
        let cache = cache();
        let executor = MockExecutor::default();
        let opts = options(false);
        let resolved = RuleBindingResolver::new(&cache, &executor, &opts)
            .resolve("orders_incremental")
            .await?;
        assert_eq!(resolved.high_watermark_value, Some(json!(WATERMARK_FLOOR)));
        assert!(resolved.current_timestamp_value.is_some());
        assert!(executor.queries.lock().unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_environment_override_applies() -> anyhow::Result<()> {
        let cache = cache();
        let executor = MockExecutor::default();
        let mut opts = options(false);
        opts.environment = Some("TEST".into());
        let resolved = RuleBindingResolver::new(&cache, &executor, &opts)
            .resolve("orders_checks")
            .await?;
        assert_eq!(resolved.configs["entity_configs"]["schema_name"], "sales_test");
        assert_eq!(resolved.fully_qualified_table_name(), "sales_test.orders");
        assert_eq!(resolved.to_context()?["environment"], "TEST");
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_binding_fails_with_listing() {
        let cache = cache();
        let executor = MockExecutor::default();
        let opts = options(false);
        let err = RuleBindingResolver::new(&cache, &executor, &opts)
            .resolve("missing")
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("MISSING"));
        assert!(msg.contains("ORDERS_CHECKS"));
    }

    #[tokio::test]
    async fn test_dangling_references_fail_the_binding() -> anyhow::Result<()> {
        let mut source = orders_source();
        source.nodes.insert(
            ConfigKind::RuleBinding,
            json!({
                "bad_rule": {
                    "entity_id": "orders", "rule_ids": ["not_null", "no_such_rule"],
                    "row_filter_id": "active"
                },
                "bad_filter": {
                    "entity_id": "orders", "rule_ids": ["not_null"],
                    "row_filter_id": "no_such_filter"
                },
                "bad_refs": {
                    "entity_id": "orders", "rule_ids": ["not_null"],
                    "row_filter_id": "active", "reference_columns_id": "no_such_refs"
                },
                "bad_column": {
                    "entity_id": "orders", "column_id": "no_such_column",
                    "rule_ids": ["not_null"], "row_filter_id": "active"
                },
                "bad_entity": {
                    "entity_id": "no_such_entity", "rule_ids": ["not_null"],
                    "row_filter_id": "active"
                }
            }),
        );
        let cache = prepare_configs_cache(
            &source,
            Path::new("configs"),
            Box::new(InMemoryConfigStore::default()),
        )?;
        let executor = MockExecutor::default();
        let opts = options(false);
        let resolver = RuleBindingResolver::new(&cache, &executor, &opts);

        let cases = [
            ("bad_rule", "Rule ID 'NO_SUCH_RULE' not found", "NOT_NULL"),
            ("bad_filter", "Row Filter ID 'NO_SUCH_FILTER' not found", "ACTIVE"),
            ("bad_refs", "Reference Columns ID 'NO_SUCH_REFS' not found", "ORDER_REFS"),
            ("bad_column", "Column ID 'NO_SUCH_COLUMN' not found", "STATUS"),
            ("bad_entity", "Entity ID 'NO_SUCH_ENTITY' not found", "ORDERS"),
        ];
        for (binding, expected, listed) in cases {
            let msg = resolver.resolve(binding).await.unwrap_err().to_string();
            assert!(msg.contains(expected), "{binding}: {msg}");
            assert!(msg.contains(listed), "{binding} should list {listed}: {msg}");
            assert!(resolver.resolve_configs(binding).is_err());
        }
        // Nothing reached the warehouse for the failed bindings.
        assert!(executor.queries.lock().unwrap().is_empty());
        Ok(())
    }

    #[test]
    fn test_watermark_query_escapes_quotes() {
        let sql = high_watermark_query("s", "t", "sales.o'rders", "B");
        assert!(sql.contains("table_id = 'sales.o''rders'"));
    }
}
