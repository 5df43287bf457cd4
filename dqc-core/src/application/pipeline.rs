// dqc-core/src/application/pipeline.rs

use futures::{StreamExt, TryStreamExt};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::application::loader::prepare_configs_cache;
use crate::application::ports::TemplateEngine;
use crate::application::resolver::{ResolveOptions, ResolvedRuleBinding, RuleBindingResolver};
use crate::domain::batching::{EntityBatch, plan_entity_batches};
use crate::domain::cache::ConfigsCache;
use crate::domain::config::raw::normalize_id;
use crate::domain::config::{ConfigKind, RawConfig};
use crate::domain::error::{DomainError, bounded_listing};
use crate::domain::ports::{ConfigSource, ConfigStore};
use crate::domain::substitution::safe_substitute;
use crate::error::DqcError;
use crate::infrastructure::compiler::validate_sql;
use crate::infrastructure::fs::{write_json, write_sql_model};
use crate::ports::executor::QueryExecutor;

pub const RULE_BINDING_VIEW_TEMPLATE: &str = "create_rule_binding_view.sql";
pub const FAILED_RECORDS_TEMPLATE: &str = "failed_records_query.sql";
pub const ENTITY_SUMMARY_TEMPLATE: &str = "create_entity_aggregate_dq_summary.sql";
pub const ALL_RULE_BINDINGS: &str = "ALL";

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// `ALL` or a comma-separated list of ids.
    pub rule_binding_ids: String,
    pub configs_path: PathBuf,
    pub target_dir: PathBuf,
    pub environment: Option<String>,
    pub metadata: RawConfig,
    pub snapshot_date: Option<String>,
    pub threads: usize,
    pub dry_run: bool,
    pub skip_sql_validation: bool,
    pub progress_watermark: bool,
    pub dq_summary_table_name: String,
    pub dq_summary_schema: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedRuleBinding {
    pub rule_binding_id: String,
    pub configs_hashsum: String,
    pub high_watermark_filter_exists: bool,
    #[serde(skip)]
    pub sql: String,
    #[serde(skip)]
    pub failed_records_sql: String,
    #[serde(skip)]
    pub context: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedEntitySummary {
    #[serde(flatten)]
    pub batch: EntityBatch,
    #[serde(skip)]
    pub sql: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub invocation_ts: String,
    pub success: bool,
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    pub dq_summary_table_exists: bool,
    pub rule_bindings: Vec<GeneratedRuleBinding>,
    pub entity_summaries: Vec<GeneratedEntitySummary>,
}

/// `ALL` selects every loaded binding; otherwise each listed id must exist.
pub fn expand_targets(requested: &str, loaded: &[String]) -> Result<Vec<String>, DomainError> {
    if requested.trim().eq_ignore_ascii_case(ALL_RULE_BINDINGS) {
        return Ok(loaded.to_vec());
    }

    let mut targets: Vec<String> = Vec::new();
    for id in requested.split(',').map(normalize_id).filter(|id| !id.is_empty()) {
        if !loaded.contains(&id) {
            return Err(DomainError::ConfigNotFound {
                kind: ConfigKind::RuleBinding.display_name().to_string(),
                id,
                available: bounded_listing(loaded),
            });
        }
        if !targets.contains(&id) {
            targets.push(id);
        }
    }
    if targets.is_empty() {
        return Err(DomainError::invalid(
            ConfigKind::RuleBinding.as_str(),
            "No rule binding ids requested",
        ));
    }
    Ok(targets)
}

async fn generate_one<T: TemplateEngine>(
    resolver: &RuleBindingResolver<'_>,
    renderer: &T,
    rule_binding_id: &str,
) -> Result<GeneratedRuleBinding, DqcError> {
    let resolved: ResolvedRuleBinding = resolver.resolve(rule_binding_id).await?;
    let context = resolved.to_context()?;
    let sql = renderer.render(RULE_BINDING_VIEW_TEMPLATE, &context)?;
    let failed_records_sql = renderer.render(FAILED_RECORDS_TEMPLATE, &context)?;
    Ok(GeneratedRuleBinding {
        rule_binding_id: resolved.rule_binding_id,
        configs_hashsum: resolved.configs_hashsum,
        high_watermark_filter_exists: resolved.high_watermark_filter_exists,
        sql,
        failed_records_sql,
        context,
    })
}

#[instrument(skip(source, store, renderer, executor, request), fields(targets = %request.rule_binding_ids))]
pub async fn run_generation<T: TemplateEngine>(
    request: &GenerationRequest,
    source: &dyn ConfigSource,
    store: Box<dyn ConfigStore>,
    renderer: &T,
    executor: &dyn QueryExecutor,
) -> Result<RunResult, DqcError> {
    let start_time = Instant::now();
    let invocation_ts = chrono::Utc::now().to_rfc3339();

    // 1-2. Cache + targets
    let cache: ConfigsCache = prepare_configs_cache(source, &request.configs_path, store)?;
    let loaded = cache.ids(ConfigKind::RuleBinding)?;
    let targets = expand_targets(&request.rule_binding_ids, &loaded)?;
    info!(count = targets.len(), "Target rule bindings selected");

    // 3. Entity batches
    let summaries = cache.entity_summaries(&targets)?;
    let batches = plan_entity_batches(&summaries, &targets)?;

    // 4. Run history
    let dq_summary_table_exists = executor
        .table_exists(&request.dq_summary_table_name, &request.dq_summary_schema)
        .await?;
    info!(
        engine = executor.engine_name(),
        dq_summary_table_exists, "Run history checked"
    );
    if !dq_summary_table_exists {
        warn!(
            table = %request.dq_summary_table_name,
            schema = %request.dq_summary_schema,
            "Run history table not found, incremental bindings start from the watermark floor"
        );
    }

    // 5. Resolve + render, bounded, first failure aborts
    let options = ResolveOptions {
        dq_summary_table_name: request.dq_summary_table_name.clone(),
        dq_summary_schema: request.dq_summary_schema.clone(),
        environment: request.environment.clone(),
        metadata: request.metadata.clone(),
        dq_summary_table_exists,
        progress_watermark: request.progress_watermark,
    };
    let resolver = RuleBindingResolver::new(&cache, executor, &options);
    let resolver = &resolver;
    let results: Vec<GeneratedRuleBinding> =
        futures::stream::iter(targets.iter().map(|id| generate_one(resolver, renderer, id)))
            .buffered(request.threads.max(1))
            .try_collect()
            .await?;

    let mut generated = Vec::with_capacity(results.len());
    for mut binding in results {
        // 6. Offline dry run
        if !request.skip_sql_validation {
            validate_sql(&binding.rule_binding_id, &binding.sql)?;
            validate_sql(&binding.rule_binding_id, &binding.failed_records_sql)?;
        }
        // 7. Snapshot substitution
        if let Some(snapshot) = &request.snapshot_date {
            let mut params = Map::new();
            params.insert(
                "tgt_tbl_snapshot_value".to_string(),
                Value::String(snapshot.clone()),
            );
            binding.sql = safe_substitute(&binding.sql, &params);
            binding.failed_records_sql = safe_substitute(&binding.failed_records_sql, &params);
        }
        generated.push(binding);
    }

    // 8. Entity-level summaries
    let mut entity_summaries = Vec::with_capacity(batches.len());
    for batch in batches {
        let mut binding_configs = Map::new();
        let mut failed_queries = Map::new();
        for id in &batch.rule_binding_ids_list {
            if let Some(binding) = generated.iter().find(|g| &g.rule_binding_id == id) {
                binding_configs.insert(id.clone(), binding.context.clone());
                failed_queries.insert(
                    format!("{}_failed_records_sql_string", id),
                    Value::String(binding.failed_records_sql.clone()),
                );
            }
        }
        let context = serde_json::json!({
            "batch_id": batch.batch_id,
            "entity_table_id": batch.table_id,
            "entity_target_rule_binding_configs": binding_configs,
            "failed_queries_configs": failed_queries,
        });
        let sql = renderer.render(ENTITY_SUMMARY_TEMPLATE, &context)?;
        entity_summaries.push(GeneratedEntitySummary { batch, sql });
    }

    let result = RunResult {
        invocation_ts,
        success: true,
        dry_run: request.dry_run,
        environment: request.environment.clone(),
        dq_summary_table_exists,
        rule_bindings: generated,
        entity_summaries,
    };

    // 9. Output
    if request.dry_run {
        info!("Dry run, nothing written");
    } else {
        write_outputs(&request.target_dir, &result)?;
    }

    info!(
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        bindings = result.rule_bindings.len(),
        batches = result.entity_summaries.len(),
        "Generation finished"
    );
    Ok(result)
}

fn write_outputs(target_dir: &Path, result: &RunResult) -> Result<(), DqcError> {
    let bindings_dir = target_dir.join("rule_bindings");
    for binding in &result.rule_bindings {
        write_sql_model(&bindings_dir, &binding.rule_binding_id, &binding.sql)?;
        write_sql_model(
            &bindings_dir,
            &format!("{}_failed_records", binding.rule_binding_id),
            &binding.failed_records_sql,
        )?;
    }

    let summaries_dir = target_dir.join("entity_summaries");
    for summary in &result.entity_summaries {
        write_sql_model(&summaries_dir, &summary.batch.batch_id, &summary.sql)?;
    }

    write_json(&target_dir.join("run_results.json"), result)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::loader::tests::orders_source;
    use crate::application::resolver::tests::MockExecutor;
    use crate::infrastructure::cache::InMemoryConfigStore;
    use crate::infrastructure::compiler::JinjaRenderer;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    fn renderer() -> JinjaRenderer {
        let mut renderer = JinjaRenderer::new();
        renderer
            .add_template(
                RULE_BINDING_VIEW_TEMPLATE,
                "CREATE VIEW dq.{{ rule_binding_id | lower }} AS SELECT {% for rule in configs.rule_configs %}CASE WHEN {{ rule.rule_sql_expr }} THEN 1 ELSE 0 END AS {{ rule.rule_id | lower }}{% if not loop.last %}, {% endif %}{% endfor %} FROM {{ configs.entity_configs.schema_name }}.{{ configs.entity_configs.table_name }} WHERE {{ configs.row_filter_configs.filter_sql_expr }}{% if high_watermark_filter_exists %} AND {{ configs.incremental_time_filter_column }} > '{{ high_watermark_value }}'{% endif %} AND snapshot = '$tgt_tbl_snapshot_value'",
            )
            .unwrap();
        renderer
            .add_template(
                FAILED_RECORDS_TEMPLATE,
                "SELECT * FROM {{ configs.entity_configs.schema_name }}.{{ configs.entity_configs.table_name }} WHERE NOT ({{ configs.rule_configs[0].rule_sql_expr }})",
            )
            .unwrap();
        renderer
            .add_template(
                ENTITY_SUMMARY_TEMPLATE,
                "{% for id, q in failed_queries_configs | items %}SELECT '{{ id }}' AS rule_binding_id{% if not loop.last %} UNION ALL {% endif %}{% endfor %}",
            )
            .unwrap();
        renderer
    }

    fn request(target_dir: &Path) -> GenerationRequest {
        GenerationRequest {
            rule_binding_ids: "ALL".into(),
            configs_path: PathBuf::from("configs"),
            target_dir: target_dir.to_path_buf(),
            environment: None,
            metadata: Map::new(),
            snapshot_date: Some("202407".into()),
            threads: 2,
            dry_run: false,
            skip_sql_validation: false,
            progress_watermark: true,
            dq_summary_table_name: "test_dq_summary".into(),
            dq_summary_schema: "data_sciences".into(),
        }
    }

    #[test]
    fn test_expand_targets() {
        let loaded = vec!["A".to_string(), "B".to_string()];
        assert_eq!(expand_targets("all", &loaded).unwrap(), loaded);
        assert_eq!(expand_targets(" b , a,b", &loaded).unwrap(), vec!["B", "A"]);
        let err = expand_targets("a,c", &loaded).unwrap_err();
        assert!(err.to_string().contains("'C'"));
        assert!(expand_targets(" , ", &loaded).is_err());
    }

    #[tokio::test]
    async fn test_generation_writes_models() -> Result<()> {
        let dir = tempdir()?;
        let target = dir.path().join("target");
        let executor = MockExecutor::default();

        let result = run_generation(
            &request(&target),
            &orders_source(),
            Box::new(InMemoryConfigStore::default()),
            &renderer(),
            &executor,
        )
        .await?;

        assert_eq!(result.rule_bindings.len(), 2);
        assert_eq!(result.entity_summaries.len(), 1);
        assert_eq!(result.entity_summaries[0].batch.batch_id, "sales__orders_1");

        let view = fs::read_to_string(target.join("rule_bindings/ORDERS_CHECKS.sql"))?;
        assert!(view.contains("status IS NOT NULL"));
        assert!(view.contains("snapshot = '202407'"));
        assert!(target.join("rule_bindings/ORDERS_CHECKS_failed_records.sql").exists());

        let summary = fs::read_to_string(target.join("entity_summaries/sales__orders_1.sql"))?;
        assert!(summary.contains("ORDERS_CHECKS_failed_records_sql_string"));

        let run_results: Value =
            serde_json::from_str(&fs::read_to_string(target.join("run_results.json"))?)?;
        assert_eq!(run_results["rule_bindings"].as_array().map(|a| a.len()), Some(2));
        assert_eq!(run_results["entity_summaries"][0]["batch_id"], "sales__orders_1");
        Ok(())
    }

    #[tokio::test]
    async fn test_incremental_binding_gets_watermark_filter() -> Result<()> {
        let dir = tempdir()?;
        let executor = MockExecutor {
            row: Some(vec![
                Value::from("2024-05-01 00:00:00"),
                Value::from("2024-05-02 00:00:00"),
            ]),
            summary_exists: true,
            ..Default::default()
        };
        let mut req = request(dir.path());
        req.rule_binding_ids = "orders_incremental".into();
        req.dry_run = true;

        let result = run_generation(
            &req,
            &orders_source(),
            Box::new(InMemoryConfigStore::default()),
            &renderer(),
            &executor,
        )
        .await?;

        assert_eq!(result.rule_bindings.len(), 1);
        assert!(result.rule_bindings[0].high_watermark_filter_exists);
        assert!(result.rule_bindings[0].sql.contains("updated_at > '2024-05-01 00:00:00'"));
        assert!(!dir.path().join("run_results.json").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_sql_aborts_the_run() -> Result<()> {
        let dir = tempdir()?;
        let mut broken = renderer();
        broken.add_template(RULE_BINDING_VIEW_TEMPLATE, "SELEC broken FROM")?;
        let executor = MockExecutor::default();

        let err = run_generation(
            &request(dir.path()),
            &orders_source(),
            Box::new(InMemoryConfigStore::default()),
            &broken,
            &executor,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("does not parse"));
        assert!(!dir.path().join("run_results.json").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_target_fails_before_rendering() -> Result<()> {
        let dir = tempdir()?;
        let mut req = request(dir.path());
        req.rule_binding_ids = "orders_checks,nope".into();
        let executor = MockExecutor::default();

        let err = run_generation(
            &req,
            &orders_source(),
            Box::new(InMemoryConfigStore::default()),
            &renderer(),
            &executor,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("NOPE"));
        Ok(())
    }
}
