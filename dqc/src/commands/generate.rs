// dqc/src/commands/generate.rs
//
// USE CASE: Resolve rule bindings and write the generated SQL.

use anyhow::Context;

use dqc_core::application::{GenerationRequest, metadata_from_value, run_generation};
use dqc_core::infrastructure::adapters::DuckDbExecutor;
use dqc_core::infrastructure::compiler::JinjaRenderer;
use dqc_core::infrastructure::config::{YamlConfigSource, load_project_config};

use super::{diagnostic, open_store};
use crate::cli::GenerateArgs;

pub async fn execute(args: GenerateArgs) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    // A. Project config (file < env < flags)
    println!("⚙️  Loading configuration...");
    let config = load_project_config(&args.project_dir)
        .map_err(|e| diagnostic(e.into()))
        .with_context(|| {
            format!(
                "Failed to load project configuration from {:?}",
                args.project_dir
            )
        })?;
    let environment = args
        .environment_target
        .clone()
        .unwrap_or_else(|| config.environment.clone());
    println!("   Project: {} (env: {})", config.name, environment);

    let metadata = match &args.metadata {
        Some(raw) => {
            let value: serde_json::Value =
                serde_json::from_str(raw).context("--metadata must be valid JSON")?;
            metadata_from_value(Some(value)).map_err(diagnostic)?
        }
        None => Default::default(),
    };

    // B. Adapters
    let warehouse_path = args.project_dir.join(&config.warehouse_path);
    let executor = DuckDbExecutor::new(&warehouse_path.to_string_lossy())
        .map_err(|e| diagnostic(e.into()))
        .with_context(|| format!("Failed to initialize DuckDB at {:?}", warehouse_path))?;
    let renderer = JinjaRenderer::from_dir(&args.project_dir.join(&config.templates_path));
    let store = open_store(&args.project_dir, &config)?;

    // C. Run
    let request = GenerationRequest {
        rule_binding_ids: args.rule_binding_ids,
        configs_path: args.config_path,
        target_dir: args.project_dir.join(&config.target_path),
        environment: Some(environment),
        metadata,
        snapshot_date: args.snapshot_date,
        threads: args.threads.unwrap_or(config.threads),
        dry_run: args.dry_run,
        skip_sql_validation: args.skip_sql_validation,
        progress_watermark: args.progress_watermark,
        dq_summary_table_name: config.summary_table.clone(),
        dq_summary_schema: config.summary_schema.clone(),
    };

    let result = run_generation(&request, &YamlConfigSource, store, &renderer, &executor)
        .await
        .map_err(diagnostic)?;

    for binding in &result.rule_bindings {
        println!(
            "   ✅ {} ({})",
            binding.rule_binding_id,
            &binding.configs_hashsum[..12.min(binding.configs_hashsum.len())]
        );
    }
    if result.dry_run {
        println!("\n🔎 Dry run: {} rule bindings resolved, nothing written.", result.rule_bindings.len());
    } else {
        println!(
            "\n✨ SUCCESS! {} rule bindings, {} entity summaries written to {} in {:.2?}",
            result.rule_bindings.len(),
            result.entity_summaries.len(),
            request.target_dir.display(),
            start.elapsed()
        );
    }
    Ok(())
}
