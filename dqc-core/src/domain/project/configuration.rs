// dqc-core/src/domain/project/configuration.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProjectConfig {
    #[serde(default = "default_name")]
    pub name: String,

    /// Run-history table read by the watermark lookup.
    #[serde(rename = "summary-table", default = "default_summary_table")]
    pub summary_table: String,

    #[serde(rename = "summary-schema", default = "default_summary_schema")]
    pub summary_schema: String,

    #[serde(rename = "target-path", default = "default_target_path")]
    pub target_path: String,

    #[serde(rename = "templates-path", default = "default_templates_path")]
    pub templates_path: String,

    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default = "default_threads")]
    pub threads: usize,

    /// DuckDB file for a configs cache that survives across runs. In-memory when absent.
    #[serde(rename = "cache-path", default)]
    pub cache_path: Option<String>,

    #[serde(rename = "warehouse-path", default = "default_warehouse_path")]
    pub warehouse_path: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            summary_table: default_summary_table(),
            summary_schema: default_summary_schema(),
            target_path: default_target_path(),
            templates_path: default_templates_path(),
            environment: default_environment(),
            threads: default_threads(),
            cache_path: None,
            warehouse_path: default_warehouse_path(),
        }
    }
}

fn default_name() -> String {
    "dqc".to_string()
}
fn default_summary_table() -> String {
    "test_dq_summary".to_string()
}
fn default_summary_schema() -> String {
    "data_sciences".to_string()
}
fn default_target_path() -> String {
    "target".to_string()
}
fn default_templates_path() -> String {
    "macros".to_string()
}
fn default_environment() -> String {
    "dev".to_string()
}
fn default_threads() -> usize {
    1
}
fn default_warehouse_path() -> String {
    "dq_warehouse.duckdb".to_string()
}
