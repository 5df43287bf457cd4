// dqc/src/commands/mod.rs

pub mod generate;
pub mod validate;

use dqc_core::DqcError;
use dqc_core::domain::ports::ConfigStore;
use dqc_core::domain::project::ProjectConfig;
use dqc_core::infrastructure::cache::{DuckDbConfigStore, InMemoryConfigStore};
use std::path::Path;

/// Renders the error with its diagnostic code and help line.
pub fn diagnostic(err: DqcError) -> anyhow::Error {
    anyhow::anyhow!("{:?}", miette::Report::new(err))
}

/// Persistent DuckDB cache when `cache-path` is set, in-memory otherwise.
pub fn open_store(
    project_dir: &Path,
    config: &ProjectConfig,
) -> anyhow::Result<Box<dyn ConfigStore>> {
    match &config.cache_path {
        Some(path) => {
            let path = project_dir.join(path);
            let store = DuckDbConfigStore::open(&path)
                .map_err(|e| diagnostic(e.into()))
                .map_err(|e| e.context(format!("Failed to open configs cache at {:?}", path)))?;
            Ok(Box::new(store))
        }
        None => Ok(Box::new(InMemoryConfigStore::default())),
    }
}
