// dqc/src/commands/validate.rs
//
// USE CASE: Load every config kind and report counts.

use std::path::PathBuf;

use anyhow::Context;
use dqc_core::application::prepare_configs_cache;
use dqc_core::domain::config::ConfigKind;
use dqc_core::infrastructure::config::{YamlConfigSource, load_project_config};

use super::{diagnostic, open_store};

pub fn execute(config_path: PathBuf, project_dir: PathBuf) -> anyhow::Result<()> {
    println!("🔍 Validating configs in {}...", config_path.display());

    let config = load_project_config(&project_dir)
        .map_err(|e| diagnostic(e.into()))
        .with_context(|| format!("Failed to load project configuration from {:?}", project_dir))?;
    let store = open_store(&project_dir, &config)?;

    let cache =
        prepare_configs_cache(&YamlConfigSource, &config_path, store).map_err(diagnostic)?;

    for kind in ConfigKind::LOAD_ORDER {
        let count = cache.ids(kind).map_err(|e| diagnostic(e.into()))?.len();
        println!("   {:<20} {}", kind.as_str(), count);
    }
    println!("\n✨ All configs are valid.");
    Ok(())
}
