// dqc-core/src/infrastructure/config/project.rs

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::domain::project::ProjectConfig;
use crate::infrastructure::error::InfrastructureError;

const PROJECT_FILES: [&str; 2] = ["dqc_project.yaml", "dqc.yaml"];

/// Loads the project file if one exists, otherwise defaults. Environment overrides last.
#[instrument(skip(project_dir))]
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig, InfrastructureError> {
    let mut config = match find_main_config(project_dir) {
        Some(path) => {
            info!(path = ?path, "Loading project config");
            let content = fs::read_to_string(&path)?;
            serde_yaml::from_str(&content).map_err(|source| InfrastructureError::YamlError {
                path: path.display().to_string(),
                source,
            })?
        }
        None => ProjectConfig::default(),
    };

    if config.threads == 0 {
        return Err(InfrastructureError::ConfigError(
            "'threads' must be at least 1".to_string(),
        ));
    }

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn find_main_config(root: &Path) -> Option<PathBuf> {
    PROJECT_FILES
        .iter()
        .map(|filename| root.join(filename))
        .find(|p| p.exists())
}

// Layering: DQC_TARGET_PATH=/tmp/build dqc generate ...
fn apply_env_overrides(config: &mut ProjectConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("DQC_TARGET_PATH") {
        info!(old = ?config.target_path, new = ?val, "Overriding target path via ENV");
        config.target_path = val;
    }
    if let Some(val) = lookup("DQC_ENV") {
        info!(old = ?config.environment, new = ?val, "Overriding environment via ENV");
        config.environment = val;
    }
}
