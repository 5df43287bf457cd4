// dqc-core/src/infrastructure/config/discovery.rs

// Finds YAML config documents and merges the node of one kind across all of them.

use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use crate::domain::config::ConfigKind;
use crate::domain::error::DomainError;
use crate::domain::merge::ConfigCollection;
use crate::domain::ports::ConfigSource;
use crate::infrastructure::error::InfrastructureError;

#[derive(Debug, Default, Clone, Copy)]
pub struct YamlConfigSource;

impl ConfigSource for YamlConfigSource {
    fn load(&self, path: &Path, kind: ConfigKind) -> Result<ConfigCollection, DomainError> {
        load_configs(path, kind).map_err(|e| e.into_domain(DomainError::Source))
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.contains(&ext))
}

fn walk(root: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && has_extension(e.path(), extensions))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Candidate documents: `path` itself, or every `*.yaml`/`*.yml` below it plus the
/// `*.yml` documents of sibling folders. Each file appears once.
pub fn config_documents(path: &Path) -> Result<Vec<PathBuf>, InfrastructureError> {
    if !path.exists() {
        return Err(InfrastructureError::ConfigNotFound(
            path.display().to_string(),
        ));
    }
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut candidates = walk(path, &["yaml", "yml"]);
    let absolute = path.canonicalize()?;
    if let Some(parent) = absolute.parent() {
        candidates.extend(walk(parent, &["yml"]));
    }

    let mut seen = BTreeSet::new();
    let mut documents = Vec::new();
    for candidate in candidates {
        let key = candidate.canonicalize()?;
        if seen.insert(key) {
            documents.push(candidate);
        }
    }
    Ok(documents)
}

fn read_document(path: &Path) -> Result<Value, InfrastructureError> {
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(&content).map_err(|source| InfrastructureError::YamlError {
        path: path.display().to_string(),
        source,
    })
}

#[instrument(skip(path), fields(path = %path.display(), kind = %kind))]
pub fn load_configs(path: &Path, kind: ConfigKind) -> Result<ConfigCollection, InfrastructureError> {
    let mut all_configs = ConfigCollection::empty(kind);

    for document in config_documents(path)? {
        let node = match read_document(&document)? {
            Value::Object(mut root) => root.remove(kind.as_str()),
            _ => None,
        };
        let Some(node) = node else {
            continue;
        };
        let fragment = ConfigCollection::from_node(kind, &node)?;
        if fragment.is_empty() {
            continue;
        }
        debug!(file = %document.display(), count = fragment.len(), "Merging config fragment");
        all_configs = all_configs.merge(fragment)?;
    }

    if kind.is_required() && all_configs.is_empty() {
        return Err(DomainError::MissingRequiredConfig {
            kind: kind.as_str().to_string(),
            path: path.display().to_string(),
        }
        .into());
    }

    info!(count = all_configs.len(), "Loaded {} configs", kind);
    Ok(all_configs)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_merges_fragments_across_documents() -> Result<()> {
        let dir = tempdir()?;
        let configs = dir.path().join("configs");
        fs::create_dir_all(configs.join("nested"))?;
        fs::write(
            configs.join("a.yml"),
            "rules:\n  not_null:\n    rule_type: NOT_NULL\n",
        )?;
        fs::write(
            configs.join("nested/b.yaml"),
            "rules:\n  NOT_NULL:\n    rule_type: NOT_NULL\n  not_blank:\n    rule_type: NOT_BLANK\n",
        )?;
        fs::write(configs.join("c.yml"), "row_filters:\n  none:\n    filter_sql_expr: 'TRUE'\n")?;

        let rules = load_configs(&configs, ConfigKind::Rule)?;
        assert_eq!(rules.ids(), vec!["NOT_BLANK", "NOT_NULL"]);
        Ok(())
    }

    #[test]
    fn test_sibling_yml_documents_are_included_once() -> Result<()> {
        let dir = tempdir()?;
        let configs = dir.path().join("configs");
        let entities = dir.path().join("entities");
        fs::create_dir_all(&configs)?;
        fs::create_dir_all(&entities)?;
        fs::write(configs.join("filters.yml"), "row_filters:\n  none:\n    filter_sql_expr: 'TRUE'\n")?;
        fs::write(
            entities.join("orders.yml"),
            "row_filters:\n  active:\n    filter_sql_expr: active = true\n",
        )?;

        let documents = config_documents(&configs)?;
        assert_eq!(documents.len(), 2);
        let filters = load_configs(&configs, ConfigKind::RowFilter)?;
        assert_eq!(filters.ids(), vec!["ACTIVE", "NONE"]);
        Ok(())
    }

    #[test]
    fn test_conflicting_documents_fail() -> Result<()> {
        let dir = tempdir()?;
        let configs = dir.path().join("configs");
        fs::create_dir_all(&configs)?;
        fs::write(configs.join("a.yml"), "rules:\n  r:\n    rule_type: NOT_NULL\n")?;
        fs::write(configs.join("b.yml"), "rules:\n  r:\n    rule_type: NOT_BLANK\n")?;
        let err = load_configs(&configs, ConfigKind::Rule).unwrap_err();
        assert!(matches!(
            err,
            InfrastructureError::Domain(DomainError::DuplicateConfig { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_required_kind_must_be_present() -> Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("only_rules.yml");
        fs::write(&file, "rules:\n  r:\n    rule_type: NOT_NULL\n")?;

        let err = load_configs(&file, ConfigKind::RowFilter).unwrap_err();
        assert!(err.to_string().contains("Failed to load row_filters"));

        let entities = load_configs(&file, ConfigKind::Entity)?;
        assert!(entities.is_empty());
        Ok(())
    }

    #[test]
    fn test_dimensions_are_collected_as_a_list() -> Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("dims.yml");
        fs::write(&file, "rule_dimensions:\n  - completeness\n  - accuracy\n")?;
        let dims = load_configs(&file, ConfigKind::RuleDimensions)?;
        assert_eq!(dims.len(), 2);
        Ok(())
    }
}
