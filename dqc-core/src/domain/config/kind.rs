// dqc-core/src/domain/config/kind.rs

// Closed registry of config kinds. Each kind maps to one model and one merge strategy.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::domain::config::{
    entity::Entity, reference_columns::ReferenceColumns, row_filter::RowFilter, rule::Rule,
    rule_binding::RuleBinding, rule_dimensions::RuleDimensions,
};
use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigKind {
    #[serde(rename = "rules")]
    Rule,
    #[serde(rename = "rule_bindings")]
    RuleBinding,
    #[serde(rename = "rule_dimensions")]
    RuleDimensions,
    #[serde(rename = "row_filters")]
    RowFilter,
    #[serde(rename = "reference_columns")]
    ReferenceColumns,
    #[serde(rename = "entities")]
    Entity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// id -> config, duplicates must be deep-equal.
    Map,
    /// Flat list, both sides must agree when non-empty.
    Set,
}

impl ConfigKind {
    pub const ALL: [ConfigKind; 6] = [
        ConfigKind::Rule,
        ConfigKind::RuleBinding,
        ConfigKind::RuleDimensions,
        ConfigKind::RowFilter,
        ConfigKind::ReferenceColumns,
        ConfigKind::Entity,
    ];

    /// Cache population order. Rules come after dimensions so they can be validated.
    pub const LOAD_ORDER: [ConfigKind; 6] = [
        ConfigKind::Entity,
        ConfigKind::RowFilter,
        ConfigKind::ReferenceColumns,
        ConfigKind::RuleDimensions,
        ConfigKind::Rule,
        ConfigKind::RuleBinding,
    ];

    /// Top-level node name in config documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKind::Rule => "rules",
            ConfigKind::RuleBinding => "rule_bindings",
            ConfigKind::RuleDimensions => "rule_dimensions",
            ConfigKind::RowFilter => "row_filters",
            ConfigKind::ReferenceColumns => "reference_columns",
            ConfigKind::Entity => "entities",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ConfigKind::Rule => "Rule",
            ConfigKind::RuleBinding => "Rule Binding",
            ConfigKind::RuleDimensions => "Rule Dimensions",
            ConfigKind::RowFilter => "Row Filter",
            ConfigKind::ReferenceColumns => "Reference Columns",
            ConfigKind::Entity => "Entity",
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(
            self,
            ConfigKind::Rule | ConfigKind::RuleBinding | ConfigKind::RowFilter
        )
    }

    pub fn merge_strategy(&self) -> MergeStrategy {
        match self {
            ConfigKind::RuleDimensions => MergeStrategy::Set,
            _ => MergeStrategy::Map,
        }
    }
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated config of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigModel {
    Rule(Rule),
    RuleBinding(RuleBinding),
    RuleDimensions(RuleDimensions),
    RowFilter(RowFilter),
    ReferenceColumns(ReferenceColumns),
    Entity(Entity),
}

impl ConfigModel {
    pub fn parse(kind: ConfigKind, id: &str, value: &Value) -> Result<Self, DomainError> {
        Ok(match kind {
            ConfigKind::Rule => ConfigModel::Rule(Rule::parse(id, value)?),
            ConfigKind::RuleBinding => ConfigModel::RuleBinding(RuleBinding::parse(id, value)?),
            ConfigKind::RuleDimensions => {
                let values = value.as_array().ok_or_else(|| {
                    DomainError::invalid(id, "rule_dimensions must be a list of strings")
                })?;
                ConfigModel::RuleDimensions(RuleDimensions::parse(values)?)
            }
            ConfigKind::RowFilter => ConfigModel::RowFilter(RowFilter::parse(id, value)?),
            ConfigKind::ReferenceColumns => {
                ConfigModel::ReferenceColumns(ReferenceColumns::parse(id, value)?)
            }
            ConfigKind::Entity => ConfigModel::Entity(Entity::parse(id, value)?),
        })
    }

    pub fn kind(&self) -> ConfigKind {
        match self {
            ConfigModel::Rule(_) => ConfigKind::Rule,
            ConfigModel::RuleBinding(_) => ConfigKind::RuleBinding,
            ConfigModel::RuleDimensions(_) => ConfigKind::RuleDimensions,
            ConfigModel::RowFilter(_) => ConfigKind::RowFilter,
            ConfigModel::ReferenceColumns(_) => ConfigKind::ReferenceColumns,
            ConfigModel::Entity(_) => ConfigKind::Entity,
        }
    }

    pub fn to_raw(&self) -> Value {
        match self {
            ConfigModel::Rule(m) => m.to_raw(),
            ConfigModel::RuleBinding(m) => m.to_raw(),
            ConfigModel::RuleDimensions(m) => m.to_raw(),
            ConfigModel::RowFilter(m) => m.to_raw(),
            ConfigModel::ReferenceColumns(m) => m.to_raw(),
            ConfigModel::Entity(m) => m.to_raw(),
        }
    }
}
