// dqc-core/src/domain/config/rule_binding.rs

use serde_json::{Value, json};

use crate::domain::config::raw::{self, RawConfig};
use crate::domain::error::DomainError;

/// Structural form of a binding. Foreign keys are normalized but not resolved here.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleBinding {
    pub rule_binding_id: String,
    pub entity_id: String,
    pub column_id: Option<String>,
    pub rule_ids: Vec<String>,
    pub row_filter_id: String,
    pub reference_columns_id: Option<String>,
    pub incremental_time_filter_column: Option<String>,
    pub metadata: RawConfig,
}

impl RuleBinding {
    pub fn parse(rule_binding_id: &str, value: &Value) -> Result<Self, DomainError> {
        let map = raw::as_object(rule_binding_id, value, "Rule binding config")?;

        let entity_id = raw::normalize_id(&raw::required_str(rule_binding_id, map, "entity_id")?);
        let column_id = raw::optional_str(rule_binding_id, map, "column_id")?
            .map(|c| raw::normalize_id(&c));
        let rule_ids = raw::required_str_list(rule_binding_id, map, "rule_ids")?
            .iter()
            .map(|id| raw::normalize_id(id))
            .collect();
        let row_filter_id =
            raw::normalize_id(&raw::required_str(rule_binding_id, map, "row_filter_id")?);
        let reference_columns_id = raw::optional_str(rule_binding_id, map, "reference_columns_id")?
            .map(|id| raw::normalize_id(&id));
        let incremental_time_filter_column =
            raw::optional_str(rule_binding_id, map, "incremental_time_filter_column")?;
        let metadata = raw::optional_object(rule_binding_id, map, "metadata")?;

        Ok(RuleBinding {
            rule_binding_id: rule_binding_id.to_string(),
            entity_id,
            column_id,
            rule_ids,
            row_filter_id,
            reference_columns_id,
            incremental_time_filter_column,
            metadata,
        })
    }

    pub fn to_raw(&self) -> Value {
        json!({
            "entity_id": self.entity_id,
            "column_id": self.column_id,
            "rule_ids": self.rule_ids,
            "row_filter_id": self.row_filter_id,
            "reference_columns_id": self.reference_columns_id,
            "incremental_time_filter_column": self.incremental_time_filter_column,
            "metadata": self.metadata,
        })
    }
}
