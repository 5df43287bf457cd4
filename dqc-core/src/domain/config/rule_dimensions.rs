// dqc-core/src/domain/config/rule_dimensions.rs

use serde_json::Value;
use std::collections::BTreeSet;

use crate::domain::config::raw;
use crate::domain::error::DomainError;

/// Allowed dimension vocabulary. Empty means no rule may declare a dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleDimensions {
    pub dimensions: BTreeSet<String>,
}

impl RuleDimensions {
    pub fn parse(values: &[Value]) -> Result<Self, DomainError> {
        let dimensions = values
            .iter()
            .map(|v| {
                raw::scalar_to_string(v)
                    .map(|s| s.trim().to_uppercase())
                    .ok_or_else(|| {
                        DomainError::invalid(
                            "rule_dimensions",
                            format!(
                                "rule_dimensions must be a flat list of strings, got:\n{}",
                                raw::payload(v)
                            ),
                        )
                    })
            })
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self { dimensions })
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    pub fn to_raw(&self) -> Value {
        Value::Array(
            self.dimensions
                .iter()
                .map(|d| Value::String(d.clone()))
                .collect(),
        )
    }
}
