// dqc-core/src/domain/config/rule.rs

use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::fmt;

use crate::domain::config::raw::{self, RawConfig};
use crate::domain::error::DomainError;
use crate::domain::substitution::safe_substitute;

const DIMENSIONS_EXAMPLE: &str = "```\nrule_dimensions:\n  - consistency\n  - correctness\n  - duplication\n  - completeness\n  - conformance\n  - integrity\n```";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleType {
    NotNull,
    NotBlank,
    Regex,
    CustomSqlExpr,
    CustomSqlStatement,
}

impl RuleType {
    pub const ALL: [RuleType; 5] = [
        RuleType::NotNull,
        RuleType::NotBlank,
        RuleType::Regex,
        RuleType::CustomSqlExpr,
        RuleType::CustomSqlStatement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::NotNull => "NOT_NULL",
            RuleType::NotBlank => "NOT_BLANK",
            RuleType::Regex => "REGEX",
            RuleType::CustomSqlExpr => "CUSTOM_SQL_EXPR",
            RuleType::CustomSqlStatement => "CUSTOM_SQL_STATEMENT",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let upper = raw.trim().to_uppercase();
        Self::ALL.into_iter().find(|t| t.as_str() == upper)
    }

    /// SQL template with `$name` placeholders filled from the rule params.
    pub fn sql_template(&self) -> &'static str {
        match self {
            RuleType::NotNull => "$column IS NOT NULL",
            RuleType::NotBlank => "TRIM($column) != ''",
            RuleType::Regex => "$column ~ '$pattern'",
            RuleType::CustomSqlExpr => "$custom_sql_expr",
            RuleType::CustomSqlStatement => "$custom_sql_statement",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub rule_id: String,
    pub rule_type: RuleType,
    pub dimension: Option<String>,
    pub params: RawConfig,
}

impl Rule {
    pub fn parse(rule_id: &str, value: &Value) -> Result<Self, DomainError> {
        let map = raw::as_object(rule_id, value, "Rule config")?;
        let rule_type_raw = raw::required_str(rule_id, map, "rule_type")?;
        let rule_type = RuleType::parse(&rule_type_raw).ok_or_else(|| {
            DomainError::invalid(
                rule_id,
                format!(
                    "Rule ID '{}' has invalid rule_type '{}'. Allowed values: {:?}",
                    rule_id,
                    rule_type_raw.to_uppercase(),
                    RuleType::ALL.iter().map(|t| t.as_str()).collect::<Vec<_>>()
                ),
            )
        })?;
        // `dimension: null` means undimensioned; a blank string is rejected.
        if let Some(Value::String(d)) = map.get("dimension")
            && d.trim().is_empty()
        {
            return Err(DomainError::invalid(
                rule_id,
                format!(
                    "Invalid rule dimension '{}' in rule configurations ID '{}'. Remove the 'dimension' key or set it to one of the allowed rule_dimensions.",
                    d, rule_id
                ),
            ));
        }
        let dimension = raw::optional_str(rule_id, map, "dimension")?.map(|d| d.to_uppercase());
        let params = raw::optional_object(rule_id, map, "params")?;

        Ok(Rule {
            rule_id: rule_id.to_string(),
            rule_type,
            dimension,
            params,
        })
    }

    /// Checks the declared dimension against the allowed vocabulary.
    /// A rule without a dimension is always valid.
    pub fn validate_dimension(&self, allowed: &BTreeSet<String>) -> Result<(), DomainError> {
        let Some(dimension) = &self.dimension else {
            return Ok(());
        };
        if allowed.is_empty() {
            return Err(DomainError::invalid(
                &self.rule_id,
                format!(
                    "Invalid rule dimension '{}' in rule configurations ID '{}'.\nThe list of allowed rule_dimensions is empty. You can add '{}' to the allowed list of dimensions in the 'rule_dimensions' YAML config node, e.g.\n{}",
                    dimension, self.rule_id, dimension, DIMENSIONS_EXAMPLE
                ),
            ));
        }
        if !allowed.contains(dimension) {
            return Err(DomainError::invalid(
                &self.rule_id,
                format!(
                    "Invalid rule dimension '{}' in rule configurations ID '{}'.\nEnsure it is one of the allowed rule_dimensions: {:?} or add it to the allowed list of dimensions in the 'rule_dimensions' YAML config node, e.g.\n{}",
                    dimension, self.rule_id, allowed, DIMENSIONS_EXAMPLE
                ),
            ));
        }
        Ok(())
    }

    pub fn sql_expr(&self) -> String {
        safe_substitute(self.rule_type.sql_template(), &self.params)
    }

    pub fn to_raw(&self) -> Value {
        json!({
            "rule_type": self.rule_type.as_str(),
            "dimension": self.dimension,
            "params": self.params,
        })
    }

    /// Serialized form plus the computed `rule_sql_expr`.
    pub fn to_resolved(&self) -> Value {
        let mut value = self.to_raw();
        if let Some(map) = value.as_object_mut() {
            map.insert("rule_sql_expr".into(), Value::String(self.sql_expr()));
        }
        value
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dims(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_parse_normalizes_enum_and_dimension() {
        let rule = Rule::parse(
            "VALID_EMAIL",
            &json!({"rule_type": "regex", "dimension": "conformance", "params": {"pattern": "^.+@.+$"}}),
        )
        .unwrap();
        assert_eq!(rule.rule_type, RuleType::Regex);
        assert_eq!(rule.dimension.as_deref(), Some("CONFORMANCE"));
    }

    #[test]
    fn test_unknown_rule_type_lists_allowed_values() {
        let err = Rule::parse("R1", &json!({"rule_type": "unique"})).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("R1"));
        assert!(msg.contains("NOT_NULL"));
    }

    #[test]
    fn test_missing_rule_type() {
        let err = Rule::parse("R1", &json!({"params": {}})).unwrap_err();
        assert!(err.to_string().contains("rule_type"));
    }

    #[test]
    fn test_dimension_validation() {
        let rule = Rule::parse("R1", &json!({"rule_type": "NOT_NULL", "dimension": "completeness"}))
            .unwrap();
        assert!(rule.validate_dimension(&dims(&["COMPLETENESS"])).is_ok());

        let err = rule.validate_dimension(&BTreeSet::new()).unwrap_err();
        assert!(err.to_string().contains("is empty"));

        let err = rule.validate_dimension(&dims(&["ACCURACY"])).unwrap_err();
        assert!(err.to_string().contains("ACCURACY"));

        let undimensioned = Rule::parse("R2", &json!({"rule_type": "NOT_NULL"})).unwrap();
        assert!(undimensioned.validate_dimension(&BTreeSet::new()).is_ok());
    }

    #[test]
    fn test_blank_dimension_is_rejected() {
        let err = Rule::parse("R1", &json!({"rule_type": "NOT_NULL", "dimension": "  "}))
            .unwrap_err();
        assert!(err.to_string().contains("Invalid rule dimension"));

        let rule = Rule::parse("R1", &json!({"rule_type": "NOT_NULL", "dimension": null})).unwrap();
        assert_eq!(rule.dimension, None);
    }

    #[test]
    fn test_sql_expr_leaves_unknown_placeholders() {
        let rule = Rule::parse(
            "R1",
            &json!({"rule_type": "REGEX", "params": {"pattern": "^[0-9]+$"}}),
        )
        .unwrap();
        assert_eq!(rule.sql_expr(), "$column ~ '^[0-9]+$'");

        let custom = Rule::parse(
            "R2",
            &json!({"rule_type": "CUSTOM_SQL_EXPR", "params": {"custom_sql_expr": "amount > 0"}}),
        )
        .unwrap();
        assert_eq!(custom.to_resolved()["rule_sql_expr"], "amount > 0");
    }
}
