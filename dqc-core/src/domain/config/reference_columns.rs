// dqc-core/src/domain/config/reference_columns.rs

use serde_json::{Value, json};

use crate::domain::config::raw;
use crate::domain::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceColumns {
    pub reference_columns_id: String,
    /// Order is kept as declared.
    pub include_reference_columns: Vec<String>,
}

impl ReferenceColumns {
    pub fn parse(reference_columns_id: &str, value: &Value) -> Result<Self, DomainError> {
        let map = raw::as_object(reference_columns_id, value, "Reference columns config")?;
        let include_reference_columns =
            raw::required_str_list(reference_columns_id, map, "include_reference_columns")?;
        Ok(Self {
            reference_columns_id: reference_columns_id.to_string(),
            include_reference_columns,
        })
    }

    pub fn to_raw(&self) -> Value {
        json!({ "include_reference_columns": self.include_reference_columns })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_keep_declared_order() {
        let cols = ReferenceColumns::parse(
            "ORDER_REFS",
            &json!({"include_reference_columns": ["status", "order_id", "amount"]}),
        )
        .unwrap();
        assert_eq!(cols.include_reference_columns, vec!["status", "order_id", "amount"]);
    }

    #[test]
    fn test_empty_or_scalar_lists_are_rejected() {
        assert!(ReferenceColumns::parse("R", &json!({"include_reference_columns": []})).is_err());
        let err =
            ReferenceColumns::parse("R", &json!({"include_reference_columns": "status"})).unwrap_err();
        assert!(err.to_string().contains("of type list"));
    }
}
