// dqc-core/src/domain/config/row_filter.rs

use serde_json::{Value, json};

use crate::domain::config::raw;
use crate::domain::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilter {
    pub row_filter_id: String,
    pub filter_sql_expr: String,
}

impl RowFilter {
    pub fn parse(row_filter_id: &str, value: &Value) -> Result<Self, DomainError> {
        let map = raw::as_object(row_filter_id, value, "Row filter config")?;
        let filter_sql_expr = raw::required_str(row_filter_id, map, "filter_sql_expr")?;
        Ok(Self {
            row_filter_id: row_filter_id.to_string(),
            filter_sql_expr,
        })
    }

    pub fn to_raw(&self) -> Value {
        json!({ "filter_sql_expr": self.filter_sql_expr })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_expr_is_required() {
        let filter = RowFilter::parse("ACTIVE", &json!({"filter_sql_expr": "active = true"})).unwrap();
        assert_eq!(filter.to_raw(), json!({"filter_sql_expr": "active = true"}));

        let err = RowFilter::parse("NONE", &json!({"filter_sql_expr": ""})).unwrap_err();
        assert!(err.to_string().contains("filter_sql_expr"));
    }
}
