// dqc-core/src/infrastructure/compiler/sql_validator.rs

// Offline dry run: generated SQL must at least parse as Redshift SQL.

use sqlparser::dialect::RedshiftSqlDialect;
use sqlparser::parser::Parser;

use crate::infrastructure::error::InfrastructureError;

/// Returns the number of statements parsed.
pub fn validate_sql(rule_binding_id: &str, sql: &str) -> Result<usize, InfrastructureError> {
    let dialect = RedshiftSqlDialect {};
    let statements =
        Parser::parse_sql(&dialect, sql).map_err(|e| InfrastructureError::SqlValidation {
            rule_binding_id: rule_binding_id.to_string(),
            message: e.to_string(),
        })?;
    tracing::debug!(rule_binding_id, statements = statements.len(), "Generated SQL parsed");
    Ok(statements.len())
}
