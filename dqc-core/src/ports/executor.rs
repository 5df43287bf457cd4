// dqc-core/src/ports/executor.rs

// What the compiler needs from a warehouse, without knowing which one it is.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::DqcError;

#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Runs `query` and returns every row as positional JSON values.
    async fn execute(&self, query: &str) -> Result<Vec<Vec<Value>>, DqcError>;

    async fn table_exists(&self, table_name: &str, schema_name: &str) -> Result<bool, DqcError>;

    fn engine_name(&self) -> &str;
}
