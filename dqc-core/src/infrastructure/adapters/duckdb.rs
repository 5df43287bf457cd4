// dqc-core/src/infrastructure/adapters/duckdb.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime};
use duckdb::types::Value as DuckValue;
use duckdb::{Config, Connection, params};
use serde_json::{Number, Value};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::error::DqcError;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::executor::QueryExecutor;

/// Local warehouse on a DuckDB file (or `:memory:`).
pub struct DuckDbExecutor {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDbExecutor {
    pub fn new(db_path: &str) -> Result<Self, InfrastructureError> {
        let config = Config::default();

        let conn = if db_path == ":memory:" {
            Connection::open_in_memory_with_flags(config)?
        } else {
            Connection::open_with_flags(db_path, config)?
        };

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, DqcError> {
        self.conn
            .lock()
            .map_err(|_| DqcError::Infrastructure(DatabaseError::Poisoned.into()))
    }
}

fn to_json(value: DuckValue) -> Value {
    match value {
        DuckValue::Null => Value::Null,
        DuckValue::Boolean(b) => Value::Bool(b),
        DuckValue::TinyInt(i) => Value::from(i),
        DuckValue::SmallInt(i) => Value::from(i),
        DuckValue::Int(i) => Value::from(i),
        DuckValue::BigInt(i) => Value::from(i),
        DuckValue::UTinyInt(i) => Value::from(i),
        DuckValue::USmallInt(i) => Value::from(i),
        DuckValue::UInt(i) => Value::from(i),
        DuckValue::UBigInt(i) => Value::from(i),
        DuckValue::Float(f) => Number::from_f64(f64::from(f)).map_or(Value::Null, Value::Number),
        DuckValue::Double(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        DuckValue::HugeInt(i) => i64::try_from(i)
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(i.to_string())),
        DuckValue::Decimal(d) => Value::String(d.to_string()),
        DuckValue::Timestamp(unit, v) => {
            DateTime::from_timestamp_micros(unit.to_micros(v)).map_or(Value::Null, |ts| {
                Value::String(ts.naive_utc().to_string())
            })
        }
        DuckValue::Date32(days) => DateTime::from_timestamp(i64::from(days) * 86_400, 0)
            .map_or(Value::Null, |ts| Value::String(ts.date_naive().to_string())),
        DuckValue::Time64(unit, v) => {
            let micros = unit.to_micros(v);
            let secs = u32::try_from(micros.div_euclid(1_000_000)).unwrap_or_default();
            let nanos = u32::try_from(micros.rem_euclid(1_000_000) * 1_000).unwrap_or_default();
            NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
                .map_or(Value::Null, |t| Value::String(t.to_string()))
        }
        DuckValue::Text(s) | DuckValue::Enum(s) => Value::String(s),
        DuckValue::List(items) | DuckValue::Array(items) => {
            Value::Array(items.into_iter().map(to_json).collect())
        }
        other => Value::String(format!("{:?}", other)),
    }
}

#[async_trait]
impl QueryExecutor for DuckDbExecutor {
    async fn execute(&self, query: &str) -> Result<Vec<Vec<Value>>, DqcError> {
        debug!(query, "Executing query on DuckDB");
        let conn = self.lock()?;
        let mut stmt = conn.prepare(query)?;
        let mut rows = stmt.query([])?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let width = row.as_ref().column_count();
            let mut values = Vec::with_capacity(width);
            for idx in 0..width {
                let value: DuckValue = row.get(idx)?;
                values.push(to_json(value));
            }
            out.push(values);
        }
        Ok(out)
    }

    async fn table_exists(&self, table_name: &str, schema_name: &str) -> Result<bool, DqcError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
        )?;
        let count: i64 = stmt.query_row(params![schema_name, table_name], |row| row.get(0))?;
        Ok(count > 0)
    }

    fn engine_name(&self) -> &str {
        "duckdb"
    }
}
