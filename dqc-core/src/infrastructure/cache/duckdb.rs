// dqc-core/src/infrastructure/cache/duckdb.rs

// Persistent configs cache: one `dq_configs` table, JSON payloads keyed by (kind, id).

use duckdb::{Connection, params};
use serde_json::Value;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

use crate::domain::config::ConfigKind;
use crate::domain::error::DomainError;
use crate::domain::ports::ConfigStore;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS dq_configs (
    kind VARCHAR NOT NULL,
    id VARCHAR NOT NULL,
    payload VARCHAR NOT NULL,
    PRIMARY KEY (kind, id)
)";

pub struct DuckDbConfigStore {
    conn: Mutex<Connection>,
}

impl DuckDbConfigStore {
    pub fn open(path: &Path) -> Result<Self, InfrastructureError> {
        debug!(path = ?path, "Opening DuckDB configs cache");
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, InfrastructureError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, InfrastructureError> {
        conn.execute_batch(CREATE_TABLE)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, InfrastructureError>,
    ) -> Result<T, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| InfrastructureError::Database(DatabaseError::Poisoned))
            .map_err(|e| e.into_domain(DomainError::Store))?;
        f(&conn).map_err(|e| e.into_domain(DomainError::Store))
    }
}

impl ConfigStore for DuckDbConfigStore {
    fn put(&mut self, kind: ConfigKind, id: &str, payload: Value) -> Result<(), DomainError> {
        let body = serde_json::to_string(&payload).map_err(|e| DomainError::Store(e.to_string()))?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO dq_configs (kind, id, payload) VALUES (?, ?, ?)",
                params![kind.as_str(), id, body],
            )?;
            Ok(())
        })
    }

    fn clear(&mut self, kind: ConfigKind) -> Result<(), DomainError> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM dq_configs WHERE kind = ?",
                params![kind.as_str()],
            )?;
            debug!(kind = %kind, removed, "Cleared cached configs");
            Ok(())
        })
    }

    fn get(&self, kind: ConfigKind, id: &str) -> Result<Option<Value>, DomainError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT payload FROM dq_configs WHERE kind = ? AND id = ?")?;
            let mut rows = stmt.query(params![kind.as_str(), id])?;
            match rows.next()? {
                Some(row) => {
                    let body: String = row.get(0)?;
                    Ok(Some(serde_json::from_str(&body)?))
                }
                None => Ok(None),
            }
        })
    }

    fn ids(&self, kind: ConfigKind) -> Result<Vec<String>, DomainError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id FROM dq_configs WHERE kind = ? ORDER BY id")?;
            let rows = stmt.query_map(params![kind.as_str()], |row| row.get::<_, String>(0))?;
            let mut ids = Vec::new();
            for id in rows {
                ids.push(id?);
            }
            Ok(ids)
        })
    }
}
