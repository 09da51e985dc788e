//! DuckDB storage backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::{Database, RowBox};
use async_trait::async_trait;
use duckdb::types::{TimeUnit, Value};
use duckdb::Connection;
use sg_core::{FieldValue, Identifier, Row, StorageName};
use std::path::Path;
use std::sync::Mutex;

/// DuckDB storage backend
///
/// Tables must exist beforehand and give the identifier column a default
/// (for example `DEFAULT nextval('users_id')`). Rows whose identifier is
/// still unassigned are inserted without it and read it back through
/// `RETURNING`.
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn lock(&self) -> DbResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// Execute schema setup SQL (multiple statements)
    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }

    /// Count rows returned by a query
    pub fn query_count(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM ({})", sql), [], |row| {
                row.get(0)
            })
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;
        Ok(count as usize)
    }

    /// Read a single BIGINT value
    pub fn query_i64(&self, sql: &str) -> DbResult<i64> {
        let conn = self.lock()?;
        conn.query_row(sql, [], |row| row.get(0))
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }

    /// Insert rows one statement at a time, assigning returned identifiers
    fn insert_sync(&self, storage: &StorageName, rows: &mut [&mut dyn Row]) -> DbResult<()> {
        let conn = self.lock()?;
        for row in rows.iter_mut() {
            let id_column = row.id_column();
            let preassigned = row.identifier()?.is_some();

            let mut columns = Vec::new();
            let mut params = Vec::new();
            for (name, value) in row.columns() {
                if name == id_column && !preassigned {
                    continue;
                }
                columns.push(name);
                params.push(to_duckdb_value(value));
            }

            let sql = if columns.is_empty() {
                format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", storage, id_column)
            } else {
                let placeholders = vec!["?"; columns.len()].join(", ");
                format!(
                    "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
                    storage,
                    columns.join(", "),
                    placeholders,
                    id_column
                )
            };

            let id: i64 = conn
                .query_row(&sql, duckdb::params_from_iter(params), |r| r.get(0))
                .map_err(|e| match DbError::from(e) {
                    DbError::ExecutionError(message) => DbError::InsertError {
                        storage: storage.to_string(),
                        message,
                    },
                    other => other,
                })?;
            log::debug!("Inserted {} row with {} = {}", storage, id_column, id);
            row.assign_identifier(Identifier::Signed(id))?;
        }
        Ok(())
    }
}

fn to_duckdb_value(value: FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Bool(v) => Value::Boolean(v),
        FieldValue::Int(v) => Value::BigInt(v),
        FieldValue::UInt(v) => Value::UBigInt(v),
        FieldValue::Float(v) => Value::Double(v),
        FieldValue::Text(v) => Value::Text(v),
        FieldValue::Timestamp(v) => {
            Value::Timestamp(TimeUnit::Microsecond, v.and_utc().timestamp_micros())
        }
        FieldValue::Uuid(v) => Value::Text(v.to_string()),
        FieldValue::Bytes(v) => Value::Blob(v),
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn insert_one(&self, storage: &StorageName, row: &mut dyn Row) -> DbResult<()> {
        self.insert_sync(storage, &mut [row])
    }

    async fn insert_many(&self, storage: &StorageName, rows: &mut [RowBox<'_>]) -> DbResult<()> {
        let mut refs: Vec<&mut dyn Row> = rows.iter_mut().map(|r| r.as_mut() as &mut dyn Row).collect();
        self.insert_sync(storage, &mut refs)
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
