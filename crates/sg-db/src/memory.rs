//! In-process backend that assigns sequential identifiers and records every call

use crate::error::{DbError, DbResult};
use crate::traits::{Database, RowBox};
use async_trait::async_trait;
use serde_json::{Map, Value};
use sg_core::{Identifier, Row, StorageName};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// One recorded call to the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertCall {
    pub storage: String,
    pub rows: usize,
    /// Whether the call came through `insert_many`
    pub batch: bool,
}

#[derive(Default)]
struct Table {
    last_id: i64,
    rows: Vec<Value>,
}

#[derive(Default)]
struct MemoryState {
    tables: HashMap<String, Table>,
    calls: Vec<InsertCall>,
    failing: HashSet<String>,
}

/// In-memory storage backend for tests
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every insert into `storage` fail
    pub fn fail_on(&self, storage: &str) -> DbResult<()> {
        self.lock()?.failing.insert(storage.to_string());
        Ok(())
    }

    /// All calls received so far, in order
    pub fn calls(&self) -> DbResult<Vec<InsertCall>> {
        Ok(self.lock()?.calls.clone())
    }

    /// Storage names in the order they were first inserted into
    pub fn insert_order(&self) -> DbResult<Vec<String>> {
        let state = self.lock()?;
        let mut order: Vec<String> = Vec::new();
        for call in &state.calls {
            if !order.contains(&call.storage) {
                order.push(call.storage.clone());
            }
        }
        Ok(order)
    }

    /// Rows stored under `storage` as JSON objects
    pub fn rows(&self, storage: &str) -> DbResult<Vec<Value>> {
        Ok(self
            .lock()?
            .tables
            .get(storage)
            .map(|t| t.rows.clone())
            .unwrap_or_default())
    }

    fn lock(&self) -> DbResult<std::sync::MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    fn insert_sync(&self, storage: &StorageName, rows: &mut [&mut dyn Row], batch: bool) -> DbResult<()> {
        let mut state = self.lock()?;
        state.calls.push(InsertCall {
            storage: storage.to_string(),
            rows: rows.len(),
            batch,
        });
        if state.failing.contains(storage.as_str()) {
            return Err(DbError::InsertError {
                storage: storage.to_string(),
                message: "insert rejected by test backend".to_string(),
            });
        }

        let table = state.tables.entry(storage.to_string()).or_default();
        for row in rows.iter_mut() {
            let id = match row.identifier()? {
                Some(Identifier::Signed(v)) => v,
                Some(Identifier::Unsigned(v)) => i64::try_from(v).map_err(|_| {
                    DbError::UnsupportedValue {
                        backend: "memory".to_string(),
                        value: format!("identifier {v}"),
                    }
                })?,
                None => table.last_id + 1,
            };
            table.last_id = table.last_id.max(id);
            row.assign_identifier(Identifier::Signed(id))?;

            let mut object = Map::new();
            for (name, value) in row.columns() {
                let json = serde_json::to_value(&value).map_err(|e| DbError::UnsupportedValue {
                    backend: "memory".to_string(),
                    value: e.to_string(),
                })?;
                object.insert(name.to_string(), json);
            }
            table.rows.push(Value::Object(object));
        }
        Ok(())
    }
}

#[async_trait]
impl Database for MemoryBackend {
    async fn insert_one(&self, storage: &StorageName, row: &mut dyn Row) -> DbResult<()> {
        self.insert_sync(storage, &mut [row], false)
    }

    async fn insert_many(&self, storage: &StorageName, rows: &mut [RowBox<'_>]) -> DbResult<()> {
        let mut refs: Vec<&mut dyn Row> = rows.iter_mut().map(|r| r.as_mut() as &mut dyn Row).collect();
        self.insert_sync(storage, &mut refs, true)
    }

    fn db_type(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
