//! sg-db - Storage abstraction layer for Seedgraph
//!
//! This crate provides the `Database` trait the factory inserts through,
//! an in-memory recording backend for tests, and a DuckDB backend.

pub mod duckdb;
pub mod error;
pub mod memory;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use memory::{InsertCall, MemoryBackend};
pub use traits::{Database, RowBox};

use sg_core::{DatabaseConfig, DbType};

/// Open the backend described by `config`
pub fn connect(config: &DatabaseConfig) -> DbResult<Box<dyn Database>> {
    log::debug!("Opening {} backend at '{}'", config.db_type, config.path);
    match config.db_type {
        DbType::Memory => Ok(Box::new(MemoryBackend::new())),
        DbType::DuckDb => Ok(Box::new(DuckDbBackend::new(&config.path)?)),
    }
}
