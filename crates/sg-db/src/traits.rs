//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use sg_core::{FieldKind, FieldValue, Row, StorageName};

/// A boxed row borrowed from a record batch.
pub type RowBox<'r> = Box<dyn Row + 'r>;

/// Storage capability the factory inserts fixtures through.
///
/// Backends assign identifiers by calling [`Row::assign_identifier`] on
/// every inserted row before returning. Implementations must be
/// Send + Sync for async operation.
#[async_trait]
pub trait Database: Send + Sync {
    /// Insert a single row into `storage`
    async fn insert_one(&self, storage: &StorageName, row: &mut dyn Row) -> DbResult<()>;

    /// Insert rows into `storage`, in order
    async fn insert_many(&self, storage: &StorageName, rows: &mut [RowBox<'_>]) -> DbResult<()>;

    /// Backend-specific value for a field kind the default synthesizer
    /// cannot or should not fill. `None` defers to the synthesizer.
    fn generate_custom_value(&self, _kind: &FieldKind) -> Option<FieldValue> {
        None
    }

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
