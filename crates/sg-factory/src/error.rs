//! Error types for sg-factory

use sg_core::CoreError;
use sg_db::DbError;
use thiserror::Error;

/// Factory errors
#[derive(Error, Debug)]
pub enum FactoryError {
    /// F001: build_list asked for no values
    #[error("[F001] Invalid count {0}: build_list needs at least one value")]
    InvalidCount(usize),

    /// F002: the root type was also attached as an association
    #[error("[F002] {type_name} is the type being built and cannot also be an association")]
    RootAssociation { type_name: String },

    /// F003: Core error propagation
    #[error("[F003] Core error: {0}")]
    Core(#[from] CoreError),

    /// F004: Storage error propagation
    #[error("[F004] Storage error: {0}")]
    Storage(#[from] DbError),
}

/// Result type alias for FactoryError
pub type FactoryResult<T> = Result<T, FactoryError>;
