//! Error types for sg-core

use thiserror::Error;

/// Core error type for Seedgraph
#[derive(Error, Debug)]
pub enum CoreError {
    /// SG001: Configuration file not found
    #[error("[SG001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// SG002: Invalid configuration value
    #[error("[SG002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// SG003: Malformed declarative field tag
    #[error("[SG003] Invalid tag on {type_name}.{field}: {reason}")]
    TagFormat {
        type_name: String,
        field: String,
        reason: String,
    },

    /// SG004: Two fields of one type point at the same dependency type
    #[error("[SG004] {type_name} declares two foreign keys to {target}: '{first}' and '{second}'")]
    AmbiguousDependency {
        type_name: String,
        target: String,
        first: String,
        second: String,
    },

    /// SG005: Circular dependency between record types
    #[error("[SG005] Cycle dependency detected: {cycle}")]
    CycleDependency { cycle: String },

    /// SG006: Named field does not exist on the record type
    #[error("[SG006] Field '{field}' not found on {type_name}")]
    FieldNotFound { type_name: String, field: String },

    /// SG007: Field exists but cannot be written
    #[error("[SG007] Field '{field}' on {type_name} is not settable")]
    FieldNotSettable { type_name: String, field: String },

    /// SG008: Value does not fit the target field
    #[error("[SG008] Type mismatch on {type_name}.{field}: expected {expected}, found {found}")]
    TypeMismatch {
        type_name: String,
        field: String,
        expected: String,
        found: String,
    },

    /// SG009: Identifier or foreign key field is not an integer
    #[error("[SG009] Field '{field}' on {type_name} must be an integer, found {found}")]
    NotAnInteger {
        type_name: String,
        field: String,
        found: String,
    },

    /// SG010: Association batch does not match the registered type
    #[error("[SG010] Value type mismatch for {type_name}: {reason}")]
    ValueTypeMismatch { type_name: String, reason: String },

    /// SG011: Record type name or storage name is empty
    #[error("[SG011] Empty name: {context}")]
    EmptyName { context: String },

    /// SG012: Root values could not be recovered after insertion
    #[error("[SG012] Failed to convert inserted values back to {type_name}")]
    Conversion { type_name: String },

    /// SG013: IO error with file path context
    #[error("[SG013] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// SG014: Config YAML parse error
    #[error("[SG014] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
