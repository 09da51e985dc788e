//! sg-core - Core library for Seedgraph
//!
//! This crate provides record schemas (typed field accessor tables),
//! declarative tag parsing, metadata extraction, the per-build dependency
//! graph with its topological sorter, and configuration parsing.

pub mod config;
pub mod dag;
pub mod error;
pub mod metadata;
pub mod names;
mod newtype_string;
pub mod record;
pub mod tag;
pub mod value;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use config::{Config, DatabaseConfig, DbType};
pub use dag::{DependencyGraph, DependencyRef, GraphGroup, TypeNode};
pub use error::{CoreError, CoreResult};
pub use metadata::{extract, FieldDependency, MetadataCache, Registration, TypeMetadata};
pub use names::{StorageName, TypeName};
pub use record::{Field, FieldDescriptor, Record, RecordRow, RecordSchema, Row, TypeDescriptor};
pub use tag::{parse_tag, FieldTag, ForeignKeyTag};
pub use value::{FieldKind, FieldType, FieldValue, Identifier};
