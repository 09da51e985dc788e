//! Metadata extraction: from a record's tagged fields to its dependencies.

use crate::error::{CoreError, CoreResult};
use crate::names::{StorageName, TypeName};
use crate::record::{Record, RecordSchema, TypeDescriptor};
use crate::tag::parse_tag;
use std::any::{Any, TypeId};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// One declared dependency of a record type on another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDependency {
    /// Type that must be inserted first
    pub target_type: TypeName,
    /// Where the target type is stored
    pub target_storage: StorageName,
    /// Field on the dependent type holding the target's identifier
    pub foreign_key_field: &'static str,
    /// Reference field receiving a copy of the target record
    pub foreign_value_field: Option<&'static str>,
    /// Excluded from wiring and from the dependency graph
    pub omitted: bool,
}

/// Everything the graph builder needs to know about one record type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeMetadata {
    pub type_name: TypeName,
    pub storage_name: StorageName,
    pub id_field: &'static str,
    pub omitted_fields: BTreeSet<&'static str>,
    dependencies: Vec<FieldDependency>,
}

impl TypeMetadata {
    /// Dependencies in field declaration order, at most one per target type.
    pub fn dependencies(&self) -> &[FieldDependency] {
        &self.dependencies
    }

    pub fn dependency(&self, target: &str) -> Option<&FieldDependency> {
        self.dependencies.iter().find(|d| d.target_type == target)
    }

    pub fn is_omitted(&self, field: &str) -> bool {
        self.omitted_fields.contains(field)
    }
}

/// Parse every tag of `desc` into a [`TypeMetadata`].
///
/// Storage names default to the snake-cased type name plus `plural_suffix`.
pub fn extract(desc: &TypeDescriptor, plural_suffix: &str) -> CoreResult<TypeMetadata> {
    let type_name = desc.type_name.to_string();

    let id = desc.field(desc.id_field).ok_or_else(|| CoreError::FieldNotFound {
        type_name: type_name.clone(),
        field: desc.id_field.to_string(),
    })?;
    if !id.kind.is_integer() {
        return Err(CoreError::NotAnInteger {
            type_name,
            field: id.name.to_string(),
            found: id.kind.to_string(),
        });
    }

    let mut omitted_fields = BTreeSet::new();
    let mut dependencies: Vec<FieldDependency> = Vec::new();

    for field in &desc.fields {
        let Some(raw) = field.tag else { continue };
        let tag = parse_tag(&type_name, field.name, raw)?;

        if tag.omit {
            omitted_fields.insert(field.name);
        }

        let Some(fk) = tag.foreign_key else { continue };

        if !field.kind.is_integer() {
            return Err(CoreError::NotAnInteger {
                type_name,
                field: field.name.to_string(),
                found: field.kind.to_string(),
            });
        }

        if !field.exported && !tag.omit {
            return Err(CoreError::FieldNotSettable {
                type_name,
                field: field.name.to_string(),
            });
        }

        let target_type = TypeName::try_new(fk.target.as_str())?;
        let target_storage = match fk.table {
            Some(table) => StorageName::try_new(table)?,
            None => StorageName::derive(&target_type, plural_suffix),
        };

        let foreign_value_field = match fk.field {
            Some(name) => {
                let value_field = desc.field(&name).ok_or_else(|| CoreError::FieldNotFound {
                    type_name: type_name.clone(),
                    field: name.clone(),
                })?;
                if !value_field.exported {
                    return Err(CoreError::FieldNotSettable {
                        type_name,
                        field: name,
                    });
                }
                if value_field.kind.reference_target() != Some(target_type.as_str()) {
                    return Err(CoreError::TypeMismatch {
                        type_name,
                        field: name,
                        expected: target_type.to_string(),
                        found: value_field.kind.to_string(),
                    });
                }
                Some(value_field.name)
            }
            None => None,
        };

        if let Some(existing) = dependencies.iter().find(|d| d.target_type == target_type) {
            return Err(CoreError::AmbiguousDependency {
                type_name,
                target: target_type.to_string(),
                first: existing.foreign_key_field.to_string(),
                second: field.name.to_string(),
            });
        }

        dependencies.push(FieldDependency {
            target_type,
            target_storage,
            foreign_key_field: field.name,
            foreign_value_field,
            omitted: tag.omit,
        });
    }

    let storage_name = desc
        .storage
        .clone()
        .unwrap_or_else(|| StorageName::derive(&desc.type_name, plural_suffix));

    Ok(TypeMetadata {
        type_name: desc.type_name.clone(),
        storage_name,
        id_field: desc.id_field,
        omitted_fields,
        dependencies,
    })
}

/// A record type's schema together with its extracted metadata.
pub struct Registration<T> {
    pub schema: Arc<RecordSchema<T>>,
    pub metadata: Arc<TypeMetadata>,
}

struct CacheEntry {
    type_id: TypeId,
    schema: Arc<dyn Any + Send + Sync>,
    metadata: Arc<TypeMetadata>,
}

/// Per-factory cache of schemas and metadata, so each type is described
/// and parsed once.
pub struct MetadataCache {
    plural_suffix: String,
    entries: HashMap<TypeName, CacheEntry>,
}

impl MetadataCache {
    pub fn new(plural_suffix: impl Into<String>) -> Self {
        Self {
            plural_suffix: plural_suffix.into(),
            entries: HashMap::new(),
        }
    }

    /// Describe and parse `T`, or return the cached result.
    ///
    /// Fails with [`CoreError::ValueTypeMismatch`] when a different Rust type
    /// already registered the same type name.
    pub fn register<T: Record>(&mut self) -> CoreResult<Registration<T>> {
        if let Some(entry) = self.entries.get(T::TYPE_NAME) {
            if entry.type_id != TypeId::of::<T>() {
                return Err(CoreError::ValueTypeMismatch {
                    type_name: T::TYPE_NAME.to_string(),
                    reason: format!(
                        "name already registered by another type, not {}",
                        std::any::type_name::<T>()
                    ),
                });
            }
            let schema = Arc::clone(&entry.schema)
                .downcast::<RecordSchema<T>>()
                .map_err(|_| CoreError::Conversion {
                    type_name: T::TYPE_NAME.to_string(),
                })?;
            return Ok(Registration {
                schema,
                metadata: Arc::clone(&entry.metadata),
            });
        }

        let schema = Arc::new(T::schema());
        let metadata = Arc::new(extract(&schema.descriptor(), &self.plural_suffix)?);
        log::debug!(
            "Registered {} ({} dependencies, storage '{}')",
            metadata.type_name,
            metadata.dependencies().len(),
            metadata.storage_name
        );

        self.entries.insert(
            schema.type_name().clone(),
            CacheEntry {
                type_id: TypeId::of::<T>(),
                schema: Arc::clone(&schema) as Arc<dyn Any + Send + Sync>,
                metadata: Arc::clone(&metadata),
            },
        );
        Ok(Registration { schema, metadata })
    }

    pub fn metadata(&self, type_name: &str) -> Option<&Arc<TypeMetadata>> {
        self.entries.get(type_name).map(|e| &e.metadata)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "metadata_test.rs"]
mod tests;
