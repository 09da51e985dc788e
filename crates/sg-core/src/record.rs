//! Record schemas: per-type tables of typed field accessors.
//!
//! A record type describes itself once through [`Record::schema`]. The
//! schema holds getter and setter closures for every field, so the wiring
//! engine and storage backends can read and write fields named by tags
//! without runtime reflection.

use crate::error::{CoreError, CoreResult};
use crate::names::{StorageName, TypeName};
use crate::value::{FieldKind, FieldType, FieldValue, Identifier};
use std::any::Any;
use std::collections::HashMap;

/// A struct whose instances are built and inserted as fixtures.
pub trait Record: Clone + Send + Sync + 'static {
    /// Identity of the type within a build.
    const TYPE_NAME: &'static str;

    /// Describe the fields of this type.
    fn schema() -> RecordSchema<Self>;
}

type ReadFn<T> = Box<dyn Fn(&T) -> FieldValue + Send + Sync>;
type WriteFn<T> = Box<dyn Fn(&mut T, FieldValue) -> bool + Send + Sync>;
type ZeroFn<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;
type AssignFn<T> = Box<dyn Fn(&mut T, &dyn Any) -> bool + Send + Sync>;

enum Access<T> {
    Column {
        read: ReadFn<T>,
        write: WriteFn<T>,
        is_zero: ZeroFn<T>,
    },
    Reference {
        assign: AssignFn<T>,
    },
}

/// One entry of a record schema.
pub struct Field<T> {
    name: &'static str,
    kind: FieldKind,
    tag: Option<&'static str>,
    exported: bool,
    access: Access<T>,
}

impl<T: 'static> Field<T> {
    /// A storage column backed by a Rust field of type `V`.
    pub fn column<V: FieldType + 'static>(
        name: &'static str,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> Self {
        Self {
            name,
            kind: V::kind(),
            tag: None,
            exported: true,
            access: Access::Column {
                read: Box::new(move |record| get(record).to_value()),
                write: Box::new(move |record, value| match V::from_value(value) {
                    Some(v) => {
                        *get_mut(record) = v;
                        true
                    }
                    None => false,
                }),
                is_zero: Box::new(move |record| get(record).is_zero()),
            },
        }
    }

    /// An optional copy of another record, filled when a foreign key to `P` is wired.
    pub fn reference<P: Record>(name: &'static str, get_mut: fn(&mut T) -> &mut Option<P>) -> Self {
        Self {
            name,
            kind: FieldKind::Optional(Box::new(FieldKind::Reference(P::TYPE_NAME))),
            tag: None,
            exported: true,
            access: Access::Reference {
                assign: Box::new(move |record, value| match value.downcast_ref::<P>() {
                    Some(parent) => {
                        *get_mut(record) = Some(parent.clone());
                        true
                    }
                    None => false,
                }),
            },
        }
    }

    /// A required copy of another record.
    pub fn embedded<P: Record>(name: &'static str, get_mut: fn(&mut T) -> &mut P) -> Self {
        Self {
            name,
            kind: FieldKind::Reference(P::TYPE_NAME),
            tag: None,
            exported: true,
            access: Access::Reference {
                assign: Box::new(move |record, value| match value.downcast_ref::<P>() {
                    Some(parent) => {
                        *get_mut(record) = parent.clone();
                        true
                    }
                    None => false,
                }),
            },
        }
    }

    /// Attach a declarative tag (see [`crate::tag`]).
    pub fn tag(mut self, tag: &'static str) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Hide the field from automatic population and key wiring.
    pub fn unexported(mut self) -> Self {
        self.exported = false;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn is_exported(&self) -> bool {
        self.exported
    }

    pub fn is_reference(&self) -> bool {
        matches!(self.access, Access::Reference { .. })
    }

    /// Current column value; `None` for reference fields.
    pub fn read(&self, record: &T) -> Option<FieldValue> {
        match &self.access {
            Access::Column { read, .. } => Some(read(record)),
            Access::Reference { .. } => None,
        }
    }

    /// Whether the column still holds its zero value; `None` for reference fields.
    pub fn is_zero(&self, record: &T) -> Option<bool> {
        match &self.access {
            Access::Column { is_zero, .. } => Some(is_zero(record)),
            Access::Reference { .. } => None,
        }
    }

    /// Write a column value, returning `false` when the value does not fit.
    pub fn write(&self, record: &mut T, value: FieldValue) -> bool {
        match &self.access {
            Access::Column { write, .. } => write(record, value),
            Access::Reference { .. } => false,
        }
    }

    fn descriptor(&self) -> FieldDescriptor {
        FieldDescriptor {
            name: self.name,
            kind: self.kind.clone(),
            tag: self.tag,
            exported: self.exported,
        }
    }
}

/// Type-erased description of one field, consumed by the metadata extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
    pub tag: Option<&'static str>,
    pub exported: bool,
}

/// Type-erased description of a record type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    pub type_name: TypeName,
    pub id_field: &'static str,
    pub storage: Option<StorageName>,
    pub fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Accessor table for one record type.
pub struct RecordSchema<T> {
    type_name: TypeName,
    id_field: &'static str,
    storage: Option<StorageName>,
    fields: Vec<Field<T>>,
    index: HashMap<&'static str, usize>,
}

impl<T: Record> RecordSchema<T> {
    /// Start a schema whose identifier lives in `id_field`.
    pub fn new(id_field: &'static str) -> Self {
        Self {
            type_name: TypeName::from_static(T::TYPE_NAME),
            id_field,
            storage: None,
            fields: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Override the derived storage name.
    pub fn storage(mut self, name: &'static str) -> Self {
        self.storage = Some(StorageName::from_static(name));
        self
    }

    pub fn field(mut self, field: Field<T>) -> Self {
        self.index.insert(field.name, self.fields.len());
        self.fields.push(field);
        self
    }

    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    pub fn id_field(&self) -> &'static str {
        self.id_field
    }

    pub fn fields(&self) -> &[Field<T>] {
        &self.fields
    }

    pub fn storage_override(&self) -> Option<&StorageName> {
        self.storage.as_ref()
    }

    pub fn descriptor(&self) -> TypeDescriptor {
        TypeDescriptor {
            type_name: self.type_name.clone(),
            id_field: self.id_field,
            storage: self.storage.clone(),
            fields: self.fields.iter().map(Field::descriptor).collect(),
        }
    }

    pub fn field_named(&self, name: &str) -> CoreResult<&Field<T>> {
        self.index
            .get(name)
            .map(|&idx| &self.fields[idx])
            .ok_or_else(|| CoreError::FieldNotFound {
                type_name: self.type_name.to_string(),
                field: name.to_string(),
            })
    }

    fn id_column(&self) -> CoreResult<&Field<T>> {
        let field = self.field_named(self.id_field)?;
        if !field.kind.is_integer() {
            return Err(CoreError::NotAnInteger {
                type_name: self.type_name.to_string(),
                field: self.id_field.to_string(),
                found: field.kind.to_string(),
            });
        }
        Ok(field)
    }

    /// The identifier of `record`, or `None` if it has not been assigned.
    pub fn identifier(&self, record: &T) -> CoreResult<Option<Identifier>> {
        let field = self.id_column()?;
        Ok(field.read(record).and_then(|v| Identifier::from_value(&v)))
    }

    pub fn assign_identifier(&self, record: &mut T, id: Identifier) -> CoreResult<()> {
        let field = self.id_column()?;
        self.write_integer(field, record, id)
    }

    /// Set a foreign-key column to a dependency's identifier.
    pub fn set_foreign_key(&self, record: &mut T, field: &str, id: Identifier) -> CoreResult<()> {
        let field = self.field_named(field)?;
        if !field.exported {
            return Err(CoreError::FieldNotSettable {
                type_name: self.type_name.to_string(),
                field: field.name.to_string(),
            });
        }
        if !field.kind.is_integer() {
            return Err(CoreError::NotAnInteger {
                type_name: self.type_name.to_string(),
                field: field.name.to_string(),
                found: field.kind.to_string(),
            });
        }
        self.write_integer(field, record, id)
    }

    /// Copy a dependency record into a reference field.
    pub fn set_foreign_value(
        &self,
        record: &mut T,
        field: &str,
        value: &dyn Any,
        source: &TypeName,
    ) -> CoreResult<()> {
        let field = self.field_named(field)?;
        if !field.exported {
            return Err(CoreError::FieldNotSettable {
                type_name: self.type_name.to_string(),
                field: field.name.to_string(),
            });
        }
        let assigned = match &field.access {
            Access::Reference { assign } => assign(record, value),
            Access::Column { .. } => false,
        };
        if assigned {
            Ok(())
        } else {
            Err(CoreError::TypeMismatch {
                type_name: self.type_name.to_string(),
                field: field.name.to_string(),
                expected: field.kind.to_string(),
                found: source.to_string(),
            })
        }
    }

    fn write_integer(&self, field: &Field<T>, record: &mut T, id: Identifier) -> CoreResult<()> {
        let value = id.to_value();
        let found = format!("{} {}", value.describe(), id);
        if field.write(record, value) {
            Ok(())
        } else {
            Err(CoreError::TypeMismatch {
                type_name: self.type_name.to_string(),
                field: field.name.to_string(),
                expected: field.kind.to_string(),
                found,
            })
        }
    }

    /// All column values of `record`, in declaration order.
    pub fn columns(&self, record: &T) -> Vec<(&'static str, FieldValue)> {
        self.fields
            .iter()
            .filter_map(|f| f.read(record).map(|v| (f.name, v)))
            .collect()
    }

    pub fn row<'a>(&'a self, record: &'a mut T) -> RecordRow<'a, T> {
        RecordRow {
            schema: self,
            record,
        }
    }
}

/// The view of a record a storage backend works with.
pub trait Row: Send {
    fn type_name(&self) -> &TypeName;

    fn id_column(&self) -> &'static str;

    fn identifier(&self) -> CoreResult<Option<Identifier>>;

    fn columns(&self) -> Vec<(&'static str, FieldValue)>;

    fn assign_identifier(&mut self, id: Identifier) -> CoreResult<()>;
}

/// A record borrowed together with its schema.
pub struct RecordRow<'a, T> {
    schema: &'a RecordSchema<T>,
    record: &'a mut T,
}

impl<T: Record> Row for RecordRow<'_, T> {
    fn type_name(&self) -> &TypeName {
        self.schema.type_name()
    }

    fn id_column(&self) -> &'static str {
        self.schema.id_field()
    }

    fn identifier(&self) -> CoreResult<Option<Identifier>> {
        self.schema.identifier(&*self.record)
    }

    fn columns(&self) -> Vec<(&'static str, FieldValue)> {
        self.schema.columns(&*self.record)
    }

    fn assign_identifier(&mut self, id: Identifier) -> CoreResult<()> {
        self.schema.assign_identifier(&mut *self.record, id)
    }
}

/// Build a column [`Field`] for `self.$name`, optionally tagged.
///
/// ```ignore
/// RecordSchema::new("id")
///     .field(field!(id))
///     .field(field!(user_id, "foreignKey,struct:User"))
/// ```
#[macro_export]
macro_rules! field {
    ($name:ident) => {
        $crate::record::Field::column(
            stringify!($name),
            |r: &Self| &r.$name,
            |r: &mut Self| &mut r.$name,
        )
    };
    ($name:ident, $tag:expr) => {
        $crate::field!($name).tag($tag)
    };
}

/// Build an optional reference [`Field`] for `self.$name: Option<P>`.
#[macro_export]
macro_rules! reference {
    ($name:ident) => {
        $crate::record::Field::reference(stringify!($name), |r: &mut Self| &mut r.$name)
    };
}

#[cfg(test)]
#[path = "record_test.rs"]
mod tests;
