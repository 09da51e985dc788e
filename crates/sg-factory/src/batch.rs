//! Type-erased value groups handed to the wiring engine

use crate::synth::Synthesizer;
use sg_core::{CoreError, CoreResult, Identifier, Record, RecordSchema, TypeName};
use sg_db::RowBox;
use std::any::{Any, TypeId};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Operations the engine needs on one group of same-typed records.
pub trait RecordBatch: Send {
    fn record_type(&self) -> TypeId;

    fn type_name(&self) -> &TypeName;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn identifier(&self, index: usize) -> CoreResult<Option<Identifier>>;

    /// A copy of the record at `index`, for foreign-value fields.
    fn clone_record(&self, index: usize) -> Box<dyn Any + Send>;

    fn set_foreign_key(&mut self, index: usize, field: &str, id: Identifier) -> CoreResult<()>;

    fn set_foreign_value(
        &mut self,
        index: usize,
        field: &str,
        value: &dyn Any,
        source: &TypeName,
    ) -> CoreResult<()>;

    /// Fill zero-valued fields of the record at `index`.
    fn synthesize(
        &mut self,
        index: usize,
        synth: &mut dyn Synthesizer,
        omitted: &BTreeSet<&'static str>,
    ) -> CoreResult<()>;

    fn rows(&mut self) -> Vec<RowBox<'_>>;

    /// The owned records as a boxed `Vec<T>`; `None` for borrowed groups.
    fn into_owned(self: Box<Self>) -> Option<Box<dyn Any>>;
}

enum Slots<'a, T> {
    Owned(Vec<T>),
    Borrowed(Vec<&'a mut T>),
}

/// Records of one type, either owned by the build or borrowed from the caller.
pub struct TypedBatch<'a, T> {
    schema: Arc<RecordSchema<T>>,
    slots: Slots<'a, T>,
}

impl<'a, T: Record> TypedBatch<'a, T> {
    pub fn owned(schema: Arc<RecordSchema<T>>, values: Vec<T>) -> Self {
        Self {
            schema,
            slots: Slots::Owned(values),
        }
    }

    pub fn borrowed(schema: Arc<RecordSchema<T>>, values: impl IntoIterator<Item = &'a mut T>) -> Self {
        Self {
            schema,
            slots: Slots::Borrowed(values.into_iter().collect()),
        }
    }

    fn record(&self, index: usize) -> &T {
        match &self.slots {
            Slots::Owned(values) => &values[index],
            Slots::Borrowed(values) => &*values[index],
        }
    }
}

fn record_mut<'s, T>(slots: &'s mut Slots<'_, T>, index: usize) -> &'s mut T {
    match slots {
        Slots::Owned(values) => &mut values[index],
        Slots::Borrowed(values) => &mut *values[index],
    }
}

impl<T: Record> RecordBatch for TypedBatch<'_, T> {
    fn record_type(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn type_name(&self) -> &TypeName {
        self.schema.type_name()
    }

    fn len(&self) -> usize {
        match &self.slots {
            Slots::Owned(values) => values.len(),
            Slots::Borrowed(values) => values.len(),
        }
    }

    fn identifier(&self, index: usize) -> CoreResult<Option<Identifier>> {
        self.schema.identifier(self.record(index))
    }

    fn clone_record(&self, index: usize) -> Box<dyn Any + Send> {
        Box::new(self.record(index).clone())
    }

    fn set_foreign_key(&mut self, index: usize, field: &str, id: Identifier) -> CoreResult<()> {
        self.schema
            .set_foreign_key(record_mut(&mut self.slots, index), field, id)
    }

    fn set_foreign_value(
        &mut self,
        index: usize,
        field: &str,
        value: &dyn Any,
        source: &TypeName,
    ) -> CoreResult<()> {
        self.schema
            .set_foreign_value(record_mut(&mut self.slots, index), field, value, source)
    }

    fn synthesize(
        &mut self,
        index: usize,
        synth: &mut dyn Synthesizer,
        omitted: &BTreeSet<&'static str>,
    ) -> CoreResult<()> {
        let schema = &self.schema;
        let record = record_mut(&mut self.slots, index);
        for field in schema.fields() {
            if field.name() == schema.id_field()
                || !field.is_exported()
                || omitted.contains(field.name())
            {
                continue;
            }
            // References read as None and are never synthesized
            if field.is_zero(record) != Some(true) {
                continue;
            }
            let Some(value) = synth.value_for(schema.type_name(), field.name(), field.kind()) else {
                continue;
            };
            let found = value.describe().to_string();
            if !field.write(record, value) {
                return Err(CoreError::TypeMismatch {
                    type_name: schema.type_name().to_string(),
                    field: field.name().to_string(),
                    expected: field.kind().to_string(),
                    found,
                });
            }
        }
        Ok(())
    }

    fn rows(&mut self) -> Vec<RowBox<'_>> {
        let schema = &*self.schema;
        match &mut self.slots {
            Slots::Owned(values) => values
                .iter_mut()
                .map(|v| Box::new(schema.row(v)) as RowBox<'_>)
                .collect(),
            Slots::Borrowed(values) => values
                .iter_mut()
                .map(|v| Box::new(schema.row(&mut **v)) as RowBox<'_>)
                .collect(),
        }
    }

    fn into_owned(self: Box<Self>) -> Option<Box<dyn Any>> {
        match self.slots {
            Slots::Owned(values) => Some(Box::new(values)),
            Slots::Borrowed(_) => None,
        }
    }
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod tests;
