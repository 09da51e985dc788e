//! Non-zero value synthesis

use chrono::{Duration, NaiveDate, NaiveDateTime};
use sg_core::{FieldKind, FieldValue, TypeName};
use sg_db::Database;
use uuid::Uuid;

/// Supplies values for fields still holding their zero value.
pub trait Synthesizer: Send {
    /// A non-zero value for `type_name.field` of `kind`, or `None` to leave
    /// the field untouched.
    fn value_for(&mut self, type_name: &TypeName, field: &str, kind: &FieldKind)
        -> Option<FieldValue>;

    /// Rewind to the initial state so the same sequence is produced again.
    fn reset(&mut self) {}
}

/// Deterministic synthesizer driven by a single counter.
///
/// Every produced value advances the counter, so two factories created
/// with the same seed produce identical fixtures.
#[derive(Debug, Clone)]
pub struct NonZeroSynthesizer {
    seed: u64,
    counter: u64,
}

impl NonZeroSynthesizer {
    pub fn new(seed: u64) -> Self {
        let seed = seed.max(1);
        Self {
            seed,
            counter: seed,
        }
    }

    fn next(&mut self) -> u64 {
        let n = self.counter;
        self.counter = self.counter.wrapping_add(1).max(1);
        n
    }

    fn base_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default()
    }

    fn generate(&mut self, field: &str, kind: &FieldKind) -> Option<FieldValue> {
        // Keeps every integer in 1..=max of its width
        fn bounded(n: u64, max: u64) -> u64 {
            (n - 1) % max + 1
        }

        let value = match kind {
            FieldKind::Bool => FieldValue::Bool(true),
            FieldKind::I8 => FieldValue::Int(bounded(self.next(), i8::MAX as u64) as i64),
            FieldKind::I16 => FieldValue::Int(bounded(self.next(), i16::MAX as u64) as i64),
            FieldKind::I32 => FieldValue::Int(bounded(self.next(), i32::MAX as u64) as i64),
            FieldKind::I64 => FieldValue::Int(bounded(self.next(), i64::MAX as u64) as i64),
            FieldKind::U8 => FieldValue::UInt(bounded(self.next(), u8::MAX as u64)),
            FieldKind::U16 => FieldValue::UInt(bounded(self.next(), u16::MAX as u64)),
            FieldKind::U32 => FieldValue::UInt(bounded(self.next(), u32::MAX as u64)),
            FieldKind::U64 => FieldValue::UInt(self.next()),
            FieldKind::F32 | FieldKind::F64 => FieldValue::Float(self.next() as f64 + 0.5),
            FieldKind::Text => FieldValue::Text(format!("{}_{}", field, self.next())),
            FieldKind::Timestamp => {
                let minutes = bounded(self.next(), 60 * 24 * 365 * 50) as i64;
                FieldValue::Timestamp(Self::base_time() + Duration::minutes(minutes))
            }
            FieldKind::Uuid => {
                let n = self.next();
                FieldValue::Uuid(Uuid::from_u128((u128::from(self.seed) << 64) | u128::from(n)))
            }
            FieldKind::Bytes => {
                let n = self.next();
                FieldValue::Bytes(n.to_le_bytes().into_iter().filter(|b| *b != 0).collect())
            }
            FieldKind::Optional(inner) => return self.generate(field, inner),
            FieldKind::Reference(_) | FieldKind::Custom(_) => return None,
        };
        Some(value)
    }
}

impl Default for NonZeroSynthesizer {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Synthesizer for NonZeroSynthesizer {
    fn value_for(
        &mut self,
        _type_name: &TypeName,
        field: &str,
        kind: &FieldKind,
    ) -> Option<FieldValue> {
        self.generate(field, kind)
    }

    fn reset(&mut self) {
        self.counter = self.seed;
    }
}

/// Consults the storage backend's custom values before the inner synthesizer.
pub(crate) struct BackendOverrides<'s> {
    pub db: &'s dyn Database,
    pub inner: &'s mut dyn Synthesizer,
}

impl Synthesizer for BackendOverrides<'_> {
    fn value_for(
        &mut self,
        type_name: &TypeName,
        field: &str,
        kind: &FieldKind,
    ) -> Option<FieldValue> {
        self.db
            .generate_custom_value(kind)
            .or_else(|| self.inner.value_for(type_name, field, kind))
    }
}

#[cfg(test)]
#[path = "synth_test.rs"]
mod tests;
