//! Field values exchanged between record schemas, the synthesizer, and storage backends.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// A single column value, detached from the Rust field it was read from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
    Uuid(Uuid),
    Bytes(Vec<u8>),
}

impl FieldValue {
    /// Short name of the variant, used in type-mismatch messages.
    pub fn describe(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "bool",
            FieldValue::Int(_) => "signed integer",
            FieldValue::UInt(_) => "unsigned integer",
            FieldValue::Float(_) => "float",
            FieldValue::Text(_) => "text",
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::Uuid(_) => "uuid",
            FieldValue::Bytes(_) => "bytes",
        }
    }
}

/// Static description of a field's Rust type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Text,
    Timestamp,
    Uuid,
    Bytes,
    /// `Option<inner>`
    Optional(Box<FieldKind>),
    /// A copy of another record, named by its type name
    Reference(&'static str),
    /// Adapter-specific type only a storage backend knows how to fill
    Custom(&'static str),
}

impl FieldKind {
    /// Whether values of this kind can hold an identifier (integers, possibly optional).
    pub fn is_integer(&self) -> bool {
        match self {
            FieldKind::I8
            | FieldKind::I16
            | FieldKind::I32
            | FieldKind::I64
            | FieldKind::U8
            | FieldKind::U16
            | FieldKind::U32
            | FieldKind::U64 => true,
            FieldKind::Optional(inner) => inner.is_integer(),
            _ => false,
        }
    }

    /// Target type name if this kind holds a record copy.
    pub fn reference_target(&self) -> Option<&'static str> {
        match self {
            FieldKind::Reference(target) => Some(target),
            FieldKind::Optional(inner) => inner.reference_target(),
            _ => None,
        }
    }

    /// Strip any `Optional` wrappers.
    pub fn base(&self) -> &FieldKind {
        match self {
            FieldKind::Optional(inner) => inner.base(),
            other => other,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Bool => write!(f, "bool"),
            FieldKind::I8 => write!(f, "i8"),
            FieldKind::I16 => write!(f, "i16"),
            FieldKind::I32 => write!(f, "i32"),
            FieldKind::I64 => write!(f, "i64"),
            FieldKind::U8 => write!(f, "u8"),
            FieldKind::U16 => write!(f, "u16"),
            FieldKind::U32 => write!(f, "u32"),
            FieldKind::U64 => write!(f, "u64"),
            FieldKind::F32 => write!(f, "f32"),
            FieldKind::F64 => write!(f, "f64"),
            FieldKind::Text => write!(f, "String"),
            FieldKind::Timestamp => write!(f, "NaiveDateTime"),
            FieldKind::Uuid => write!(f, "Uuid"),
            FieldKind::Bytes => write!(f, "Vec<u8>"),
            FieldKind::Optional(inner) => write!(f, "Option<{inner}>"),
            FieldKind::Reference(target) => write!(f, "{target}"),
            FieldKind::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// A database-assigned record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Identifier {
    Signed(i64),
    Unsigned(u64),
}

impl Identifier {
    /// Read an identifier out of a column value. Zero and null mean "not assigned yet".
    pub fn from_value(value: &FieldValue) -> Option<Self> {
        match *value {
            FieldValue::Int(0) | FieldValue::UInt(0) => None,
            FieldValue::Int(v) => Some(Identifier::Signed(v)),
            FieldValue::UInt(v) => Some(Identifier::Unsigned(v)),
            _ => None,
        }
    }

    pub fn to_value(self) -> FieldValue {
        match self {
            Identifier::Signed(v) => FieldValue::Int(v),
            Identifier::Unsigned(v) => FieldValue::UInt(v),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Signed(v) => write!(f, "{v}"),
            Identifier::Unsigned(v) => write!(f, "{v}"),
        }
    }
}

/// Conversion between a Rust field type and [`FieldValue`].
///
/// `from_value` returns `None` when the value does not fit, including
/// out-of-range integer conversions.
pub trait FieldType: Sized {
    fn kind() -> FieldKind;
    fn to_value(&self) -> FieldValue;
    fn from_value(value: FieldValue) -> Option<Self>;
    fn is_zero(&self) -> bool;
}

macro_rules! impl_signed {
    ($($t:ty => $kind:ident),* $(,)?) => {$(
        impl FieldType for $t {
            fn kind() -> FieldKind { FieldKind::$kind }
            fn to_value(&self) -> FieldValue { FieldValue::Int(i64::from(*self)) }
            fn from_value(value: FieldValue) -> Option<Self> {
                match value {
                    FieldValue::Int(v) => <$t>::try_from(v).ok(),
                    FieldValue::UInt(v) => <$t>::try_from(v).ok(),
                    _ => None,
                }
            }
            fn is_zero(&self) -> bool { *self == 0 }
        }
    )*};
}

macro_rules! impl_unsigned {
    ($($t:ty => $kind:ident),* $(,)?) => {$(
        impl FieldType for $t {
            fn kind() -> FieldKind { FieldKind::$kind }
            fn to_value(&self) -> FieldValue { FieldValue::UInt(u64::from(*self)) }
            fn from_value(value: FieldValue) -> Option<Self> {
                match value {
                    FieldValue::Int(v) => <$t>::try_from(v).ok(),
                    FieldValue::UInt(v) => <$t>::try_from(v).ok(),
                    _ => None,
                }
            }
            fn is_zero(&self) -> bool { *self == 0 }
        }
    )*};
}

impl_signed!(i8 => I8, i16 => I16, i32 => I32, i64 => I64);
impl_unsigned!(u8 => U8, u16 => U16, u32 => U32, u64 => U64);

impl FieldType for bool {
    fn kind() -> FieldKind {
        FieldKind::Bool
    }
    fn to_value(&self) -> FieldValue {
        FieldValue::Bool(*self)
    }
    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Bool(v) => Some(v),
            _ => None,
        }
    }
    fn is_zero(&self) -> bool {
        !*self
    }
}

impl FieldType for f32 {
    fn kind() -> FieldKind {
        FieldKind::F32
    }
    fn to_value(&self) -> FieldValue {
        FieldValue::Float(f64::from(*self))
    }
    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Float(v) => Some(v as f32),
            _ => None,
        }
    }
    fn is_zero(&self) -> bool {
        *self == 0.0
    }
}

impl FieldType for f64 {
    fn kind() -> FieldKind {
        FieldKind::F64
    }
    fn to_value(&self) -> FieldValue {
        FieldValue::Float(*self)
    }
    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Float(v) => Some(v),
            _ => None,
        }
    }
    fn is_zero(&self) -> bool {
        *self == 0.0
    }
}

impl FieldType for String {
    fn kind() -> FieldKind {
        FieldKind::Text
    }
    fn to_value(&self) -> FieldValue {
        FieldValue::Text(self.clone())
    }
    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Text(v) => Some(v),
            _ => None,
        }
    }
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl FieldType for NaiveDateTime {
    fn kind() -> FieldKind {
        FieldKind::Timestamp
    }
    fn to_value(&self) -> FieldValue {
        FieldValue::Timestamp(*self)
    }
    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Timestamp(v) => Some(v),
            _ => None,
        }
    }
    fn is_zero(&self) -> bool {
        *self == NaiveDateTime::default()
    }
}

impl FieldType for Uuid {
    fn kind() -> FieldKind {
        FieldKind::Uuid
    }
    fn to_value(&self) -> FieldValue {
        FieldValue::Uuid(*self)
    }
    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Uuid(v) => Some(v),
            _ => None,
        }
    }
    fn is_zero(&self) -> bool {
        self.is_nil()
    }
}

impl FieldType for Vec<u8> {
    fn kind() -> FieldKind {
        FieldKind::Bytes
    }
    fn to_value(&self) -> FieldValue {
        FieldValue::Bytes(self.clone())
    }
    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Bytes(v) => Some(v),
            _ => None,
        }
    }
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<V: FieldType> FieldType for Option<V> {
    fn kind() -> FieldKind {
        FieldKind::Optional(Box::new(V::kind()))
    }
    fn to_value(&self) -> FieldValue {
        match self {
            Some(v) => v.to_value(),
            None => FieldValue::Null,
        }
    }
    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Null => Some(None),
            other => V::from_value(other).map(Some),
        }
    }
    fn is_zero(&self) -> bool {
        self.is_none()
    }
}

#[cfg(test)]
#[path = "value_test.rs"]
mod tests;
