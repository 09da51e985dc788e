//! Strongly-typed record type and storage names.

use crate::newtype_string::define_name;
use convert_case::{Case, Casing};

define_name! {
    /// Identity key of a record type within one build (e.g. `"SubCategory"`).
    pub struct TypeName;
}

define_name! {
    /// Name the storage adapter inserts into (a table or collection, e.g. `"sub_categorys"`).
    pub struct StorageName;
}

impl StorageName {
    /// Derive the default storage name for a record type: the snake-cased
    /// type name followed by `plural_suffix`.
    pub fn derive(type_name: &str, plural_suffix: &str) -> Self {
        Self(format!("{}{}", type_name.to_case(Case::Snake), plural_suffix))
    }
}

#[cfg(test)]
#[path = "names_test.rs"]
mod tests;
