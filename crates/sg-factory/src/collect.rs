//! Result collection: recover the caller's typed values from the root node

use crate::error::{FactoryError, FactoryResult};
use crate::wiring::Batch;
use sg_core::{CoreError, Record};
use std::any::TypeId;

/// Concatenate the root groups back into `Vec<T>`, keeping positional order.
pub fn collect_root<T: Record>(groups: Vec<Batch<'_>>) -> FactoryResult<Vec<T>> {
    let mut values = Vec::new();
    for group in groups {
        if group.record_type() != TypeId::of::<T>() {
            return Err(conversion::<T>());
        }
        let owned = group.into_owned().ok_or_else(conversion::<T>)?;
        let typed = owned.downcast::<Vec<T>>().map_err(|_| conversion::<T>())?;
        values.extend(*typed);
    }
    Ok(values)
}

fn conversion<T: Record>() -> FactoryError {
    CoreError::Conversion {
        type_name: T::TYPE_NAME.to_string(),
    }
    .into()
}

#[cfg(test)]
#[path = "collect_test.rs"]
mod tests;
