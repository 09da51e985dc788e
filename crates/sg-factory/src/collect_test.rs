use super::*;
use crate::batch::TypedBatch;
use crate::error::FactoryError;
use sg_core::testing::{Category, User};
use std::sync::Arc;

#[test]
fn test_collects_in_order() {
    let users = vec![
        User {
            id: 1,
            ..Default::default()
        },
        User {
            id: 2,
            ..Default::default()
        },
    ];
    let groups: Vec<Batch<'_>> = vec![Box::new(TypedBatch::owned(
        Arc::new(User::schema()),
        users.clone(),
    ))];

    assert_eq!(collect_root::<User>(groups).unwrap(), users);
}

#[test]
fn test_wrong_type_is_a_conversion_error() {
    let groups: Vec<Batch<'_>> = vec![Box::new(TypedBatch::owned(
        Arc::new(Category::schema()),
        vec![Category::default()],
    ))];

    let err = collect_root::<User>(groups).unwrap_err();
    assert!(matches!(
        err,
        FactoryError::Core(CoreError::Conversion { ref type_name }) if type_name == "User"
    ));
}

#[test]
fn test_borrowed_root_is_a_conversion_error() {
    let mut users = vec![User::default()];
    let groups: Vec<Batch<'_>> = vec![Box::new(TypedBatch::borrowed(
        Arc::new(User::schema()),
        users.iter_mut(),
    ))];

    assert!(collect_root::<User>(groups).is_err());
}
