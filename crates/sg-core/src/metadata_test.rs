use super::*;
use crate::record::{FieldDescriptor, Record, RecordSchema};
use crate::testing::{Category, SubCategory, User};
use crate::value::FieldKind;
use crate::{field, reference};

fn descriptor(fields: Vec<FieldDescriptor>) -> TypeDescriptor {
    TypeDescriptor {
        type_name: TypeName::from_static("Post"),
        id_field: "id",
        storage: None,
        fields,
    }
}

fn column(name: &'static str, kind: FieldKind, tag: Option<&'static str>) -> FieldDescriptor {
    FieldDescriptor {
        name,
        kind,
        tag,
        exported: true,
    }
}

#[test]
fn test_extract_no_dependencies() {
    let meta = extract(&User::schema().descriptor(), "s").unwrap();
    assert_eq!(meta.type_name, "User");
    assert_eq!(meta.storage_name, "users");
    assert!(meta.dependencies().is_empty());
    assert!(meta.is_omitted("nickname"));
}

#[test]
fn test_extract_default_and_explicit_storage() {
    let meta = extract(&SubCategory::schema().descriptor(), "s").unwrap();
    assert_eq!(meta.storage_name, "sub_categorys");

    let category = meta.dependency("Category").unwrap();
    assert_eq!(category.target_storage, "categories");
    assert_eq!(category.foreign_key_field, "category_id");
    assert_eq!(category.foreign_value_field, Some("category"));

    let user = meta.dependency("User").unwrap();
    assert_eq!(user.target_storage, "users");
    assert_eq!(user.foreign_value_field, None);
}

#[test]
fn test_extract_rejects_unexported_foreign_key() {
    let mut fk = column("user_id", FieldKind::I64, Some("foreignKey,struct:User"));
    fk.exported = false;
    let desc = descriptor(vec![column("id", FieldKind::I64, None), fk]);

    let err = extract(&desc, "s").unwrap_err();
    assert!(matches!(
        err,
        CoreError::FieldNotSettable { ref field, .. } if field == "user_id"
    ));
}

#[test]
fn test_extract_allows_unexported_omitted_foreign_key() {
    let mut fk = column("user_id", FieldKind::I64, Some("omit,foreignKey,struct:User"));
    fk.exported = false;
    let desc = descriptor(vec![column("id", FieldKind::I64, None), fk]);

    let meta = extract(&desc, "s").unwrap();
    assert!(meta.dependency("User").unwrap().omitted);
}

#[test]
fn test_extract_rejects_unexported_foreign_value_field() {
    let mut value = column(
        "owner",
        FieldKind::Optional(Box::new(FieldKind::Reference("User"))),
        None,
    );
    value.exported = false;
    let desc = descriptor(vec![
        column("id", FieldKind::I64, None),
        column("user_id", FieldKind::I64, Some("foreignKey,struct:User,field:owner")),
        value,
    ]);

    let err = extract(&desc, "s").unwrap_err();
    assert!(matches!(
        err,
        CoreError::FieldNotSettable { ref field, .. } if field == "owner"
    ));
}

#[test]
fn test_extract_keeps_declaration_order() {
    let meta = extract(&SubCategory::schema().descriptor(), "s").unwrap();
    let targets: Vec<_> = meta
        .dependencies()
        .iter()
        .map(|d| d.target_type.as_str())
        .collect();
    assert_eq!(targets, vec!["Category", "User"]);
}

#[test]
fn test_extract_schema_storage_override() {
    let meta = extract(&Category::schema().descriptor(), "s").unwrap();
    assert_eq!(meta.storage_name, "categories");
}

#[test]
fn test_extract_is_idempotent() {
    let desc = SubCategory::schema().descriptor();
    assert_eq!(extract(&desc, "s").unwrap(), extract(&desc, "s").unwrap());
}

#[test]
fn test_extract_rejects_two_keys_to_same_type() {
    let desc = descriptor(vec![
        column("id", FieldKind::I64, None),
        column("author_id", FieldKind::I64, Some("foreignKey,struct:User")),
        column("editor_id", FieldKind::I64, Some("foreignKey,struct:User")),
    ]);
    match extract(&desc, "s").unwrap_err() {
        CoreError::AmbiguousDependency {
            target,
            first,
            second,
            ..
        } => {
            assert_eq!(target, "User");
            assert_eq!(first, "author_id");
            assert_eq!(second, "editor_id");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_extract_non_integer_foreign_key() {
    let desc = descriptor(vec![
        column("id", FieldKind::I64, None),
        column("author", FieldKind::Text, Some("foreignKey,struct:User")),
    ]);
    assert!(matches!(
        extract(&desc, "s"),
        Err(CoreError::NotAnInteger { .. })
    ));
}

#[test]
fn test_extract_non_integer_identifier() {
    let desc = descriptor(vec![column("id", FieldKind::Text, None)]);
    assert!(matches!(
        extract(&desc, "s"),
        Err(CoreError::NotAnInteger { .. })
    ));
}

#[test]
fn test_extract_missing_identifier() {
    let desc = descriptor(vec![column("key", FieldKind::I64, None)]);
    assert!(matches!(
        extract(&desc, "s"),
        Err(CoreError::FieldNotFound { .. })
    ));
}

#[test]
fn test_extract_foreign_value_field_missing() {
    let desc = descriptor(vec![
        column("id", FieldKind::I64, None),
        column(
            "author_id",
            FieldKind::I64,
            Some("foreignKey,struct:User,field:author"),
        ),
    ]);
    assert!(matches!(
        extract(&desc, "s"),
        Err(CoreError::FieldNotFound { .. })
    ));
}

#[test]
fn test_extract_foreign_value_field_wrong_type() {
    let desc = descriptor(vec![
        column("id", FieldKind::I64, None),
        column(
            "author_id",
            FieldKind::I64,
            Some("foreignKey,struct:User,field:author"),
        ),
        column(
            "author",
            FieldKind::Optional(Box::new(FieldKind::Reference("Admin"))),
            None,
        ),
    ]);
    assert!(matches!(
        extract(&desc, "s"),
        Err(CoreError::TypeMismatch { .. })
    ));
}

#[test]
fn test_extract_omitted_foreign_key() {
    let desc = descriptor(vec![
        column("id", FieldKind::I64, None),
        column("author_id", FieldKind::I64, Some("omit,foreignKey,struct:User")),
    ]);
    let meta = extract(&desc, "s").unwrap();
    assert!(meta.dependency("User").unwrap().omitted);
    assert!(meta.is_omitted("author_id"));
}

#[test]
fn test_extract_tag_error_propagates() {
    let desc = descriptor(vec![
        column("id", FieldKind::I64, None),
        column("author_id", FieldKind::I64, Some("foreignKey")),
    ]);
    assert!(matches!(
        extract(&desc, "s"),
        Err(CoreError::TagFormat { .. })
    ));
}

#[test]
fn test_cache_parses_once() {
    let mut cache = MetadataCache::new("s");
    let first = cache.register::<SubCategory>().unwrap();
    let second = cache.register::<SubCategory>().unwrap();
    assert!(Arc::ptr_eq(&first.metadata, &second.metadata));
    assert!(Arc::ptr_eq(&first.schema, &second.schema));
    assert_eq!(cache.len(), 1);
}

#[derive(Debug, Clone, Default)]
struct Impostor {
    id: i64,
}

impl Record for Impostor {
    const TYPE_NAME: &'static str = "User";

    fn schema() -> RecordSchema<Self> {
        RecordSchema::new("id").field(field!(id))
    }
}

#[test]
fn test_cache_rejects_name_collision() {
    let mut cache = MetadataCache::new("s");
    cache.register::<User>().unwrap();
    assert!(matches!(
        cache.register::<Impostor>(),
        Err(CoreError::ValueTypeMismatch { .. })
    ));
}

#[derive(Debug, Clone, Default)]
struct Review {
    id: i64,
    product_id: i64,
    product: Option<Category>,
}

impl Record for Review {
    const TYPE_NAME: &'static str = "Review";

    fn schema() -> RecordSchema<Self> {
        RecordSchema::new("id")
            .field(field!(id))
            .field(field!(product_id, "foreignKey,struct:Category,field:product"))
            .field(reference!(product))
    }
}

#[test]
fn test_cache_uses_configured_suffix() {
    let mut cache = MetadataCache::new("_rows");
    let review = cache.register::<Review>().unwrap();
    assert_eq!(review.metadata.storage_name, "review_rows");
    assert_eq!(
        review.metadata.dependency("Category").unwrap().target_storage,
        "category_rows"
    );
    assert!(cache.metadata("Review").is_some());
}
