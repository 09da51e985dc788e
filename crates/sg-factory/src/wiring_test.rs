use super::*;
use crate::batch::TypedBatch;
use crate::error::FactoryError;
use crate::synth::NonZeroSynthesizer;
use sg_core::testing::{Alpha, Beta, Category, SubCategory, User};
use sg_core::{CoreError, MetadataCache, Record};
use sg_db::{DbError, MemoryBackend};

fn owned<'a, T: Record>(cache: &mut MetadataCache, values: Vec<T>) -> GraphGroup<Batch<'a>> {
    let reg = cache.register::<T>().unwrap();
    GraphGroup {
        metadata: reg.metadata,
        values: Box::new(TypedBatch::owned(reg.schema, values)),
    }
}

fn borrowed<'a, T: Record>(cache: &mut MetadataCache, values: &'a mut [T]) -> GraphGroup<Batch<'a>> {
    let reg = cache.register::<T>().unwrap();
    GraphGroup {
        metadata: reg.metadata,
        values: Box::new(TypedBatch::borrowed(reg.schema, values.iter_mut())),
    }
}

fn take<T: Record>(root: Vec<Batch<'_>>) -> Vec<T> {
    root.into_iter()
        .flat_map(|b| *b.into_owned().unwrap().downcast::<Vec<T>>().unwrap())
        .collect()
}

#[tokio::test]
async fn test_dependencies_inserted_first_and_wired() {
    let db = MemoryBackend::new();
    let mut cache = MetadataCache::new("s");
    let mut synth = NonZeroSynthesizer::new(1);
    let mut users = vec![User::default()];
    let mut categories = vec![Category::default()];

    let groups = vec![
        borrowed(&mut cache, &mut users),
        borrowed(&mut cache, &mut categories),
        owned(&mut cache, vec![SubCategory::default()]),
    ];
    let root = resolve(groups, &db, &mut synth).await.unwrap();
    let subs = take::<SubCategory>(root);

    assert_eq!(
        db.insert_order().unwrap(),
        vec!["users", "categories", "sub_categorys"]
    );
    assert_eq!(users[0].id, 1);
    assert_eq!(categories[0].user_id, users[0].id);
    assert_eq!(subs[0].category_id, u64::from(categories[0].id));
    assert_eq!(subs[0].user_id, Some(users[0].id));
    assert_eq!(subs[0].category.as_ref(), Some(&categories[0]));
}

#[tokio::test]
async fn test_fan_out_reuses_last_dependency() {
    let db = MemoryBackend::new();
    let mut cache = MetadataCache::new("s");
    let mut synth = NonZeroSynthesizer::new(1);
    let mut users = vec![User::default(), User::default()];

    let groups = vec![
        borrowed(&mut cache, &mut users),
        owned(&mut cache, vec![Category::default(); 4]),
    ];
    let categories = take::<Category>(resolve(groups, &db, &mut synth).await.unwrap());

    let owners: Vec<i64> = categories.iter().map(|c| c.user_id).collect();
    assert_eq!(owners, vec![1, 2, 2, 2]);
}

#[tokio::test]
async fn test_excess_dependencies_are_still_inserted() {
    let db = MemoryBackend::new();
    let mut cache = MetadataCache::new("s");
    let mut synth = NonZeroSynthesizer::new(1);
    let mut users = vec![User::default(), User::default(), User::default()];

    let groups = vec![
        borrowed(&mut cache, &mut users),
        owned(&mut cache, vec![Category::default()]),
    ];
    let categories = take::<Category>(resolve(groups, &db, &mut synth).await.unwrap());

    assert_eq!(categories[0].user_id, 1);
    assert_eq!(db.rows("users").unwrap().len(), 3);
    assert!(users.iter().all(|u| u.id != 0));
}

#[tokio::test]
async fn test_groups_of_one_type_share_positions() {
    let db = MemoryBackend::new();
    let mut cache = MetadataCache::new("s");
    let mut synth = NonZeroSynthesizer::new(1);
    let mut first = vec![User::default()];
    let mut second = vec![User::default()];

    let groups = vec![
        borrowed(&mut cache, &mut first),
        borrowed(&mut cache, &mut second),
        owned(&mut cache, vec![Category::default(); 2]),
    ];
    let categories = take::<Category>(resolve(groups, &db, &mut synth).await.unwrap());

    assert_eq!(categories[0].user_id, first[0].id);
    assert_eq!(categories[1].user_id, second[0].id);
    assert_eq!(db.calls().unwrap()[0].rows, 2);
}

#[tokio::test]
async fn test_cycle_inserts_nothing() {
    let db = MemoryBackend::new();
    let mut cache = MetadataCache::new("s");
    let mut synth = NonZeroSynthesizer::new(1);
    let mut betas = vec![Beta::default()];

    let groups = vec![
        borrowed(&mut cache, &mut betas),
        owned(&mut cache, vec![Alpha::default()]),
    ];
    let Err(err) = resolve(groups, &db, &mut synth).await else {
        panic!("expected an error")
    };

    match err {
        FactoryError::Core(CoreError::CycleDependency { cycle }) => {
            assert!(cycle.contains("Alpha") && cycle.contains("Beta"));
        }
        other => panic!("expected cycle, got {other}"),
    }
    assert!(db.calls().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_insert_stops_the_build() {
    let db = MemoryBackend::new();
    db.fail_on("categories").unwrap();
    let mut cache = MetadataCache::new("s");
    let mut synth = NonZeroSynthesizer::new(1);
    let mut users = vec![User::default()];
    let mut categories = vec![Category::default()];

    let groups = vec![
        borrowed(&mut cache, &mut users),
        borrowed(&mut cache, &mut categories),
        owned(&mut cache, vec![SubCategory::default()]),
    ];
    let Err(err) = resolve(groups, &db, &mut synth).await else {
        panic!("expected an error")
    };

    assert!(matches!(err, FactoryError::Storage(DbError::InsertError { .. })));
    assert_eq!(db.insert_order().unwrap(), vec!["users", "categories"]);
    assert!(db.rows("sub_categorys").unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_node_is_skipped() {
    let db = MemoryBackend::new();
    let mut cache = MetadataCache::new("s");
    let mut synth = NonZeroSynthesizer::new(1);
    let mut users: Vec<User> = Vec::new();

    let groups = vec![
        borrowed(&mut cache, &mut users),
        owned(&mut cache, vec![Category::default()]),
    ];
    let categories = take::<Category>(resolve(groups, &db, &mut synth).await.unwrap());

    assert_eq!(db.insert_order().unwrap(), vec!["categories"]);
    // No user to wire, so the key is synthesized
    assert_ne!(categories[0].user_id, 0);
}

#[tokio::test]
async fn test_preset_foreign_key_is_overwritten_by_wiring() {
    let db = MemoryBackend::new();
    let mut cache = MetadataCache::new("s");
    let mut synth = NonZeroSynthesizer::new(1);
    let mut users = vec![User::default()];

    let preset = Category {
        user_id: 999,
        ..Default::default()
    };
    let groups = vec![
        borrowed(&mut cache, &mut users),
        owned(&mut cache, vec![preset]),
    ];
    let categories = take::<Category>(resolve(groups, &db, &mut synth).await.unwrap());

    assert_eq!(categories[0].user_id, users[0].id);
}
