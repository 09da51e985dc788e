//! End-to-end scenarios against DuckDB

use sg_core::testing::{Category, SubCategory, User};
use sg_core::{Config, DbType};
use sg_db::{connect, DuckDbBackend};
use sg_factory::Factory;

const SCHEMA: &str = "
CREATE SEQUENCE users_id START 1;
CREATE TABLE users (
    id BIGINT PRIMARY KEY DEFAULT nextval('users_id'),
    name VARCHAR,
    email VARCHAR,
    active BOOLEAN,
    joined_at TIMESTAMP,
    external_ref UUID,
    nickname VARCHAR,
    internal_note VARCHAR
);
CREATE SEQUENCE categories_id START 10;
CREATE TABLE categories (
    id BIGINT PRIMARY KEY DEFAULT nextval('categories_id'),
    title VARCHAR,
    user_id BIGINT
);
CREATE SEQUENCE sub_categorys_id START 100;
CREATE TABLE sub_categorys (
    id BIGINT PRIMARY KEY DEFAULT nextval('sub_categorys_id'),
    label VARCHAR,
    price DOUBLE,
    category_id UBIGINT,
    user_id BIGINT
);
";

fn backend() -> DuckDbBackend {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(SCHEMA).unwrap();
    db
}

// ── Round Trip ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_foreign_keys_match_stored_identifiers() {
    let db = backend();
    let mut factory = Factory::<SubCategory>::new(&Config::default());
    let mut users = vec![User::default(), User::default()];
    let mut categories = vec![Category::default(), Category::default()];

    let subs = factory
        .build_list(3)
        .with_many(&mut users)
        .with_many(&mut categories)
        .insert(&db)
        .await
        .unwrap();

    assert_eq!(users[0].id, 1);
    assert_eq!(categories[0].id, 10);
    assert_eq!(subs[0].id, 100);

    let joined = db
        .query_count(
            "SELECT s.id FROM sub_categorys s \
             JOIN categories c ON s.category_id = c.id \
             JOIN users u ON c.user_id = u.id",
        )
        .unwrap();
    assert_eq!(joined, 3);

    for sub in &subs {
        let stored = db
            .query_i64(&format!(
                "SELECT CAST(category_id AS BIGINT) FROM sub_categorys WHERE id = {}",
                sub.id
            ))
            .unwrap();
        assert_eq!(stored as u64, sub.category_id);
    }
    assert_eq!(
        db.query_count("SELECT * FROM sub_categorys WHERE category_id = 11")
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn test_omitted_and_unexported_columns_stay_empty() {
    let db = backend();
    let mut factory = Factory::<User>::new(&Config::default());

    factory.build().insert(&db).await.unwrap();

    assert_eq!(
        db.query_count("SELECT * FROM users WHERE nickname IS NULL AND internal_note = ''")
            .unwrap(),
        1
    );
}

// ── Config-Driven Connection ────────────────────────────────────────────

#[tokio::test]
async fn test_connect_from_config_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let db_path = dir.path().join("fixtures.duckdb");
    {
        let setup = DuckDbBackend::new(db_path.to_str().unwrap()).unwrap();
        setup.execute_batch(SCHEMA).unwrap();
    }
    std::fs::write(
        dir.path().join("seedgraph.yml"),
        format!(
            "seed: 10\ndatabase:\n  type: duckdb\n  path: {}\n",
            db_path.display()
        ),
    )
    .unwrap();

    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.database.db_type, DbType::DuckDb);

    let category = {
        let db = connect(&config.database).unwrap();
        assert_eq!(db.db_type(), "duckdb");
        let mut factory = Factory::<Category>::new(&config);
        let mut user = User::default();
        let inserted = factory
            .build()
            .with_one(&mut user)
            .insert(&*db)
            .await
            .unwrap();
        inserted
    };

    let check = DuckDbBackend::new(db_path.to_str().unwrap()).unwrap();
    assert_eq!(
        check
            .query_i64(&format!("SELECT user_id FROM categories WHERE id = {}", category.id))
            .unwrap(),
        category.user_id
    );
    assert_eq!(
        check
            .query_count("SELECT * FROM users WHERE name = 'name_10'")
            .unwrap(),
        1
    );
}
