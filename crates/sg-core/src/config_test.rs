use super::*;
use std::io::Write;
use tempfile::TempDir;

#[test]
fn test_parse_empty_config_uses_defaults() {
    let config: Config = serde_yaml::from_str("{}").unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.seed, 1);
    assert_eq!(config.plural_suffix, "s");
    assert_eq!(config.database.db_type, DbType::Memory);
    assert_eq!(config.database.path, ":memory:");
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
seed: 100
plural_suffix: "_rows"
database:
  type: duckdb
  path: "./fixtures.duckdb"
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.seed, 100);
    assert_eq!(config.plural_suffix, "_rows");
    assert_eq!(config.database.db_type, DbType::DuckDb);
    assert_eq!(config.database.path, "./fixtures.duckdb");
}

#[test]
fn test_unknown_field_rejected() {
    let result: Result<Config, _> = serde_yaml::from_str("seeds: 3");
    assert!(result.is_err());
}

#[test]
fn test_load_from_dir() {
    let dir = TempDir::new().unwrap();
    let mut file = std::fs::File::create(dir.path().join("seedgraph.yml")).unwrap();
    writeln!(file, "seed: 7").unwrap();

    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.seed, 7);
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        Config::load_from_dir(dir.path()),
        Err(CoreError::ConfigNotFound { .. })
    ));
}

#[test]
fn test_load_rejects_zero_seed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("seedgraph.yaml");
    std::fs::write(&path, "seed: 0\n").unwrap();
    assert!(matches!(
        Config::load(&path),
        Err(CoreError::ConfigInvalid { .. })
    ));
}

#[test]
fn test_load_malformed_yaml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("seedgraph.yml");
    std::fs::write(&path, "seed: [unclosed\n").unwrap();
    assert!(matches!(Config::load(&path), Err(CoreError::YamlParse(_))));
}

#[test]
fn test_db_type_display() {
    assert_eq!(DbType::DuckDb.to_string(), "duckdb");
    assert_eq!(DbType::Memory.to_string(), "memory");
}
