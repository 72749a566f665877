use std::collections::HashMap;

use super::*;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn from_lookup_applies_defaults() {
    let cfg = ServerConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/solarcoat")])).unwrap();
    assert_eq!(cfg.database_url, "postgres://localhost/solarcoat");
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.db_max_connections, DEFAULT_DB_MAX_CONNECTIONS);
    assert_eq!(cfg.max_import_bytes, DEFAULT_MAX_IMPORT_BYTES);
    assert!(cfg.catalog_path.is_none());
    assert!(cfg.cors_allow_origin.is_none());
}

#[test]
fn from_lookup_parses_overrides() {
    let cfg = ServerConfig::from_lookup(lookup(&[
        ("DATABASE_URL", "postgres://db/crm"),
        ("PORT", "8080"),
        ("DB_MAX_CONNECTIONS", "12"),
        ("MAX_IMPORT_BYTES", "1024"),
        ("PRODUCT_CATALOG_PATH", "/etc/solarcoat/catalog.yaml"),
        ("CORS_ALLOW_ORIGIN", "https://example.com"),
    ]))
    .unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.db_max_connections, 12);
    assert_eq!(cfg.max_import_bytes, 1024);
    assert_eq!(cfg.catalog_path, Some(PathBuf::from("/etc/solarcoat/catalog.yaml")));
    assert_eq!(cfg.cors_allow_origin, Some(HeaderValue::from_static("https://example.com")));
}

#[test]
fn from_lookup_requires_database_url() {
    let err = ServerConfig::from_lookup(lookup(&[("PORT", "8080")])).unwrap_err();
    assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));

    let blank = ServerConfig::from_lookup(lookup(&[("DATABASE_URL", "  ")])).unwrap_err();
    assert!(matches!(blank, ConfigError::Missing("DATABASE_URL")));
}

#[test]
fn from_lookup_rejects_invalid_port() {
    let err = ServerConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x"), ("PORT", "http")])).unwrap_err();
    match err {
        ConfigError::Invalid { var, value } => {
            assert_eq!(var, "PORT");
            assert_eq!(value, "http");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn from_lookup_treats_wildcard_origin_as_any() {
    let cfg = ServerConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x"), ("CORS_ALLOW_ORIGIN", "*")])).unwrap();
    assert!(cfg.cors_allow_origin.is_none());
}

#[test]
fn from_lookup_rejects_unprintable_origin() {
    let err = ServerConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x"), ("CORS_ALLOW_ORIGIN", "bad\norigin")]))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var: "CORS_ALLOW_ORIGIN", .. }));
}

#[test]
fn load_catalog_defaults_to_builtin() {
    let cfg = ServerConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x")])).unwrap();
    assert_eq!(cfg.load_catalog().unwrap(), estimate::Catalog::builtin());
}

#[test]
fn load_catalog_reports_missing_file() {
    let cfg = ServerConfig::from_lookup(lookup(&[
        ("DATABASE_URL", "postgres://x"),
        ("PRODUCT_CATALOG_PATH", "/nonexistent/solarcoat-catalog.yaml"),
    ]))
    .unwrap();
    assert!(matches!(cfg.load_catalog(), Err(ConfigError::Catalog(_))));
}
