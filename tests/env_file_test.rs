//! Integration tests for the env file store
//!
//! These tests verify that:
//! - A missing env file is created from the template with empty values
//! - Updates rewrite only the touched entry and keep everything else byte-for-byte
//! - New variables are appended and survive a reload
//! - Lines keep their own line endings in files that mix LF and CRLF

use orderflow::config::EnvStore;
use orderflow::domain::OrderflowError;
use std::fs;
use tempfile::TempDir;

const TEMPLATE: &str = "\
# Atlas API access
ATLAS_API_PUBLIC_KEY=\"your-public-key\"
ATLAS_API_PRIVATE_KEY=\"your-private-key\"

# Cluster
ATLAS_CLUSTER_NAME=
";

#[test]
fn test_env_file_created_from_template() {
    let dir = TempDir::new().unwrap();
    let env_path = dir.path().join(".env");
    let template_path = dir.path().join("env");
    fs::write(&template_path, TEMPLATE).unwrap();

    let store = EnvStore::load_or_create(&env_path, &template_path).unwrap();

    assert!(env_path.exists());
    assert!(!store.is_set("ATLAS_API_PUBLIC_KEY"));
    assert_eq!(store.get("ATLAS_CLUSTER_NAME"), Some(""));

    let written = fs::read_to_string(&env_path).unwrap();
    assert_eq!(
        written,
        "# Atlas API access\nATLAS_API_PUBLIC_KEY=\"\"\nATLAS_API_PRIVATE_KEY=\"\"\n\n# Cluster\nATLAS_CLUSTER_NAME=\"\"\n"
    );
}

#[test]
fn test_existing_env_file_wins_over_template() {
    let dir = TempDir::new().unwrap();
    let env_path = dir.path().join(".env");
    let template_path = dir.path().join("env");
    fs::write(&env_path, "ATLAS_PROJECT_ID=\"abc\"\n").unwrap();
    fs::write(&template_path, TEMPLATE).unwrap();

    let store = EnvStore::load_or_create(&env_path, &template_path).unwrap();
    assert_eq!(store.value("ATLAS_PROJECT_ID"), Some("abc"));
    assert_eq!(store.get("ATLAS_CLUSTER_NAME"), None);
}

#[test]
fn test_missing_env_file_and_template() {
    let dir = TempDir::new().unwrap();
    let err = EnvStore::load_or_create(dir.path().join(".env"), dir.path().join("env"))
        .unwrap_err();
    assert!(matches!(err, OrderflowError::Configuration(_)));
}

#[test]
fn test_set_preserves_untouched_lines() {
    let dir = TempDir::new().unwrap();
    let env_path = dir.path().join(".env");
    let original = "# keep me\nMONGO_USER = 'demo'  \nMONGO_PASS=\"\"\nexport_weird_line\n";
    fs::write(&env_path, original).unwrap();

    let mut store = EnvStore::load(&env_path).unwrap();
    store.set("MONGO_PASS", "s3cret").unwrap();

    assert_eq!(
        fs::read_to_string(&env_path).unwrap(),
        "# keep me\nMONGO_USER = 'demo'  \nMONGO_PASS=\"s3cret\"\nexport_weird_line\n"
    );
}

#[test]
fn test_set_appends_new_variable() {
    let dir = TempDir::new().unwrap();
    let env_path = dir.path().join(".env");
    fs::write(&env_path, "A=\"1\"").unwrap();

    let mut store = EnvStore::load(&env_path).unwrap();
    store.set("ORDER_SERVICE_URL", "https://ab12.ngrok-free.app").unwrap();

    let reloaded = EnvStore::load(&env_path).unwrap();
    assert_eq!(reloaded.value("A"), Some("1"));
    assert_eq!(
        reloaded.value("ORDER_SERVICE_URL"),
        Some("https://ab12.ngrok-free.app")
    );
    assert_eq!(
        fs::read_to_string(&env_path).unwrap(),
        "A=\"1\"\nORDER_SERVICE_URL=\"https://ab12.ngrok-free.app\"\n"
    );
}

#[test]
fn test_mixed_line_endings_survive_an_update() {
    let dir = TempDir::new().unwrap();
    let env_path = dir.path().join(".env");
    fs::write(&env_path, "A=\"1\"\nB=\"2\"\r\n# note\n").unwrap();

    let mut store = EnvStore::load(&env_path).unwrap();
    assert_eq!(store.value("A"), Some("1"));
    assert_eq!(store.value("B"), Some("2"));

    store.set("A", "10").unwrap();
    store.set("C", "3").unwrap();

    let written = fs::read_to_string(&env_path).unwrap();
    assert_eq!(written, "A=\"10\"\nB=\"2\"\r\n# note\nC=\"3\"\n");
    let reloaded = EnvStore::load(&env_path).unwrap();
    assert_eq!(reloaded.value("B"), Some("2"));
    assert_eq!(reloaded.value("C"), Some("3"));
}
