//! Session storage tests
#![cfg(feature = "native-fs")]

use ingest_wizard::models::{ConnectionConfig, DataSourceKind};
use ingest_wizard::session::{PERSISTED_KEYS, SessionStore};
use ingest_wizard::storage::filesystem::FileSessionStorage;
use ingest_wizard::storage::{SessionStorage, StorageError};
use tempfile::TempDir;

mod file_storage_tests {
    use super::*;

    #[test]
    fn test_missing_file_reads_as_empty() {
        let temp = TempDir::new().unwrap();
        let storage = FileSessionStorage::new(temp.path().join("session.json"));
        assert_eq!(storage.get_item("dataSource").unwrap(), None);
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_set_get_remove() {
        let temp = TempDir::new().unwrap();
        let storage = FileSessionStorage::new(temp.path().join("nested/dir/session.json"));

        storage.set_item("a", "1").unwrap();
        storage.set_item("b", "2").unwrap();
        assert!(storage.path().exists());
        assert_eq!(storage.get_item("a").unwrap().as_deref(), Some("1"));

        storage.remove_item("a").unwrap();
        assert_eq!(storage.get_item("a").unwrap(), None);
        assert_eq!(storage.get_item("b").unwrap().as_deref(), Some("2"));

        // Removing an absent key is not an error
        storage.remove_item("a").unwrap();
    }

    #[test]
    fn test_file_is_a_json_object_of_strings() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("session.json");
        let storage = FileSessionStorage::new(&path);
        storage.set_item("selectedColumns", r#"["id"]"#).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["selectedColumns"], r#"["id"]"#);
    }

    #[test]
    fn test_corrupt_file_is_a_serialization_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let storage = FileSessionStorage::new(&path);
        assert!(matches!(
            storage.get_item("dataSource"),
            Err(StorageError::SerializationError(_))
        ));
    }

    #[test]
    fn test_write_replaces_corrupt_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("session.json");
        std::fs::write(&path, "{{{").unwrap();

        let storage = FileSessionStorage::new(&path);
        storage.set_item("dataSource", "Flat File").unwrap();

        assert_eq!(
            storage.get_item("dataSource").unwrap().as_deref(),
            Some("Flat File")
        );
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(serde_json::from_str::<serde_json::Value>(&content).is_ok());
    }

    #[test]
    fn test_remove_replaces_corrupt_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let storage = FileSessionStorage::new(&path);
        storage.remove_item("dataSource").unwrap();

        assert_eq!(storage.get_item("dataSource").unwrap(), None);
    }

    #[test]
    fn test_empty_file_reads_as_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("session.json");
        std::fs::write(&path, "").unwrap();

        let storage = FileSessionStorage::new(&path);
        assert_eq!(storage.get_item("dataSource").unwrap(), None);
    }
}

mod file_backed_session_tests {
    use super::*;

    #[test]
    fn test_session_survives_restart() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("session.json");
        {
            let mut store = SessionStore::new(FileSessionStorage::new(&path));
            store.set_data_source(DataSourceKind::FlatFile);
            store.set_connection_config(ConnectionConfig::new().with("fileName", "users.csv"));
            store.set_selected_columns(vec!["email_address".to_string()]);
        }

        let store = SessionStore::new(FileSessionStorage::new(&path));
        assert_eq!(store.data_source(), DataSourceKind::FlatFile);
        assert_eq!(store.connection_config().get("fileName"), Some("users.csv"));
        assert_eq!(store.selected_columns(), ["email_address".to_string()]);
    }

    #[test]
    fn test_corrupt_file_degrades_to_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("session.json");
        std::fs::write(&path, "{{{").unwrap();

        let store = SessionStore::new(FileSessionStorage::new(&path));
        assert_eq!(store.data_source(), DataSourceKind::ClickHouse);
        assert!(store.selected_columns().is_empty());
    }

    #[test]
    fn test_corrupt_file_recovers_on_next_change() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("session.json");
        std::fs::write(&path, "{{{").unwrap();
        {
            let mut store = SessionStore::new(FileSessionStorage::new(&path));
            assert_eq!(store.data_source(), DataSourceKind::ClickHouse);
            store.set_data_source(DataSourceKind::FlatFile);
            store.set_connection_config(ConnectionConfig::new().with("fileName", "users.csv"));
        }

        let store = SessionStore::new(FileSessionStorage::new(&path));
        assert_eq!(store.data_source(), DataSourceKind::FlatFile);
        assert_eq!(store.connection_config().get("fileName"), Some("users.csv"));
    }

    #[test]
    fn test_reset_clears_corrupt_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("session.json");
        std::fs::write(&path, "{{{").unwrap();

        let storage = FileSessionStorage::new(&path);
        let mut store = SessionStore::new(storage.clone());
        store.reset_all();

        for key in PERSISTED_KEYS {
            assert_eq!(storage.get_item(key).unwrap(), None);
        }
    }

    #[test]
    fn test_reset_leaves_no_keys_behind() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("session.json");
        let storage = FileSessionStorage::new(&path);
        let mut store = SessionStore::new(storage.clone());
        store.set_data_source(DataSourceKind::FlatFile);
        store.set_selected_columns(vec!["a".to_string()]);

        store.reset_all();

        for key in PERSISTED_KEYS {
            assert_eq!(storage.get_item(key).unwrap(), None);
        }
    }
}
