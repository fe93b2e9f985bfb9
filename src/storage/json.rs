use std::{
    fs::{self, OpenOptions, rename, write},
    io::ErrorKind,
    path::{Path, PathBuf},
};

use fs2::FileExt;
use serde_json::to_string_pretty;
use uuid::Uuid;

use crate::{
    models::store::Store,
    storage::{Storage, StorageError},
};

pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the parent directory and an empty store if the file is absent.
    /// Safe to call on every start.
    pub fn ensure_initialized(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| StorageError::InitFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let exists = fs::exists(&self.path).map_err(|e| StorageError::InitFailed {
            path: self.path.clone(),
            source: e,
        })?;
        if exists {
            return Ok(());
        }

        tracing::info!(path = %self.path.display(), "creating empty invoice store");
        self.save(&Store::default())
    }

    fn lock_file_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    /// Renames `temp_path` over the store while holding the lock file
    fn replace_with(&self, temp_path: &Path) -> Result<(), StorageError> {
        let lock_file_path = self.lock_file_path();
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_file_path)
            .map_err(|e| StorageError::SaveFailed {
                path: lock_file_path.clone(),
                source: e,
            })?;
        lock_file
            .lock_exclusive()
            .map_err(|e| StorageError::SaveFailed {
                path: lock_file_path,
                source: e,
            })?;

        rename(temp_path, &self.path).map_err(|e| StorageError::SaveFailed {
            path: self.path.clone(),
            source: e,
        })?;

        lock_file.unlock().map_err(|e| StorageError::SaveFailed {
            path: self.path.clone(),
            source: e,
        })
    }
}

impl Storage for JsonFileStorage {
    fn load(&self) -> Result<Store, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::Missing {
                    path: self.path.clone(),
                });
            }
            Err(e) => {
                return Err(StorageError::LoadFailed {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        let store: Store =
            serde_json::from_str(&content).map_err(|e| StorageError::ParseFailed {
                path: self.path.clone(),
                source: e,
            })?;

        tracing::debug!(
            path = %self.path.display(),
            invoices = store.invoices.len(),
            "loaded store"
        );
        Ok(store)
    }

    fn save(&self, store: &Store) -> Result<(), StorageError> {
        let json =
            to_string_pretty(store).map_err(|e| StorageError::SerializeFailed { source: e })?;

        let unique_temp = format!("{}.tmp.{}", self.path.display(), Uuid::new_v4());
        let temp_path = PathBuf::from(&unique_temp);
        write(&temp_path, json).map_err(|e| StorageError::SaveFailed {
            path: temp_path.clone(),
            source: e,
        })?;

        if let Err(e) = self.replace_with(&temp_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        tracing::debug!(
            path = %self.path.display(),
            invoices = store.invoices.len(),
            "saved store"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil;
    use tempfile::TempDir;

    use crate::models::invoice::{Invoice, InvoiceStatus};

    fn storage_in(dir: &TempDir) -> JsonFileStorage {
        JsonFileStorage::new(dir.path().join("invoices.json"))
    }

    fn sample_invoice() -> Invoice {
        Invoice {
            id: String::from("20250301090507"),
            client_name: String::from("Jane"),
            contact: String::from("jane@x.com"),
            amount: 50.0,
            notes: String::from("Ten sessions"),
            date: civil::date(2025, 3, 1),
            status: InvoiceStatus::Unpaid,
            sent: false,
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);

        let paid = Invoice {
            id: String::from("20250302100000"),
            amount: 72.25,
            status: InvoiceStatus::Paid,
            sent: true,
            ..sample_invoice()
        };
        let store = Store {
            invoices: vec![sample_invoice(), paid],
        };

        if let Err(_) = storage.save(&store) {
            panic!("Should correctly save the store");
        }
        match storage.load() {
            Ok(loaded_store) => assert_eq!(loaded_store, store),
            Err(_) => panic!("Should correctly load the saved store"),
        }
    }

    #[test]
    fn test_save_writes_indented_json() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);

        storage.save(&Store::default()).unwrap();

        let content = fs::read_to_string(storage.path()).unwrap();
        assert_eq!(content, "{\n  \"invoices\": []\n}");
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);

        storage.save(&Store::default()).unwrap();
        storage.save(&Store::default()).unwrap();

        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp."))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_failed_lock_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);
        fs::create_dir(dir.path().join("invoices.lock")).unwrap();

        assert!(matches!(
            storage.save(&Store::default()),
            Err(StorageError::SaveFailed { .. })
        ));

        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp."))
            .count();
        assert_eq!(leftovers, 0);
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_save_load_save_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);
        let store = Store {
            invoices: vec![
                sample_invoice(),
                Invoice {
                    id: String::from("20250302100000"),
                    amount: 0.1,
                    notes: String::from("Line one\nline \"two\""),
                    status: InvoiceStatus::Paid,
                    sent: true,
                    ..sample_invoice()
                },
                Invoice {
                    id: String::from("20250303100000"),
                    amount: -12.5,
                    ..sample_invoice()
                },
                Invoice {
                    id: String::from("20250304100000"),
                    amount: 1e16,
                    ..sample_invoice()
                },
            ],
        };

        storage.save(&store).unwrap();
        let first = fs::read(storage.path()).unwrap();

        let loaded = storage.load().unwrap();
        assert_eq!(loaded, store);
        storage.save(&loaded).unwrap();
        let second = fs::read(storage.path()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);

        match storage.load() {
            Err(StorageError::Missing { path }) => assert_eq!(path, storage.path()),
            _ => panic!("Expected Missing error"),
        }
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);
        fs::write(storage.path(), "{ this is not valid json }").unwrap();

        match storage.load() {
            Err(StorageError::ParseFailed { .. }) => {}
            _ => panic!("Expected ParseFailed error, got something else"),
        }
    }

    #[test]
    fn test_load_wrong_shape() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);
        fs::write(storage.path(), r#"{"invoices": {"id": "1"}}"#).unwrap();

        assert!(matches!(
            storage.load(),
            Err(StorageError::ParseFailed { .. })
        ));
    }

    #[test]
    fn test_ensure_initialized_creates_empty_store() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("nested").join("invoices.json"));

        storage.ensure_initialized().unwrap();

        let store = storage.load().unwrap();
        assert!(store.invoices.is_empty());
    }

    #[test]
    fn test_ensure_initialized_keeps_existing_store() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);
        let store = Store {
            invoices: vec![sample_invoice()],
        };
        storage.save(&store).unwrap();

        storage.ensure_initialized().unwrap();
        storage.ensure_initialized().unwrap();

        assert_eq!(storage.load().unwrap(), store);
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("absent").join("invoices.json"));

        assert!(matches!(
            storage.save(&Store::default()),
            Err(StorageError::SaveFailed { .. })
        ));
    }
}
