//! [`KeyValueStore`] implementations.
//!
//! - [`MemoryStore`]: lives as long as the process. Serves as session-scoped
//!   storage for terminal hosts and as the fake in tests.
//! - [`FileStore`]: a single JSON object on disk with secure file permissions
//!   (0o600). Serves as durable storage.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::errors::AuthError;
use crate::ports::KeyValueStore;

/// In-memory key/value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AuthError> {
        let _ = self
            .entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        let _ = self.entries.lock().remove(key);
        Ok(())
    }
}

/// Default file name for durable storage.
const STORE_FILE_NAME: &str = "oauth.json";

/// Get the durable store path under the given data directory.
pub fn store_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join(STORE_FILE_NAME)
}

/// Durable key/value store backed by a JSON file.
///
/// Every write rewrites the whole file. A missing, unreadable or corrupt
/// file reads as empty.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStore {
    /// Create a store backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> HashMap<String, String> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "failed to read store file: {e}");
                return HashMap::new();
            }
        };

        serde_json::from_str(&data).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), "failed to parse store file: {e}");
            HashMap::new()
        })
    }

    fn write_entries(&self, entries: &HashMap<String, String>) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(entries)?;

        let mut options = std::fs::OpenOptions::new();
        let _ = options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let _ = options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;

        // mode() only applies when the file is created
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock();
        self.read_entries().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AuthError> {
        let _guard = self.lock.lock();
        let mut entries = self.read_entries();
        let _ = entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        let _guard = self.lock.lock();
        let mut entries = self.read_entries();
        if entries.remove(key).is_none() {
            return Ok(());
        }
        if entries.is_empty() {
            return match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(AuthError::Io(e)),
            };
        }
        self.write_entries(&entries)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
