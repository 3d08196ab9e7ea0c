//! Durable client storage for the session token.
//!
//! A single slot holding the raw token string; absence means logged out.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Persistent key-value slot for the bearer token.
pub trait TokenStorage {
    fn load(&self) -> io::Result<Option<String>>;

    fn store(&self, token: &str) -> io::Result<()>;

    /// Remove the persisted token. Clearing an empty slot succeeds.
    fn clear(&self) -> io::Result<()>;
}

/// Token stored as the whole content of one file.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn store(&self, token: &str) -> io::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, token)
    }

    fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

/// In-memory slot. Clones share the same slot, so a test can keep a handle
/// and inspect what the session store persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStorage {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(token.to_string()))),
        }
    }

    /// Current content of the slot.
    pub fn get(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.get())
    }

    fn store(&self, token: &str) -> io::Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_storage_roundtrip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileTokenStorage::new(dir.path().join("nested").join("token"));

        assert_eq!(storage.load().unwrap(), None);
        storage.store("abc.def.ghi").unwrap();
        assert_eq!(storage.load().unwrap().as_deref(), Some("abc.def.ghi"));

        storage.clear().unwrap();
        assert_eq!(storage.load().unwrap(), None);
        storage.clear().unwrap();
    }

    #[test]
    fn file_storage_treats_blank_file_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        fs::write(&path, "  \n").unwrap();
        assert_eq!(FileTokenStorage::new(path).load().unwrap(), None);
    }

    #[test]
    fn file_storage_trims_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        fs::write(&path, "abc.def.ghi\n").unwrap();
        assert_eq!(FileTokenStorage::new(path).load().unwrap().as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn memory_storage_clones_share_slot() {
        let storage = MemoryTokenStorage::new();
        let handle = storage.clone();
        storage.store("t").unwrap();
        assert_eq!(handle.get().as_deref(), Some("t"));
        storage.clear().unwrap();
        assert_eq!(handle.get(), None);
    }
}
