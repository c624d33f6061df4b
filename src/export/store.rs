//! Artifact stores
//!
//! Destinations for the opaque blobs a pipeline produces: the serialized
//! model, residuals, cross-validation scores and predictions.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{ForecastError, Result};

/// Keyed blob sink
pub trait ArtifactStore: Send + Sync {
    /// Persist `bytes` under `key`, replacing any previous blob
    fn save(&self, key: &str, bytes: &[u8]) -> Result<()>;
}

/// Store that records nothing but a log line per blob
#[derive(Debug, Clone, Default)]
pub struct LoggingStore;

impl ArtifactStore for LoggingStore {
    fn save(&self, key: &str, bytes: &[u8]) -> Result<()> {
        info!(key, size_bytes = bytes.len(), "Artifact produced");
        Ok(())
    }
}

/// Store writing each blob to `<root>/<key>`
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let plain = !key.is_empty()
            && !key.contains(['/', '\\'])
            && key != "."
            && key != "..";
        if !plain {
            return Err(ForecastError::ConfigError(format!(
                "Invalid artifact key '{}'",
                key
            )));
        }
        Ok(self.root.join(key))
    }
}

impl ArtifactStore for FileStore {
    fn save(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        if !self.root.exists() {
            fs::create_dir_all(&self.root)?;
        }
        fs::write(&path, bytes)?;
        debug!(path = %path.display(), size_bytes = bytes.len(), "Artifact written");
        Ok(())
    }
}

/// In-process store keeping the latest blob per key
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest blob saved under `key`
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.read().get(key).cloned()
    }

    /// Saved keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.blobs.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl ArtifactStore for MemoryStore {
    fn save(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.blobs.write().insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_creates_directory() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("artifacts"));

        store.save("residuals.json", b"[1.0,2.0]").unwrap();
        store.save("residuals.json", b"[3.0]").unwrap();

        let written = fs::read(dir.path().join("artifacts").join("residuals.json")).unwrap();
        assert_eq!(written, b"[3.0]");
    }

    #[test]
    fn test_file_store_rejects_nested_keys() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert!(store.save("../model.bin", b"x").is_err());
        assert!(store.save("", b"x").is_err());
    }

    #[test]
    fn test_memory_store_keeps_latest() {
        let store = MemoryStore::new();
        store.save("model.bin", &[1, 2]).unwrap();
        store.save("model.bin", &[3]).unwrap();
        store.save("cv_scores.json", b"{}").unwrap();

        assert_eq!(store.get("model.bin"), Some(vec![3]));
        assert_eq!(store.keys(), vec!["cv_scores.json", "model.bin"]);
        assert!(LoggingStore.save("anything", &[]).is_ok());
    }
}
