//! Like counts keyed by news item id.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading or writing a like store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("Like store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not a valid like map.
    #[error("Like store is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistent like counts. Writes replace the stored value.
pub trait LikeStore {
    /// Stored count for `id`, if any.
    fn get(&self, id: u32) -> Result<Option<u32>, StoreError>;

    /// Store `likes` for `id`, replacing any previous value.
    fn upsert(&mut self, id: u32, likes: u32) -> Result<(), StoreError>;

    /// Stored count for `id`, 0 if absent.
    fn likes(&self, id: u32) -> Result<u32, StoreError> {
        Ok(self.get(id)?.unwrap_or(0))
    }
}

/// Like counts held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryLikeStore {
    likes: BTreeMap<u32, u32>,
}

impl MemoryLikeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.likes.len()
    }

    /// Whether nothing is stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.likes.is_empty()
    }
}

impl LikeStore for MemoryLikeStore {
    fn get(&self, id: u32) -> Result<Option<u32>, StoreError> {
        Ok(self.likes.get(&id).copied())
    }

    fn upsert(&mut self, id: u32, likes: u32) -> Result<(), StoreError> {
        self.likes.insert(id, likes);
        Ok(())
    }
}

/// Like counts in a JSON file, rewritten on every upsert.
#[derive(Debug, Clone)]
pub struct JsonLikeStore {
    path: PathBuf,
    likes: BTreeMap<u32, u32>,
}

impl JsonLikeStore {
    /// Open `path`. A missing file is an empty store; it is created on the
    /// first upsert.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let likes = match std::fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No like store at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, likes })
    }

    /// The backing file.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.likes)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl LikeStore for JsonLikeStore {
    fn get(&self, id: u32) -> Result<Option<u32>, StoreError> {
        Ok(self.likes.get(&id).copied())
    }

    fn upsert(&mut self, id: u32, likes: u32) -> Result<(), StoreError> {
        let previous = self.likes.insert(id, likes);
        if let Err(err) = self.save() {
            // Keep memory in step with the file.
            match previous {
                Some(previous) => self.likes.insert(id, previous),
                None => self.likes.remove(&id),
            };
            return Err(err);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("orrery-{name}-{}.json", std::process::id()))
    }

    #[test]
    fn test_memory_store_replaces() {
        let mut store = MemoryLikeStore::new();
        assert_eq!(store.get(3).unwrap(), None);
        assert_eq!(store.likes(3).unwrap(), 0);

        store.upsert(3, 5).unwrap();
        store.upsert(3, 2).unwrap();
        assert_eq!(store.get(3).unwrap(), Some(2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_json_store_survives_reopen() {
        let path = temp_path("likes-reopen");
        let _ = std::fs::remove_file(&path);

        let mut store = JsonLikeStore::open(&path).unwrap();
        assert_eq!(store.likes(1).unwrap(), 0);
        store.upsert(1, 4).unwrap();
        store.upsert(7, 1).unwrap();
        store.upsert(1, 5).unwrap();
        drop(store);

        let store = JsonLikeStore::open(&path).unwrap();
        assert_eq!(store.get(1).unwrap(), Some(5));
        assert_eq!(store.get(7).unwrap(), Some(1));
        assert_eq!(store.get(2).unwrap(), None);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_corrupt_json_is_an_error() {
        let path = temp_path("likes-corrupt");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(JsonLikeStore::open(&path), Err(StoreError::Json(_))));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_failed_write_keeps_old_value() {
        let path = std::env::temp_dir()
            .join(format!("orrery-missing-dir-{}", std::process::id()))
            .join("likes.json");
        let mut store = JsonLikeStore::open(&path).unwrap();
        assert!(matches!(store.upsert(1, 1), Err(StoreError::Io(_))));
        assert_eq!(store.get(1).unwrap(), None);
    }
}
