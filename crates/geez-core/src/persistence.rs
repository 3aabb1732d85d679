//! Save/load of the progression snapshot through a key-value store.
//!
//! The snapshot is one JSON blob under a single namespaced key. Only the
//! persisted subset of the state is written; UI fields never reach storage.
//! Every save writes the full snapshot, so there is nothing to retry or
//! merge.

use crate::error::{PersistError, Result};
use geez_logic::progression::Snapshot;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Default key the snapshot is stored under.
pub const STORAGE_KEY: &str = "geez-learn-progress";

/// String blob storage. Implementations decide where blobs live.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-process store. Contents are lost when dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key under a directory.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so a crash mid-save leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(PersistError::Store(format!("invalid key {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let mut temp = NamedTempFile::new_in(&self.dir)?;
        temp.write_all(value.as_bytes())?;
        temp.flush()?;
        temp.persist(&path).map_err(|e| PersistError::Io(e.error))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Serialize and store a snapshot.
pub fn save_snapshot(store: &mut dyn KeyValueStore, key: &str, snapshot: &Snapshot) -> Result<()> {
    let json = serde_json::to_string(snapshot)?;
    store.set(key, &json)
}

/// Read a snapshot. `Ok(None)` when nothing has been saved yet.
pub fn read_snapshot(store: &dyn KeyValueStore, key: &str) -> Result<Option<Snapshot>> {
    match store.get(key)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Startup load: any failure degrades to a cold start.
pub fn load_snapshot(store: &dyn KeyValueStore, key: &str) -> Option<Snapshot> {
    match read_snapshot(store, key) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            log::warn!("ignoring saved progress under {key:?}: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geez_logic::mastery::MasteryRecord;
    use geez_logic::progression::ProgressionState;

    fn sample() -> Snapshot {
        let mut snapshot = ProgressionState::default().snapshot();
        snapshot.xp = 36;
        snapshot.mastery.insert("h".into(), MasteryRecord::new(3, 4));
        snapshot
    }

    #[test]
    fn memory_store_basics() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        store.remove("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn snapshot_roundtrip_through_store() {
        let mut store = MemoryStore::new();
        save_snapshot(&mut store, STORAGE_KEY, &sample()).unwrap();
        let back = read_snapshot(&store, STORAGE_KEY).unwrap();
        assert_eq!(back, Some(sample()));
    }

    #[test]
    fn saved_blob_uses_camel_case_fields() {
        let mut store = MemoryStore::new();
        save_snapshot(&mut store, STORAGE_KEY, &sample()).unwrap();
        let json = store.get(STORAGE_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("bestStreak").is_some());
        assert!(value.get("unlockedIds").is_some());
        assert!(value.get("screen").is_none());
        assert!(value.get("activeConsonantId").is_none());
        assert_eq!(value["mastery"]["h"]["total"], 4);
    }

    #[test]
    fn garbage_blob_loads_as_cold_start() {
        let mut store = MemoryStore::new();
        store.set(STORAGE_KEY, "{not json").unwrap();
        assert!(read_snapshot(&store, STORAGE_KEY).is_err());
        assert_eq!(load_snapshot(&store, STORAGE_KEY), None);
    }

    #[test]
    fn partial_blob_fills_defaults() {
        let mut store = MemoryStore::new();
        store.set(STORAGE_KEY, r#"{"xp":120,"extra":true}"#).unwrap();
        let snapshot = load_snapshot(&store, STORAGE_KEY).unwrap();
        assert_eq!(snapshot.xp, 120);
        assert_eq!(snapshot.unlocked_ids, vec!["h", "l", "hh", "m"]);
    }

    #[test]
    fn file_store_roundtrip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path().join("saves")).unwrap();
        assert_eq!(store.get(STORAGE_KEY).unwrap(), None);
        save_snapshot(&mut store, STORAGE_KEY, &sample()).unwrap();
        assert!(store.dir().join("geez-learn-progress.json").exists());

        let reopened = FileStore::open(store.dir()).unwrap();
        assert_eq!(read_snapshot(&reopened, STORAGE_KEY).unwrap(), Some(sample()));

        store.remove(STORAGE_KEY).unwrap();
        store.remove(STORAGE_KEY).unwrap();
        assert_eq!(store.get(STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn file_store_overwrites_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        store.set("k", "first").unwrap();
        store.set("k", "second").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("second"));
        let files: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        for key in ["", "../escape", "a/b", ".hidden"] {
            assert!(matches!(store.set(key, "x"), Err(PersistError::Store(_))));
        }
    }
}
