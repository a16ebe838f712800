// Flat JSON persistence.
//
// Two independently keyed stores (records, keywords), each serialized whole
// on every mutation and read once at startup. Missing or corrupt data
// degrades to an empty collection instead of failing startup; the in-memory
// state owns the data and the store is a passive mirror.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{MemoError, MemoResult};

/// A whole-list JSON file store.
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole list once at startup. Missing file is a first run;
    /// corrupt data is logged and treated as empty.
    pub fn load<T: DeserializeOwned>(&self) -> Vec<T> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("Store {} not found, starting empty", self.path.display());
                return Vec::new();
            }
            Err(e) => {
                warn!(
                    "Failed to read store {}: {}, starting empty",
                    self.path.display(),
                    e
                );
                return Vec::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(list) => list,
            Err(e) => {
                warn!(
                    "Store {} is corrupt ({}), starting empty",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Serialize the whole list. Written to a temp file first so a failed
    /// write never truncates the previous state.
    pub fn save<T: Serialize>(&self, list: &[T]) -> MemoResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| MemoError::persistence(format!("mkdir failed: {}", e)))?;
        }

        let json = serde_json::to_vec_pretty(list)
            .map_err(|e| MemoError::persistence(format!("serialize failed: {}", e)))?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, &json).map_err(|e| {
            MemoError::persistence(format!("write {} failed: {}", tmp_path.display(), e))
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            MemoError::persistence(format!("rename to {} failed: {}", self.path.display(), e))
        })?;
        Ok(())
    }
}

/// Default data directory (`<data_dir>/memo-local`), falling back to the
/// current directory when the platform offers none.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("memo-local")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::TranscriptionRecord;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("records.json"));
        let records: Vec<TranscriptionRecord> = store.load();
        assert!(records.is_empty());
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        fs::write(&path, b"{not json").unwrap();

        let store = JsonStore::new(&path);
        let records: Vec<TranscriptionRecord> = store.load();
        assert!(records.is_empty());
    }

    #[test]
    fn test_save_then_load_whole_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("records.json"));

        let records = vec![
            crate::record::build_record("最初のメモ", chrono::Local::now()),
            crate::record::build_record("二つ目のメモ", chrono::Local::now()),
        ];
        store.save(&records).unwrap();

        let loaded: Vec<TranscriptionRecord> = store.load();
        assert_eq!(loaded, records);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("nested/deeper/keywords.json"));
        store.save::<crate::text::Keyword>(&[]).unwrap();
        assert!(store.path().exists());
    }
}
