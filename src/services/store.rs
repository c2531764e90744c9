//! Persistent day store
//!
//! Keeps every fetched day on disk so the aggregate survives beyond the
//! remote's own reporting window.

use crate::types::{CodetallyError, Result, Store, StoreWarning};
use directories::BaseDirs;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub struct StoreService {
    path: PathBuf,
}

impl StoreService {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `~/.codetally/store.json`
    pub fn default_path() -> Result<PathBuf> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| CodetallyError::Store("Cannot determine home directory".into()))?;
        Ok(base_dirs.home_dir().join(".codetally").join("store.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the store, starting empty when the file is absent or unreadable.
    /// Uses shared file lock for concurrent read safety.
    pub fn load(&self) -> (Store, Option<StoreWarning>) {
        if !self.path.exists() {
            return (Store::default(), None);
        }

        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) => {
                return (
                    Store::default(),
                    Some(StoreWarning::LoadFailed(format!(
                        "Failed to open store: {}",
                        e
                    ))),
                );
            }
        };

        if let Err(e) = file.lock_shared() {
            return (
                Store::default(),
                Some(StoreWarning::LoadFailed(format!(
                    "Failed to acquire read lock: {}",
                    e
                ))),
            );
        }

        let mut content = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut content) {
            let _ = file.unlock();
            return (
                Store::default(),
                Some(StoreWarning::LoadFailed(format!(
                    "Failed to read store: {}",
                    e
                ))),
            );
        }
        let _ = file.unlock();

        match serde_json::from_str::<Store>(&content) {
            Ok(store) => (store, None),
            Err(e) => (
                Store::default(),
                Some(StoreWarning::Corrupted(format!(
                    "Corrupted store file: {}",
                    e
                ))),
            ),
        }
    }

    pub fn save(&self, store: &Store) -> Result<()> {
        let content = serde_json::to_string_pretty(store)
            .map_err(|e| CodetallyError::Store(format!("Serialization failed: {}", e)))?;
        write_atomic(&self.path, content.as_bytes())
    }
}

/// Replace `path` with `content` via temp file + rename, under an exclusive lock.
/// Readers see either the old file or the new one, never a partial write.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let result = replace_via_temp(path, &temp_path, content);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn replace_via_temp(path: &Path, temp_path: &Path, content: &[u8]) -> Result<()> {
    {
        let mut file = File::create(temp_path)
            .map_err(|e| CodetallyError::Store(format!("Failed to create temp file: {}", e)))?;
        file.write_all(content)
            .map_err(|e| CodetallyError::Store(format!("Failed to write temp file: {}", e)))?;
        file.sync_all()
            .map_err(|e| CodetallyError::Store(format!("Failed to sync temp file: {}", e)))?;
    }

    let target = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;

    target
        .lock_exclusive()
        .map_err(|e| CodetallyError::Store(format!("Failed to acquire write lock: {}", e)))?;

    fs::rename(temp_path, path)
        .map_err(|e| CodetallyError::Store(format!("Failed to rename temp file: {}", e)))?;

    let _ = target.unlock();
    Ok(())
}
