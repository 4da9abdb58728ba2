use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use phrasedeck_core::storage::memory::projected_size;
use phrasedeck_core::{CoreError, KeyValueStore, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

pub mod paths;

const FILE_VERSION: u32 = 1;
pub const DEFAULT_MAX_BACKUPS: usize = 10;

#[derive(Clone, Serialize, Deserialize)]
struct FileImage {
    version: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    entries: BTreeMap<String, String>,
}

#[derive(Clone)]
struct State {
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    entries: HashMap<String, String>,
}

impl State {
    fn new_empty() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            entries: HashMap::new(),
        }
    }

    fn to_image(&self) -> FileImage {
        FileImage {
            version: FILE_VERSION,
            created_at: self.created_at,
            updated_at: self.updated_at,
            entries: self
                .entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    fn from_image(img: FileImage) -> Self {
        Self {
            created_at: img.created_at,
            updated_at: img.updated_at,
            entries: img.entries.into_iter().collect(),
        }
    }
}

/// Key/value store kept as one JSON document on disk. Every mutation
/// rewrites the file atomically and drops a timestamped copy into the
/// backups directory.
pub struct JsonFileStore {
    path: PathBuf,
    backups_dir: PathBuf,
    max_backups: usize,
    max_bytes: Option<usize>,
    state: RwLock<State>,
}

impl JsonFileStore {
    pub fn open_in(root: &Path) -> Result<Self, CoreError> {
        Self::open_layout(paths::StoreLayout::under(root))
    }

    pub fn open_layout(layout: paths::StoreLayout) -> Result<Self, CoreError> {
        Self::open_with(layout.file, layout.backups, DEFAULT_MAX_BACKUPS)
    }

    pub fn open_with(path: PathBuf, backups_dir: PathBuf, max_backups: usize) -> Result<Self, CoreError> {
        ensure_parent_dirs(&path)?;
        ensure_dir(&backups_dir)?;
        let state = load_or_init(&path)?;
        Ok(Self {
            path,
            backups_dir,
            max_backups: max_backups.max(1),
            max_bytes: None,
            state: RwLock::new(state),
        })
    }

    /// Caps the total size of keys and values, like a browser storage quota.
    pub fn with_quota(mut self, max_bytes: usize) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    fn save(&self) -> Result<(), StoreError> {
        let snapshot = {
            let mut s = self.state.write();
            s.updated_at = Utc::now();
            s.to_image()
        };
        write_with_backup(&self.path, &self.backups_dir, self.max_backups, &snapshot).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "store file not written");
            StoreError::Io(e.to_string())
        })
    }

    /// Puts `key` back to what it held before a write that did not reach disk.
    fn restore(&self, key: &str, previous: Option<String>) {
        let mut s = self.state.write();
        match previous {
            Some(v) => s.entries.insert(key.to_string(), v),
            None => s.entries.remove(key),
        };
    }
}

fn ensure_parent_dirs(path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    Ok(())
}

fn ensure_dir(path: &Path) -> Result<(), CoreError> {
    fs::create_dir_all(path).map_err(|_| CoreError::Storage("io"))
}

fn load_or_init(path: &Path) -> Result<State, CoreError> {
    if !path.exists() {
        return Ok(State::new_empty());
    }
    let buf = fs::read_to_string(path).map_err(|_| CoreError::Storage("io"))?;
    match serde_json::from_str::<FileImage>(&buf) {
        Ok(img) => {
            debug!(path = %path.display(), entries = img.entries.len(), "store opened");
            Ok(State::from_image(img))
        }
        Err(e) => {
            // Keep the unreadable file around and start over.
            let aside = path.with_extension("json.corrupt");
            warn!(path = %path.display(), error = %e, aside = %aside.display(), "store file unreadable; starting empty");
            let _ = fs::rename(path, &aside);
            Ok(State::new_empty())
        }
    }
}

/// Atomically replaces the store file, then drops a backup copy. Only the
/// main file decides success; backup failures are logged.
fn write_with_backup(path: &Path, backups_dir: &Path, max_backups: usize, img: &FileImage) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_vec_pretty(img)?;
    let mut tmp = NamedTempFile::new_in(path.parent().unwrap_or_else(|| Path::new(".")))?;
    tmp.write_all(&json)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;

    if let Err(e) = write_backup(backups_dir, max_backups, &json) {
        warn!(dir = %backups_dir.display(), error = %e, "backup skipped");
    }
    Ok(())
}

fn write_backup(backups_dir: &Path, max_backups: usize, json: &[u8]) -> Result<(), std::io::Error> {
    fs::create_dir_all(backups_dir)?;
    let ts = chrono::Local::now().format("%Y%m%d-%H%M%S%.3f");
    let backup_path = backups_dir.join(format!("phrasedeck-{ts}.json"));
    let mut btmp = NamedTempFile::new_in(backups_dir)?;
    btmp.write_all(json)?;
    btmp.flush()?;
    btmp.persist(&backup_path).map_err(|e| e.error)?;

    rotate_backups(backups_dir, max_backups)
}

fn rotate_backups(dir: &Path, keep: usize) -> Result<(), std::io::Error> {
    let mut entries: Vec<_> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    entries.sort_by_key(|e| (e.metadata().and_then(|m| m.modified()).ok(), e.file_name()));
    if entries.len() > keep {
        for e in &entries[0..entries.len() - keep] {
            let _ = fs::remove_file(e.path());
        }
    }
    Ok(())
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.state.read().entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let previous = {
            let mut s = self.state.write();
            if s.entries.get(key).map(String::as_str) == Some(value) {
                return Ok(());
            }
            if let Some(limit) = self.max_bytes {
                let needed = projected_size(&s.entries, key, value);
                if needed > limit {
                    return Err(StoreError::QuotaExceeded { needed, limit });
                }
            }
            s.entries.insert(key.to_string(), value.to_string())
        };
        if let Err(e) = self.save() {
            self.restore(key, previous);
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let previous = {
            let mut s = self.state.write();
            match s.entries.remove(key) {
                Some(v) => v,
                None => return Ok(()),
            }
        };
        if let Err(e) = self.save() {
            self.restore(key, Some(previous));
            return Err(e);
        }
        Ok(())
    }
}
