use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub const STORE_FILE_NAME: &str = "phrasedeck.json";
pub const BACKUPS_DIR_NAME: &str = "backups";

/// Where the store file and its backups live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    pub file: PathBuf,
    pub backups: PathBuf,
}

impl StoreLayout {
    pub fn under(root: &Path) -> Self {
        Self {
            file: root.join(STORE_FILE_NAME),
            backups: root.join(BACKUPS_DIR_NAME),
        }
    }

    /// Per-user data directory for this platform.
    pub fn user_default() -> Self {
        Self::under(&data_root())
    }
}

/// Local data dir (e.g. `~/.local/share/phrasedeck` on Linux), or the working
/// directory when the platform reports no home.
pub fn data_root() -> PathBuf {
    ProjectDirs::from("com", "phrasedeck", "PhraseDeck")
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}
