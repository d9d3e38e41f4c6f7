//! Archive location configuration.
//!
//! # Responsibility
//! - Resolve the one archive file a process works with.
//! - Reject locations that would make the store path ambiguous.
//!
//! # Invariants
//! - `data_dir` is absolute.
//! - `file_name` is a single path component.

use crate::store::ArchiveStore;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// File name used when the caller does not pick one.
pub const DEFAULT_ARCHIVE_FILE_NAME: &str = "library_archive.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyDataDir,
    RelativeDataDir(String),
    InvalidFileName(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDataDir => write!(f, "data_dir cannot be empty"),
            Self::RelativeDataDir(dir) => {
                write!(f, "data_dir must be an absolute path, got `{dir}`")
            }
            Self::InvalidFileName(name) => {
                write!(f, "archive file name must be a single path component, got `{name}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// Where the archive lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveConfig {
    data_dir: PathBuf,
    file_name: String,
}

impl ArchiveConfig {
    /// Builds a config rooted at `data_dir` with the default file name.
    pub fn new(data_dir: &str) -> Result<Self, ConfigError> {
        let trimmed = data_dir.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }
        let path = Path::new(trimmed);
        if !path.is_absolute() {
            return Err(ConfigError::RelativeDataDir(trimmed.to_string()));
        }

        Ok(Self {
            data_dir: path.to_path_buf(),
            file_name: DEFAULT_ARCHIVE_FILE_NAME.to_string(),
        })
    }

    /// Overrides the archive file name.
    pub fn with_file_name(mut self, file_name: &str) -> Result<Self, ConfigError> {
        let trimmed = file_name.trim();
        let is_single_component = !trimmed.is_empty()
            && trimmed != "."
            && trimmed != ".."
            && !trimmed.contains(['/', '\\']);
        if !is_single_component {
            return Err(ConfigError::InvalidFileName(file_name.to_string()));
        }

        self.file_name = trimmed.to_string();
        Ok(self)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn archive_path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }

    /// Filesystem-backed archive store bound to `archive_path()`.
    pub fn open_store(&self) -> ArchiveStore {
        ArchiveStore::new(self.archive_path())
    }
}
