//! File-backed persistence for whole-value storage.
//!
//! # Responsibility
//! - Persist one type-tagged value per file, whole-object in and out.
//! - Provide the archive-specific, type-checked store on top of it.
//! - Own the single error taxonomy shared by both layers.
//!
//! # Invariants
//! - No file handle outlives a single store call.
//! - Failures are never retried or swallowed inside this module.
//! - Concurrent access to the same path is unsupported; no locking is done.
//!
//! # See also
//! - `ObjectStore` for the type-agnostic primitive.
//! - `ArchiveStore` for the `LibraryArchive` wrapper.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub mod archive_store;
mod finite;
pub mod object_store;
pub mod registry;
pub mod stored_value;

pub use archive_store::ArchiveStore;
pub use object_store::{FileObjectStore, ObjectStore};
pub use registry::TypeRegistry;
pub use stored_value::{DowncastError, Storable, StoredValue};

pub type StoreResult<T> = Result<T, StoreError>;

/// Caller-visible failure classification.
///
/// Type mismatches detected by `ArchiveStore` are reported as `Unreadable`;
/// the message is the only thing that tells them apart from corrupt files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// Target file absent on read.
    NotFound,
    /// File present but its content cannot be reconstructed into the
    /// expected value.
    Unreadable,
    /// Target path cannot be created or fully written.
    WriteFailure,
}

impl StoreErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Unreadable => "unreadable",
            Self::WriteFailure => "write_failure",
        }
    }
}

impl Display for StoreErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised by every store operation.
#[derive(Debug)]
pub struct StoreError {
    kind: StoreErrorKind,
    path: PathBuf,
    message: String,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl StoreError {
    pub(crate) fn not_found(path: &Path, source: std::io::Error) -> Self {
        Self {
            kind: StoreErrorKind::NotFound,
            path: path.to_path_buf(),
            message: "file does not exist".to_string(),
            source: Some(Box::new(source)),
        }
    }

    pub(crate) fn unreadable(path: &Path, message: impl Into<String>) -> Self {
        Self {
            kind: StoreErrorKind::Unreadable,
            path: path.to_path_buf(),
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn write_failure(path: &Path, message: impl Into<String>) -> Self {
        Self {
            kind: StoreErrorKind::WriteFailure,
            path: path.to_path_buf(),
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn with_source(mut self, source: impl Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> StoreErrorKind {
        self.kind
    }

    /// Path of the file the failed operation targeted.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Human-readable cause, without the path prefix.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == StoreErrorKind::NotFound
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at `{}`: {}",
            self.kind,
            self.path.display(),
            self.message
        )
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::{StoreError, StoreErrorKind};
    use std::error::Error;
    use std::path::Path;

    #[test]
    fn display_includes_kind_path_and_message() {
        let err = StoreError::unreadable(Path::new("/tmp/a.json"), "truncated payload");
        let rendered = err.to_string();
        assert!(rendered.starts_with("unreadable at `/tmp/a.json`"));
        assert!(rendered.ends_with("truncated payload"));
    }

    #[test]
    fn not_found_exposes_io_source() {
        let io = std::io::Error::from(std::io::ErrorKind::NotFound);
        let err = StoreError::not_found(Path::new("missing.json"), io);
        assert_eq!(err.kind(), StoreErrorKind::NotFound);
        assert!(err.is_not_found());
        assert!(err.source().is_some());
    }

    #[test]
    fn write_failure_has_no_source_until_attached() {
        let err = StoreError::write_failure(Path::new("x"), "no file name");
        assert!(err.source().is_none());
        let err = err.with_source(std::io::Error::other("disk full"));
        assert_eq!(err.kind(), StoreErrorKind::WriteFailure);
        assert!(err.source().is_some());
    }
}
