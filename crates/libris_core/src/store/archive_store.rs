//! Fixed-path, type-checked store for the library archive.
//!
//! # Responsibility
//! - Bind one archive file to one store instance.
//! - Translate untyped reads into `LibraryArchive` or a store error.
//!
//! # Invariants
//! - A value stored under any tag other than `library_archive` is never
//!   returned as an archive; it fails as `Unreadable`.
//! - A missing file is reported as `NotFound`; no default archive is
//!   synthesized here.
//! - Saved archives are not validated at this layer.

use super::{FileObjectStore, ObjectStore, StoreError, StoreResult};
use crate::model::archive::LibraryArchive;
use log::warn;
use std::path::{Path, PathBuf};

/// Archive persistence bound to one file.
#[derive(Debug, Clone)]
pub struct ArchiveStore<S: ObjectStore = FileObjectStore> {
    path: PathBuf,
    store: S,
}

impl ArchiveStore<FileObjectStore> {
    /// Creates a store for `path` backed by the local filesystem, with
    /// `LibraryArchive` registered as a known type.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_store(path, FileObjectStore::new().with_type::<LibraryArchive>())
    }
}

impl<S: ObjectStore> ArchiveStore<S> {
    /// Creates a store for `path` that delegates to `store`.
    ///
    /// `store` must recognize the `library_archive` tag, otherwise every
    /// load and save fails.
    pub fn with_store(path: impl Into<PathBuf>, store: S) -> Self {
        Self {
            path: path.into(),
            store,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the archive stored at this instance's path.
    ///
    /// # Errors
    /// - `NotFound` when the archive file does not exist.
    /// - `Unreadable` when the file is corrupt, holds another type, or holds
    ///   an archive-tagged payload that does not decode.
    pub fn load_archive(&self) -> StoreResult<LibraryArchive> {
        let stored = self.store.read_from_file(&self.path)?;
        let found = stored.type_tag().to_string();

        stored.downcast::<LibraryArchive>().map_err(|err| {
            warn!(
                "event=archive_load module=store status=error error_code={} found_type={}",
                err.code(),
                found
            );
            StoreError::unreadable(&self.path, err.to_string()).with_source(err)
        })
    }

    /// Replaces the archive file with `archive`.
    pub fn save_archive(&self, archive: &LibraryArchive) -> StoreResult<()> {
        self.store.write_to_file(&self.path, archive)
    }
}
