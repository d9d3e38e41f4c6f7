//! Archive use-case service.
//!
//! # Responsibility
//! - Provide load/save entry points for UI and CLI callers.
//! - Validate the aggregate before it reaches the store.
//! - Offer explicit first-run initialization on a missing archive.
//!
//! # Invariants
//! - Only a `NotFound` load is ever recovered from; corrupt or foreign
//!   files are surfaced and left untouched.
//! - `update` is a load-modify-save sequence with no cross-process
//!   atomicity. Concurrent writers to the same archive are unsupported.

use crate::model::archive::{ArchiveValidationError, LibraryArchive};
use crate::store::{ArchiveStore, FileObjectStore, ObjectStore, StoreError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    Validation(ArchiveValidationError),
    Store(StoreError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "invalid archive: {err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<ArchiveValidationError> for ServiceError {
    fn from(value: ArchiveValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Use-case service over one archive store.
pub struct ArchiveService<S: ObjectStore = FileObjectStore> {
    store: ArchiveStore<S>,
}

impl<S: ObjectStore> ArchiveService<S> {
    pub fn new(store: ArchiveStore<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ArchiveStore<S> {
        &self.store
    }

    /// Loads the archive, returning store errors unchanged.
    pub fn load(&self) -> ServiceResult<LibraryArchive> {
        Ok(self.store.load_archive()?)
    }

    /// Validates and saves `archive`.
    ///
    /// Validation failures block the write; the file keeps its old content.
    pub fn save(&self, archive: &LibraryArchive) -> ServiceResult<()> {
        archive.validate()?;
        self.store.save_archive(archive)?;
        Ok(())
    }

    /// Loads the archive, creating and saving an empty one on first run.
    ///
    /// # Contract
    /// - Only `NotFound` triggers initialization.
    /// - An existing archive is returned as is and never overwritten.
    pub fn load_or_initialize(&self) -> ServiceResult<LibraryArchive> {
        match self.store.load_archive() {
            Ok(archive) => Ok(archive),
            Err(err) if err.is_not_found() => {
                warn!(
                    "event=archive_init module=service status=start reason=not_found path={}",
                    self.store.path().display()
                );
                let archive = LibraryArchive::new();
                self.store.save_archive(&archive)?;
                info!("event=archive_init module=service status=ok");
                Ok(archive)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Loads the archive, applies `mutate`, validates and saves it.
    ///
    /// Nothing is written when `mutate` leaves the archive invalid.
    pub fn update<F, R>(&self, mutate: F) -> ServiceResult<R>
    where
        F: FnOnce(&mut LibraryArchive) -> Result<R, ArchiveValidationError>,
    {
        let mut archive = self.store.load_archive()?;
        let output = mutate(&mut archive)?;
        self.save(&archive)?;
        Ok(output)
    }
}
