//! Core persistence and domain logic for Libris.
//! This crate owns the library archive and the only file it is stored in.

pub mod config;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use config::{ArchiveConfig, ConfigError, DEFAULT_ARCHIVE_FILE_NAME};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::archive::{
    ArchiveValidationError, Book, ItemId, LibraryArchive, Loan, User, ARCHIVE_TYPE_TAG,
};
pub use service::archive_service::{ArchiveService, ServiceError, ServiceResult};
pub use store::{
    ArchiveStore, DowncastError, FileObjectStore, ObjectStore, Storable, StoreError,
    StoreErrorKind, StoreResult, StoredValue, TypeRegistry,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
