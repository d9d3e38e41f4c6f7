//! Library domain model.
//!
//! # Responsibility
//! - Define the single aggregate persisted by the archive store.
//! - Keep catalog, user and loan records in one serializable unit.
//!
//! # Invariants
//! - Every record is identified by a stable `ItemId`.
//! - Consistency of the aggregate is checked by `LibraryArchive::validate()`,
//!   never by the persistence layer.

pub mod archive;
