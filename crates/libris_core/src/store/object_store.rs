//! Type-agnostic whole-value file store.
//!
//! # Responsibility
//! - Write any `Storable` value as one JSON document per file.
//! - Read a file back as a `StoredValue` with its type tag preserved.
//!
//! # Invariants
//! - Writes go through a sibling temp file and a rename, so a failed write
//!   never leaves partial new content at the target path.
//! - Missing parent directories are a write failure, never created here.
//! - Reads classify an absent file as `NotFound` and everything else that
//!   prevents reconstruction as `Unreadable`, including a tag the store's
//!   `TypeRegistry` does not recognize.
//! - A replaced file keeps its permissions.

use super::{Storable, StoreError, StoreResult, StoredValue, TypeRegistry};
use log::{debug, error, info};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

/// Capability to persist and recover whole values by path.
pub trait ObjectStore {
    /// Serializes `value` and replaces the content at `path` with it.
    fn write_to_file<T: Storable>(&self, path: &Path, value: &T) -> StoreResult<()>;

    /// Reads and decodes the complete content at `path`.
    fn read_from_file(&self, path: &Path) -> StoreResult<StoredValue>;
}

impl<S: ObjectStore> ObjectStore for &S {
    fn write_to_file<T: Storable>(&self, path: &Path, value: &T) -> StoreResult<()> {
        (**self).write_to_file(path, value)
    }

    fn read_from_file(&self, path: &Path) -> StoreResult<StoredValue> {
        (**self).read_from_file(path)
    }
}

/// Local filesystem implementation of `ObjectStore`.
///
/// Only tags its registry recognizes are written or read back; scalars and
/// their `seq`/`map` containers are always recognized.
#[derive(Debug, Clone, Default)]
pub struct FileObjectStore {
    registry: TypeRegistry,
}

impl FileObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this store with `T` added to the recognized types.
    pub fn with_type<T: Storable>(mut self) -> Self {
        self.registry.register::<T>();
        self
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    fn unknown_type_message(&self, type_tag: &str) -> Option<String> {
        (!self.registry.recognizes(type_tag))
            .then(|| format!("type `{type_tag}` is not known to this store"))
    }
}

impl ObjectStore for FileObjectStore {
    fn write_to_file<T: Storable>(&self, path: &Path, value: &T) -> StoreResult<()> {
        let started_at = Instant::now();
        let type_tag = T::type_tag();

        let result = match self.unknown_type_message(&type_tag) {
            Some(message) => Err(StoreError::write_failure(path, message)),
            None => encode(path, &type_tag, value),
        }
        .and_then(|bytes| write_atomically(path, &bytes).map(|()| bytes.len()));

        match result {
            Ok(bytes) => {
                info!(
                    "event=object_write module=store status=ok type={} bytes={} duration_ms={}",
                    type_tag,
                    bytes,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=object_write module=store status=error type={} duration_ms={} error_code={} error={}",
                    type_tag,
                    started_at.elapsed().as_millis(),
                    err.kind(),
                    err
                );
                Err(err)
            }
        }
    }

    fn read_from_file(&self, path: &Path) -> StoreResult<StoredValue> {
        let started_at = Instant::now();

        let result = read_stored_value(path).and_then(|stored| {
            match self.unknown_type_message(stored.type_tag()) {
                Some(message) => Err(StoreError::unreadable(path, message)),
                None => Ok(stored),
            }
        });

        match result {
            Ok(stored) => {
                info!(
                    "event=object_read module=store status=ok type={} duration_ms={}",
                    stored.type_tag(),
                    started_at.elapsed().as_millis()
                );
                Ok(stored)
            }
            Err(err) => {
                error!(
                    "event=object_read module=store status=error duration_ms={} error_code={} error={}",
                    started_at.elapsed().as_millis(),
                    err.kind(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn encode<T: Storable>(path: &Path, type_tag: &str, value: &T) -> StoreResult<Vec<u8>> {
    StoredValue::new(value)
        .and_then(|stored| serde_json::to_vec(&stored))
        .map_err(|err| {
            StoreError::write_failure(path, format!("cannot encode `{type_tag}`: {err}"))
                .with_source(err)
        })
}

fn read_stored_value(path: &Path) -> StoreResult<StoredValue> {
    let bytes = fs::read(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => StoreError::not_found(path, err),
        _ => StoreError::unreadable(path, format!("cannot read file: {err}")).with_source(err),
    })?;

    let stored: StoredValue = serde_json::from_slice(&bytes).map_err(|err| {
        StoreError::unreadable(path, format!("content is not a stored value: {err}"))
            .with_source(err)
    })?;

    if stored.type_tag().trim().is_empty() {
        return Err(StoreError::unreadable(path, "stored value has an empty type tag"));
    }

    Ok(stored)
}

fn write_atomically(path: &Path, bytes: &[u8]) -> StoreResult<()> {
    let temp_path = temp_path_for(path)?;

    if let Err(err) = write_and_sync(&temp_path, bytes, path) {
        discard_temp_file(&temp_path);
        return Err(
            StoreError::write_failure(path, format!("cannot write file: {err}")).with_source(err),
        );
    }

    if let Err(err) = fs::rename(&temp_path, path) {
        discard_temp_file(&temp_path);
        return Err(
            StoreError::write_failure(path, format!("cannot replace file: {err}"))
                .with_source(err),
        );
    }

    sync_parent_dir(path).map_err(|err| {
        StoreError::write_failure(path, format!("cannot sync directory: {err}")).with_source(err)
    })
}

fn write_and_sync(temp_path: &Path, bytes: &[u8], target: &Path) -> std::io::Result<()> {
    let mut file = File::create(temp_path)?;
    match fs::metadata(target) {
        Ok(existing) if existing.is_file() => file.set_permissions(existing.permissions())?,
        Ok(_) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    file.write_all(bytes)?;
    file.sync_all()
}

/// Persists the rename itself; a no-op where directories cannot be opened.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    File::open(parent)?.sync_all()
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

fn temp_path_for(path: &Path) -> StoreResult<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| StoreError::write_failure(path, "path does not name a file"))?;

    let mut temp_name = std::ffi::OsString::from(".");
    temp_name.push(file_name);
    temp_name.push(format!(".{}.tmp", Uuid::new_v4().simple()));

    Ok(path.with_file_name(temp_name))
}

fn discard_temp_file(temp_path: &Path) {
    if let Err(err) = fs::remove_file(temp_path) {
        if err.kind() != ErrorKind::NotFound {
            debug!(
                "event=temp_cleanup module=store status=error path={} error={}",
                temp_path.display(),
                err
            );
        }
    }
}
