use libris_core::{
    ArchiveConfig, ArchiveService, ArchiveValidationError, Book, FileObjectStore, LibraryArchive,
    ObjectStore, ServiceError, StoreErrorKind, User,
};
use std::fs;

fn service_in(dir: &tempfile::TempDir) -> ArchiveService {
    let config = ArchiveConfig::new(dir.path().to_str().unwrap()).unwrap();
    ArchiveService::new(config.open_store())
}

#[test]
fn load_or_initialize_creates_empty_archive_on_first_run() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);
    assert!(!service.store().path().exists());

    let archive = service.load_or_initialize().unwrap();
    assert!(archive.is_empty());
    assert!(service.store().path().exists());
    assert_eq!(service.load().unwrap(), archive);
}

#[test]
fn load_or_initialize_keeps_existing_archive() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);

    let mut archive = LibraryArchive::new();
    archive.add_user(User::new("Alan", "Turing"));
    service.save(&archive).unwrap();

    assert_eq!(service.load_or_initialize().unwrap(), archive);
}

#[test]
fn load_or_initialize_does_not_replace_foreign_file() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);
    let path = service.store().path().to_path_buf();
    FileObjectStore::new()
        .write_to_file(&path, &"not a LibraryArchive".to_string())
        .unwrap();
    let before = fs::read(&path).unwrap();

    let err = service.load_or_initialize().unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Store(ref store_err) if store_err.kind() == StoreErrorKind::Unreadable
    ));
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn plain_load_propagates_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = service_in(&dir).load().unwrap_err();
    assert!(matches!(err, ServiceError::Store(ref e) if e.is_not_found()));
}

#[test]
fn save_rejects_invalid_archive_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);

    let mut archive = LibraryArchive::new();
    archive.add_book(Book::new("978-0131103627", "   "));

    let err = service.save(&archive).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ArchiveValidationError::EmptyTitle(_))
    ));
    assert!(!service.store().path().exists());
}

#[test]
fn update_persists_mutation_and_returns_output() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);
    service.load_or_initialize().unwrap();

    let book_id = service
        .update(|archive| Ok(archive.add_book(Book::new("978-0262510875", "SICP"))))
        .unwrap();
    let user_id = service
        .update(|archive| Ok(archive.add_user(User::new("Barbara", "Liskov"))))
        .unwrap();
    let loan_id = service
        .update(|archive| archive.record_loan(book_id, user_id, 10, 20))
        .unwrap();

    let loaded = service.load().unwrap();
    assert_eq!(loaded.find_book(book_id).unwrap().title, "SICP");
    assert_eq!(loaded.find_user(user_id).unwrap().full_name(), "Barbara Liskov");
    assert_eq!(loaded.active_loans().next().unwrap().id, loan_id);
}

#[test]
fn update_failure_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);
    service.load_or_initialize().unwrap();
    let before = fs::read(service.store().path()).unwrap();

    let missing = uuid::Uuid::new_v4();
    let err = service
        .update(|archive| archive.mark_returned(missing, 0))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ArchiveValidationError::UnknownLoan(id)) if id == missing
    ));

    let err = service
        .update(|archive| {
            archive.add_book(Book::new("", "No ISBN"));
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    assert_eq!(fs::read(service.store().path()).unwrap(), before);
}

#[test]
fn update_on_missing_archive_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);

    let err = service.update(|_| Ok(())).unwrap_err();
    assert!(matches!(err, ServiceError::Store(ref e) if e.is_not_found()));
    assert!(!service.store().path().exists());
}
