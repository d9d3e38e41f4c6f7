use libris_core::{
    ArchiveStore, Book, FileObjectStore, LibraryArchive, ObjectStore, StoreErrorKind, User,
    ARCHIVE_TYPE_TAG,
};
use std::fs;

#[test]
fn save_then_load_returns_archive() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArchiveStore::new(dir.path().join("archive.json"));

    let archive = LibraryArchive::new();
    store.save_archive(&archive).unwrap();

    let loaded = store.load_archive().unwrap();
    assert_eq!(loaded, archive);
}

#[test]
fn populated_archive_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArchiveStore::new(dir.path().join("archive.json"));

    let mut archive = LibraryArchive::new();
    let mut book = Book::new("978-0441172719", "Dune");
    book.authors.push("Frank Herbert".to_string());
    book.publication_year = Some(1965);
    book.copies = 3;
    let book_id = archive.add_book(book);
    let user_id = archive.add_user(User::new("Grace", "Hopper"));
    let loan_id = archive
        .record_loan(book_id, user_id, 1_700_000_000_000, 1_701_209_600_000)
        .unwrap();
    archive.mark_returned(loan_id, 1_700_500_000_000).unwrap();
    archive.record_loan(book_id, user_id, 1_702_000_000_000, 1_703_000_000_000).unwrap();

    store.save_archive(&archive).unwrap();

    let loaded = store.load_archive().unwrap();
    assert_eq!(loaded, archive);
    assert_eq!(loaded.active_loans().count(), 1);
}

#[test]
fn saved_file_is_tagged_as_archive() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("archive.json");
    ArchiveStore::new(&path)
        .save_archive(&LibraryArchive::new())
        .unwrap();

    let stored = FileObjectStore::new()
        .with_type::<LibraryArchive>()
        .read_from_file(&path)
        .unwrap();
    assert_eq!(stored.type_tag(), ARCHIVE_TYPE_TAG);
    assert!(stored.is::<LibraryArchive>());
}

#[test]
fn missing_archive_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("archive.json");

    let err = ArchiveStore::new(&path).load_archive().unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::NotFound);
    assert!(!path.exists());
}

#[test]
fn string_at_archive_path_is_type_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("archive.json");
    FileObjectStore::new()
        .write_to_file(&path, &"not a LibraryArchive".to_string())
        .unwrap();

    let err = ArchiveStore::new(&path).load_archive().unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::Unreadable);
    assert!(err.message().contains("type mismatch"));
}

#[test]
fn any_non_archive_value_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("archive.json");
    let generic = FileObjectStore::new();
    let store = ArchiveStore::with_store(&path, &generic);

    generic.write_to_file(&path, &vec!["A".to_string()]).unwrap();
    assert_eq!(store.load_archive().unwrap_err().kind(), StoreErrorKind::Unreadable);

    generic.write_to_file(&path, &42_i64).unwrap();
    assert_eq!(store.load_archive().unwrap_err().kind(), StoreErrorKind::Unreadable);

    generic.write_to_file(&path, &true).unwrap();
    assert_eq!(store.load_archive().unwrap_err().kind(), StoreErrorKind::Unreadable);
}

#[test]
fn archive_file_needs_registered_type_to_be_read_generically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("archive.json");
    ArchiveStore::new(&path)
        .save_archive(&LibraryArchive::new())
        .unwrap();

    let err = FileObjectStore::new().read_from_file(&path).unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::Unreadable);
    assert!(err.message().contains(ARCHIVE_TYPE_TAG));
}

#[test]
fn unknown_type_at_archive_path_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("archive.json");
    fs::write(&path, br#"{"type":"com.example.Gone","value":{"x":1}}"#).unwrap();

    let err = ArchiveStore::new(&path).load_archive().unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::Unreadable);
    assert!(err.message().contains("com.example.Gone"));
}

#[test]
fn archive_tag_with_foreign_payload_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("archive.json");
    fs::write(
        &path,
        format!(r#"{{"type":"{ARCHIVE_TYPE_TAG}","value":["not","an","archive"]}}"#),
    )
    .unwrap();

    let err = ArchiveStore::new(&path).load_archive().unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::Unreadable);
    assert!(err.message().contains(ARCHIVE_TYPE_TAG));
}

#[test]
fn corrupt_archive_file_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("archive.json");
    fs::write(&path, b"{\"type\":\"library_archive\",\"value\":{\"books\":[").unwrap();

    let err = ArchiveStore::new(&path).load_archive().unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::Unreadable);
}

#[test]
fn save_overwrites_previous_archive() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArchiveStore::new(dir.path().join("archive.json"));

    let mut first = LibraryArchive::new();
    first.add_book(Book::new("978-0140449136", "Crime and Punishment"));
    store.save_archive(&first).unwrap();

    let second = LibraryArchive::new();
    store.save_archive(&second).unwrap();

    let loaded = store.load_archive().unwrap();
    assert!(loaded.is_empty());
}

#[test]
fn save_does_not_validate_archive() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArchiveStore::new(dir.path().join("archive.json"));

    let mut archive = LibraryArchive::new();
    let mut book = Book::new("", "");
    book.copies = 0;
    archive.add_book(book);
    assert!(archive.validate().is_err());

    store.save_archive(&archive).unwrap();
    assert_eq!(store.load_archive().unwrap(), archive);
}

#[test]
fn save_into_missing_directory_is_write_failure() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArchiveStore::new(dir.path().join("missing").join("archive.json"));

    let err = store.save_archive(&LibraryArchive::new()).unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::WriteFailure);
}
