//! Library archive aggregate.
//!
//! # Responsibility
//! - Hold the entire persisted library state: books, users and loans.
//! - Provide record-level helpers used by the service layer.
//!
//! # Invariants
//! - Ids are unique within each collection.
//! - Loans reference an existing book and an existing user.
//! - `due_epoch_ms` and `returned_epoch_ms` are never earlier than
//!   `start_epoch_ms`.
//!
//! Lateness and availability rules live with the callers, not here.

use crate::store::Storable;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for books, users and loans.
pub type ItemId = Uuid;

/// Type tag written next to every persisted archive.
pub const ARCHIVE_TYPE_TAG: &str = "library_archive";

/// Catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: ItemId,
    pub isbn: String,
    pub title: String,
    pub authors: Vec<String>,
    pub publication_year: Option<i32>,
    /// Number of physical copies owned by the library.
    pub copies: u32,
}

impl Book {
    /// Creates a single-copy book with a generated id.
    pub fn new(isbn: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            isbn: isbn.into(),
            title: title.into(),
            authors: Vec::new(),
            publication_year: None,
            copies: 1,
        }
    }
}

/// Registered library user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: ItemId,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

impl User {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: None,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// One book lent to one user.
///
/// All timestamps are Unix epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: ItemId,
    pub book_id: ItemId,
    pub user_id: ItemId,
    pub start_epoch_ms: i64,
    pub due_epoch_ms: i64,
    /// `None` while the book is still out.
    pub returned_epoch_ms: Option<i64>,
}

impl Loan {
    pub fn is_active(&self) -> bool {
        self.returned_epoch_ms.is_none()
    }
}

/// The whole persisted library state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryArchive {
    pub books: Vec<Book>,
    pub users: Vec<User>,
    pub loans: Vec<Loan>,
}

impl Storable for LibraryArchive {
    fn type_tag() -> Cow<'static, str> {
        Cow::Borrowed(ARCHIVE_TYPE_TAG)
    }
}

impl LibraryArchive {
    /// Creates an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty() && self.users.is_empty() && self.loans.is_empty()
    }

    /// Appends a book and returns its id.
    pub fn add_book(&mut self, book: Book) -> ItemId {
        let id = book.id;
        self.books.push(book);
        id
    }

    /// Appends a user and returns its id.
    pub fn add_user(&mut self, user: User) -> ItemId {
        let id = user.id;
        self.users.push(user);
        id
    }

    pub fn find_book(&self, id: ItemId) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    pub fn find_user(&self, id: ItemId) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    /// Records a new active loan.
    ///
    /// # Errors
    /// - `UnknownBook` / `UnknownUser` when a reference does not resolve.
    /// - `LoanDueBeforeStart` when `due_epoch_ms < start_epoch_ms`.
    pub fn record_loan(
        &mut self,
        book_id: ItemId,
        user_id: ItemId,
        start_epoch_ms: i64,
        due_epoch_ms: i64,
    ) -> Result<ItemId, ArchiveValidationError> {
        let loan = Loan {
            id: Uuid::new_v4(),
            book_id,
            user_id,
            start_epoch_ms,
            due_epoch_ms,
            returned_epoch_ms: None,
        };
        self.check_loan(&loan)?;

        let id = loan.id;
        self.loans.push(loan);
        Ok(id)
    }

    /// Closes an active loan. Returning an already returned loan is a no-op.
    pub fn mark_returned(
        &mut self,
        loan_id: ItemId,
        returned_epoch_ms: i64,
    ) -> Result<(), ArchiveValidationError> {
        let loan = self
            .loans
            .iter_mut()
            .find(|loan| loan.id == loan_id)
            .ok_or(ArchiveValidationError::UnknownLoan(loan_id))?;

        if !loan.is_active() {
            return Ok(());
        }
        if returned_epoch_ms < loan.start_epoch_ms {
            return Err(ArchiveValidationError::LoanReturnedBeforeStart(loan_id));
        }
        loan.returned_epoch_ms = Some(returned_epoch_ms);
        Ok(())
    }

    /// Loans whose book has not come back yet.
    pub fn active_loans(&self) -> impl Iterator<Item = &Loan> {
        self.loans.iter().filter(|loan| loan.is_active())
    }

    /// Checks aggregate-wide invariants.
    pub fn validate(&self) -> Result<(), ArchiveValidationError> {
        let mut seen = HashSet::new();
        for book in &self.books {
            if !seen.insert(book.id) {
                return Err(ArchiveValidationError::DuplicateId(book.id));
            }
            if book.title.trim().is_empty() {
                return Err(ArchiveValidationError::EmptyTitle(book.id));
            }
            if book.isbn.trim().is_empty() {
                return Err(ArchiveValidationError::EmptyIsbn(book.id));
            }
            if book.copies == 0 {
                return Err(ArchiveValidationError::NoCopies(book.id));
            }
        }

        seen.clear();
        for user in &self.users {
            if !seen.insert(user.id) {
                return Err(ArchiveValidationError::DuplicateId(user.id));
            }
            if user.first_name.trim().is_empty() || user.last_name.trim().is_empty() {
                return Err(ArchiveValidationError::EmptyUserName(user.id));
            }
        }

        seen.clear();
        for loan in &self.loans {
            if !seen.insert(loan.id) {
                return Err(ArchiveValidationError::DuplicateId(loan.id));
            }
            self.check_loan(loan)?;
        }

        Ok(())
    }

    fn check_loan(&self, loan: &Loan) -> Result<(), ArchiveValidationError> {
        if self.find_book(loan.book_id).is_none() {
            return Err(ArchiveValidationError::UnknownBook(loan.book_id));
        }
        if self.find_user(loan.user_id).is_none() {
            return Err(ArchiveValidationError::UnknownUser(loan.user_id));
        }
        if loan.due_epoch_ms < loan.start_epoch_ms {
            return Err(ArchiveValidationError::LoanDueBeforeStart(loan.id));
        }
        if matches!(loan.returned_epoch_ms, Some(returned) if returned < loan.start_epoch_ms) {
            return Err(ArchiveValidationError::LoanReturnedBeforeStart(loan.id));
        }
        Ok(())
    }
}

/// Aggregate invariant violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveValidationError {
    DuplicateId(ItemId),
    EmptyTitle(ItemId),
    EmptyIsbn(ItemId),
    NoCopies(ItemId),
    EmptyUserName(ItemId),
    UnknownBook(ItemId),
    UnknownUser(ItemId),
    UnknownLoan(ItemId),
    LoanDueBeforeStart(ItemId),
    LoanReturnedBeforeStart(ItemId),
}

impl Display for ArchiveValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "duplicate id in archive: {id}"),
            Self::EmptyTitle(id) => write!(f, "book {id} has an empty title"),
            Self::EmptyIsbn(id) => write!(f, "book {id} has an empty isbn"),
            Self::NoCopies(id) => write!(f, "book {id} must have at least one copy"),
            Self::EmptyUserName(id) => write!(f, "user {id} has an empty name"),
            Self::UnknownBook(id) => write!(f, "loan references unknown book {id}"),
            Self::UnknownUser(id) => write!(f, "loan references unknown user {id}"),
            Self::UnknownLoan(id) => write!(f, "loan not found: {id}"),
            Self::LoanDueBeforeStart(id) => write!(f, "loan {id} is due before it starts"),
            Self::LoanReturnedBeforeStart(id) => {
                write!(f, "loan {id} is returned before it starts")
            }
        }
    }
}

impl Error for ArchiveValidationError {}
