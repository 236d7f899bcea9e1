//! Data models for the library catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod language;
pub mod user;

// Re-export commonly used types
pub use author::Author;
pub use book::{Book, BookShort};
pub use book_instance::{BookInstance, LoanStatus};
pub use genre::Genre;
pub use language::Language;
pub use user::{User, UserClaims, UserShort};

/// Comparison key for names that are unique regardless of case.
///
/// SQLite's `LOWER()` only folds ASCII, so the key is computed here and
/// stored alongside the name.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
