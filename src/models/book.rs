//! Book model and related types

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{author::AuthorShort, book_instance::BookInstanceDetails, genre::Genre, language::Language};

/// Summary pre-filled on the create form and used when none is submitted
pub const SUMMARY_PLACEHOLDER: &str = "Enter a brief description of the book";

static ISBN13: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{13}$").unwrap());

/// Book record (a title, not a physical copy)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author_id: Option<i64>,
    pub summary: String,
    /// 13 digit ISBN, unique across the catalog
    pub isbn: String,
    pub language_id: Option<i64>,
}

/// Short book representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookShort {
    pub id: i64,
    pub title: String,
    pub author_id: Option<i64>,
    /// "first, last" of the author, if any
    pub author_name: Option<String>,
}

/// Book with its relations, as shown on the detail page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    pub id: i64,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author: Option<AuthorShort>,
    pub language: Option<Language>,
    pub genres: Vec<Genre>,
    /// First three genre names, comma separated
    pub display_genre: String,
    pub instances: Vec<BookInstanceDetails>,
}

/// Joins the first three genre names for list displays
pub fn display_genre(genres: &[Genre]) -> String {
    genres
        .iter()
        .take(3)
        .map(|g| g.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Initial values of the book create form
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookInitial {
    pub title: String,
    pub author_id: Option<i64>,
    pub summary: String,
    pub isbn: String,
    pub genre_ids: Vec<i64>,
    pub language_id: Option<i64>,
}

impl Default for BookInitial {
    fn default() -> Self {
        Self {
            title: String::new(),
            author_id: None,
            summary: SUMMARY_PLACEHOLDER.to_string(),
            isbn: String::new(),
            genre_ids: Vec::new(),
            language_id: None,
        }
    }
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,
    pub author_id: Option<i64>,
    #[validate(length(max = 1000, message = "Summary must be at most 1000 characters"))]
    pub summary: Option<String>,
    #[validate(regex(path = *ISBN13, message = "ISBN must be exactly 13 digits"))]
    pub isbn: String,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
    pub language_id: Option<i64>,
}

/// Update book request.
///
/// Only these fields are writable. Absent keys are left untouched; `author_id`
/// and `language_id` accept an explicit `null`.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i64>)]
    pub author_id: Option<Option<i64>>,
    #[validate(length(max = 1000, message = "Summary must be at most 1000 characters"))]
    pub summary: Option<String>,
    #[validate(regex(path = *ISBN13, message = "ISBN must be exactly 13 digits"))]
    pub isbn: Option<String>,
    /// Replaces the whole genre set when present
    pub genre_ids: Option<Vec<i64>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i64>)]
    pub language_id: Option<Option<i64>>,
}

impl UpdateBook {
    /// Apply the scalar changes onto an existing book; genres are handled by the caller
    pub fn apply(&self, book: &mut Book) {
        if let Some(ref title) = self.title {
            book.title = title.clone();
        }
        if let Some(author_id) = self.author_id {
            book.author_id = author_id;
        }
        if let Some(ref summary) = self.summary {
            book.summary = summary.clone();
        }
        if let Some(ref isbn) = self.isbn {
            book.isbn = isbn.clone();
        }
        if let Some(language_id) = self.language_id {
            book.language_id = language_id;
        }
    }
}
