//! Landing page statistics

use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::book_instance::LoanStatus, repository::Repository};

pub const SEARCH_WORD_BOOK: &str = "programming";
pub const SEARCH_WORD_GENRE: &str = "Science Fiction";

/// Aggregate counts shown on the landing page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CatalogCounts {
    pub num_books: i64,
    pub num_instances: i64,
    pub num_instances_available: i64,
    pub num_authors: i64,
    pub num_books_containing_word: i64,
    pub search_word_book: String,
    pub num_genres_containing_word: i64,
    pub search_word_genre: String,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn counts(&self) -> AppResult<CatalogCounts> {
        let repo = &self.repository;
        Ok(CatalogCounts {
            num_books: repo.books.count().await?,
            num_instances: repo.book_instances.count().await?,
            num_instances_available: repo.book_instances.count_by_status(LoanStatus::Available).await?,
            num_authors: repo.authors.count().await?,
            num_books_containing_word: repo.books.count_title_containing(SEARCH_WORD_BOOK).await?,
            search_word_book: SEARCH_WORD_BOOK.to_string(),
            num_genres_containing_word: repo.genres.count_name_containing(SEARCH_WORD_GENRE).await?,
            search_word_genre: SEARCH_WORD_GENRE.to_string(),
        })
    }
}

/// Visit counter carried between requests by the caller's session.
///
/// The handler reports the count seen so far and hands back the next value
/// for the hosting layer to persist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionVisits(pub u64);

impl SessionVisits {
    pub fn parse(raw: Option<&str>) -> Self {
        Self(raw.and_then(|v| v.trim().parse().ok()).unwrap_or(0))
    }

    /// Returns (count to display, state to persist)
    pub fn record_visit(self) -> (u64, SessionVisits) {
        (self.0, SessionVisits(self.0.saturating_add(1)))
    }
}
