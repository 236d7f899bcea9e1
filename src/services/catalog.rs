//! Catalog management service: books, genres and languages

use validator::Validate;

use crate::{
    config::CatalogConfig,
    error::{AppError, AppResult},
    models::{
        author::AuthorShort,
        book::{display_genre, Book, BookDetails, BookShort, CreateBook, UpdateBook, SUMMARY_PLACEHOLDER},
        genre::{Genre, GenreForm},
        language::{Language, LanguageForm},
    },
    repository::Repository,
};

/// Position of one page within a paginated list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub num_pages: i64,
}

impl PageInfo {
    /// Resolve `page` (1-based) against `total` rows. An empty list still has
    /// one (empty) page; anything outside `1..=num_pages` is not found.
    pub fn resolve(total: i64, per_page: i64, page: i64) -> AppResult<Self> {
        let per_page = per_page.max(1);
        let num_pages = ((total + per_page - 1) / per_page).max(1);
        if page < 1 || page > num_pages {
            return Err(AppError::NotFound(format!("Invalid page ({})", page)));
        }
        Ok(Self {
            page,
            per_page,
            total,
            num_pages,
        })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn has_next(&self) -> bool {
        self.page < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Requested page of a paginated list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageNumber {
    Number(i64),
    Last,
}

impl PageNumber {
    /// Parse the raw `page` query value. Absent means the first page, `last`
    /// the final one; anything that is not an integer is not found.
    pub fn parse(raw: Option<&str>) -> AppResult<Self> {
        match raw.map(str::trim) {
            None | Some("") => Ok(PageNumber::Number(1)),
            Some("last") => Ok(PageNumber::Last),
            Some(value) => value
                .parse()
                .map(PageNumber::Number)
                .map_err(|_| AppError::NotFound(format!("Invalid page ({})", value))),
        }
    }
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    config: CatalogConfig,
}

impl CatalogService {
    pub fn new(repository: Repository, config: CatalogConfig) -> Self {
        Self { repository, config }
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    /// One page of the book list
    pub async fn list_books(&self, page: PageNumber) -> AppResult<(Vec<BookShort>, PageInfo)> {
        let total = self.repository.books.count().await?;
        let per_page = self.config.books_per_page;
        let page = match page {
            PageNumber::Number(page) => page,
            PageNumber::Last => PageInfo::resolve(total, per_page, 1)?.num_pages,
        };
        let info = PageInfo::resolve(total, per_page, page)?;
        let books = self
            .repository
            .books
            .list_page(info.offset(), info.per_page)
            .await?;
        Ok((books, info))
    }

    /// Book with author, language, genres and copies
    pub async fn get_book(&self, id: i64) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(id).await?;
        self.details(book).await
    }

    async fn details(&self, book: Book) -> AppResult<BookDetails> {
        let author = match book.author_id {
            Some(author_id) => self.repository.authors.find(author_id).await?.map(AuthorShort::from),
            None => None,
        };
        let language = self.repository.languages.find(book.language_id).await?;
        let genres = self.repository.genres.list_for_book(book.id).await?;
        let instances = self.repository.book_instances.list_for_book(book.id).await?;

        Ok(BookDetails {
            id: book.id,
            title: book.title,
            summary: book.summary,
            isbn: book.isbn,
            author,
            language,
            display_genre: display_genre(&genres),
            genres,
            instances,
        })
    }

    /// Referenced author, language and genres must exist
    async fn check_references(
        &self,
        author_id: Option<i64>,
        language_id: Option<i64>,
        genre_ids: &[i64],
    ) -> AppResult<()> {
        if let Some(author_id) = author_id {
            if self.repository.authors.find(author_id).await?.is_none() {
                return Err(AppError::Validation(format!(
                    "author_id: Select a valid choice. {} is not one of the available choices.",
                    author_id
                )));
            }
        }
        if language_id.is_some() && self.repository.languages.find(language_id).await?.is_none() {
            return Err(AppError::Validation(format!(
                "language_id: Select a valid choice. {} is not one of the available choices.",
                language_id.unwrap_or_default()
            )));
        }
        let missing = self.repository.genres.missing_ids(genre_ids).await?;
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "genre_ids: Select a valid choice. {:?} are not among the available choices.",
                missing
            )));
        }
        Ok(())
    }

    pub async fn create_book(&self, form: CreateBook) -> AppResult<BookDetails> {
        form.validate()?;
        self.check_references(form.author_id, form.language_id, &form.genre_ids)
            .await?;

        if self.repository.books.isbn_exists(&form.isbn, None).await? {
            return Err(AppError::ConstraintViolation(format!(
                "A book with ISBN {} already exists",
                form.isbn
            )));
        }

        let summary = form
            .summary
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| SUMMARY_PLACEHOLDER.to_string());

        let book = Book {
            id: 0,
            title: form.title,
            author_id: form.author_id,
            summary,
            isbn: form.isbn,
            language_id: form.language_id,
        };

        let created = self.repository.books.create(&book, &form.genre_ids).await?;
        tracing::info!("Catalog create: book id={} isbn={}", created.id, created.isbn);
        self.details(created).await
    }

    pub async fn update_book(&self, id: i64, update: UpdateBook) -> AppResult<BookDetails> {
        update.validate()?;
        let mut book = self.repository.books.get_by_id(id).await?;
        update.apply(&mut book);

        self.check_references(
            book.author_id,
            book.language_id,
            update.genre_ids.as_deref().unwrap_or(&[]),
        )
        .await?;

        if self.repository.books.isbn_exists(&book.isbn, Some(id)).await? {
            return Err(AppError::ConstraintViolation(format!(
                "A book with ISBN {} already exists",
                book.isbn
            )));
        }

        let updated = self
            .repository
            .books
            .update(&book, update.genre_ids.as_deref())
            .await?;
        tracing::info!("Catalog update: book id={}", id);
        self.details(updated).await
    }

    /// Delete a book. Blocked while copies reference it.
    pub async fn delete_book(&self, id: i64) -> AppResult<()> {
        let book = self.repository.books.get_by_id(id).await?;
        let copies = self.repository.books.count_instances(id).await?;
        if copies > 0 {
            tracing::warn!("Catalog delete blocked: book id={} has {} copies", id, copies);
            return Err(AppError::ConstraintViolation(format!(
                "Book \"{}\" cannot be deleted while {} copies reference it; delete or reassign those copies first",
                book.title, copies
            )));
        }
        self.repository.books.delete(id).await?;
        tracing::info!("Catalog delete: book id={}", id);
        Ok(())
    }

    // =========================================================================
    // GENRES
    // =========================================================================

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.list().await
    }

    pub async fn get_genre(&self, id: i64) -> AppResult<Genre> {
        self.repository.genres.get_by_id(id).await
    }

    pub async fn create_genre(&self, form: GenreForm) -> AppResult<Genre> {
        form.validate()?;
        let name = form.name.trim();
        if self.repository.genres.name_exists(name, None).await? {
            return Err(AppError::ConstraintViolation(
                "Genre already exists (case insensitive match)".to_string(),
            ));
        }
        let genre = self.repository.genres.create(name).await?;
        tracing::info!("Catalog create: genre id={} name={}", genre.id, genre.name);
        Ok(genre)
    }

    pub async fn update_genre(&self, id: i64, form: GenreForm) -> AppResult<Genre> {
        form.validate()?;
        self.repository.genres.get_by_id(id).await?;
        let name = form.name.trim();
        if self.repository.genres.name_exists(name, Some(id)).await? {
            return Err(AppError::ConstraintViolation(
                "Genre already exists (case insensitive match)".to_string(),
            ));
        }
        self.repository.genres.update(id, name).await
    }

    /// Delete a genre; books simply lose the tag
    pub async fn delete_genre(&self, id: i64) -> AppResult<()> {
        self.repository.genres.delete(id).await?;
        tracing::info!("Catalog delete: genre id={}", id);
        Ok(())
    }

    // =========================================================================
    // LANGUAGES
    // =========================================================================

    pub async fn list_languages(&self) -> AppResult<Vec<Language>> {
        self.repository.languages.list().await
    }

    pub async fn get_language(&self, id: i64) -> AppResult<Language> {
        self.repository.languages.get_by_id(id).await
    }

    pub async fn create_language(&self, form: LanguageForm) -> AppResult<Language> {
        form.validate()?;
        let name = form.name.trim();
        if self.repository.languages.name_exists(name, None).await? {
            return Err(AppError::ConstraintViolation(
                "Language already exists (case insensitive match)".to_string(),
            ));
        }
        let language = self.repository.languages.create(name).await?;
        tracing::info!("Catalog create: language id={} name={}", language.id, language.name);
        Ok(language)
    }

    pub async fn update_language(&self, id: i64, form: LanguageForm) -> AppResult<Language> {
        form.validate()?;
        self.repository.languages.get_by_id(id).await?;
        let name = form.name.trim();
        if self.repository.languages.name_exists(name, Some(id)).await? {
            return Err(AppError::ConstraintViolation(
                "Language already exists (case insensitive match)".to_string(),
            ));
        }
        self.repository.languages.update(id, name).await
    }

    /// Delete a language; books that used it keep existing without one
    pub async fn delete_language(&self, id: i64) -> AppResult<()> {
        self.repository.languages.delete(id).await?;
        tracing::info!("Catalog delete: language id={}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_has_one_page() {
        let info = PageInfo::resolve(0, 2, 1).unwrap();
        assert_eq!(info.num_pages, 1);
        assert_eq!(info.offset(), 0);
        assert!(!info.has_next());
        assert!(!info.has_previous());
    }

    #[test]
    fn pages_of_two() {
        let info = PageInfo::resolve(5, 2, 2).unwrap();
        assert_eq!(info.num_pages, 3);
        assert_eq!(info.offset(), 2);
        assert!(info.has_next());
        assert!(info.has_previous());

        let last = PageInfo::resolve(5, 2, 3).unwrap();
        assert!(!last.has_next());
    }

    #[test]
    fn page_numbers_parse_like_the_paginator() {
        assert_eq!(PageNumber::parse(None).unwrap(), PageNumber::Number(1));
        assert_eq!(PageNumber::parse(Some("3")).unwrap(), PageNumber::Number(3));
        assert_eq!(PageNumber::parse(Some("last")).unwrap(), PageNumber::Last);
        assert!(matches!(PageNumber::parse(Some("abc")), Err(AppError::NotFound(_))));
        assert!(matches!(PageNumber::parse(Some("1.5")), Err(AppError::NotFound(_))));
    }

    #[test]
    fn out_of_range_pages_are_not_found() {
        assert!(matches!(PageInfo::resolve(5, 2, 0), Err(AppError::NotFound(_))));
        assert!(matches!(PageInfo::resolve(5, 2, 4), Err(AppError::NotFound(_))));
    }
}
