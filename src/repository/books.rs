//! Books repository

use sqlx::{Pool, Sqlite, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookShort},
};

const BOOK_SHORT_SELECT: &str = r#"
    SELECT b.id, b.title, b.author_id,
           a.first_name || ', ' || a.last_name AS author_name
    FROM books b
    LEFT JOIN authors a ON a.id = b.author_id
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Sqlite>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// One page of the book list
    pub async fn list_page(&self, offset: i64, limit: i64) -> AppResult<Vec<BookShort>> {
        let books = sqlx::query_as::<_, BookShort>(&format!(
            "{} ORDER BY b.title, b.id LIMIT ? OFFSET ?",
            BOOK_SHORT_SELECT
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Books attributed to an author
    pub async fn list_by_author(&self, author_id: i64) -> AppResult<Vec<BookShort>> {
        let books = sqlx::query_as::<_, BookShort>(&format!(
            "{} WHERE b.author_id = ? ORDER BY b.title, b.id",
            BOOK_SHORT_SELECT
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            "SELECT id, title, author_id, summary, isbn, language_id FROM books WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    pub async fn exists(&self, id: i64) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    /// Whether another book already carries this ISBN
    pub async fn isbn_exists(&self, isbn: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM books WHERE isbn = ? AND id != COALESCE(?, -1)",
        )
        .bind(isbn)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Insert a book and its genre links in one transaction
    pub async fn create(&self, book: &Book, genre_ids: &[i64]) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query(
            r#"
            INSERT INTO books (title, author_id, summary, isbn, language_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&book.title)
        .bind(book.author_id)
        .bind(&book.summary)
        .bind(&book.isbn)
        .bind(book.language_id)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        Self::link_genres(&mut tx, id, genre_ids).await?;
        tx.commit().await?;

        self.get_by_id(id).await
    }

    /// Persist the scalar columns and, when given, replace the genre set
    pub async fn update(&self, book: &Book, genre_ids: Option<&[i64]>) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = ?, author_id = ?, summary = ?, isbn = ?, language_id = ?
            WHERE id = ?
            "#,
        )
        .bind(&book.title)
        .bind(book.author_id)
        .bind(&book.summary)
        .bind(&book.isbn)
        .bind(book.language_id)
        .bind(book.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", book.id)));
        }

        if let Some(genre_ids) = genre_ids {
            sqlx::query("DELETE FROM book_genres WHERE book_id = ?")
                .bind(book.id)
                .execute(&mut *tx)
                .await?;
            Self::link_genres(&mut tx, book.id, genre_ids).await?;
        }

        tx.commit().await?;
        self.get_by_id(book.id).await
    }

    async fn link_genres(
        tx: &mut Transaction<'_, Sqlite>,
        book_id: i64,
        genre_ids: &[i64],
    ) -> AppResult<()> {
        for genre_id in genre_ids {
            sqlx::query("INSERT OR IGNORE INTO book_genres (book_id, genre_id) VALUES (?, ?)")
                .bind(book_id)
                .bind(genre_id)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count books whose title contains `word`, ignoring case
    pub async fn count_title_containing(&self, word: &str) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM books WHERE LOWER(title) LIKE '%' || LOWER(?) || '%'",
        )
        .bind(word)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Number of physical copies referencing the book
    pub async fn count_instances(&self, id: i64) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE book_id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
