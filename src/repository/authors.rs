//! Authors repository

use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::author::{Author, CreateAuthor},
};

const AUTHOR_COLUMNS: &str = "id, first_name, last_name, date_of_birth, date_of_death";

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Sqlite>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// List all authors, ordered by last then first name
    pub async fn list(&self) -> AppResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(&format!(
            "SELECT {} FROM authors ORDER BY last_name, first_name",
            AUTHOR_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(authors)
    }

    /// Get author by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Author> {
        self.find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))
    }

    pub async fn find(&self, id: i64) -> AppResult<Option<Author>> {
        let author = sqlx::query_as::<_, Author>(&format!(
            "SELECT {} FROM authors WHERE id = ?",
            AUTHOR_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(author)
    }

    pub async fn create(&self, author: &CreateAuthor) -> AppResult<Author> {
        let id = sqlx::query(
            r#"
            INSERT INTO authors (first_name, last_name, date_of_birth, date_of_death)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&author.first_name)
        .bind(&author.last_name)
        .bind(author.date_of_birth)
        .bind(author.date_of_death)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.get_by_id(id).await
    }

    /// Persist every writable column of `author`
    pub async fn update(&self, author: &Author) -> AppResult<Author> {
        let result = sqlx::query(
            r#"
            UPDATE authors
            SET first_name = ?, last_name = ?, date_of_birth = ?, date_of_death = ?
            WHERE id = ?
            "#,
        )
        .bind(&author.first_name)
        .bind(&author.last_name)
        .bind(author.date_of_birth)
        .bind(author.date_of_death)
        .bind(author.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author with id {} not found", author.id)));
        }
        self.get_by_id(author.id).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author with id {} not found", id)));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Number of books attributed to the author
    pub async fn count_books(&self, id: i64) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE author_id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
