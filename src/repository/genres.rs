//! Genres repository

use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::{genre::Genre, name_key},
};

#[derive(Clone)]
pub struct GenresRepository {
    pool: Pool<Sqlite>,
}

impl GenresRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// List all genres by name
    pub async fn list(&self) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(genres)
    }

    /// Get genre by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Genre with id {} not found", id)))
    }

    /// Genres attached to a book
    pub async fn list_for_book(&self, book_id: i64) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>(
            r#"
            SELECT g.id, g.name
            FROM genres g
            JOIN book_genres bg ON bg.genre_id = g.id
            WHERE bg.book_id = ?
            ORDER BY g.name
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(genres)
    }

    /// Whether another genre already uses this name, ignoring case
    pub async fn name_exists(&self, name: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM genres WHERE name_key = ? AND id != COALESCE(?, -1)",
        )
        .bind(name_key(name))
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Ids from `ids` that match no genre
    pub async fn missing_ids(&self, ids: &[i64]) -> AppResult<Vec<i64>> {
        let mut missing = Vec::new();
        for &id in ids {
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM genres WHERE id = ?")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
            if count == 0 {
                missing.push(id);
            }
        }
        Ok(missing)
    }

    pub async fn create(&self, name: &str) -> AppResult<Genre> {
        let id = sqlx::query("INSERT INTO genres (name, name_key) VALUES (?, ?)")
            .bind(name)
            .bind(name_key(name))
            .execute(&self.pool)
            .await?
            .last_insert_rowid();
        self.get_by_id(id).await
    }

    pub async fn update(&self, id: i64, name: &str) -> AppResult<Genre> {
        let result = sqlx::query("UPDATE genres SET name = ?, name_key = ? WHERE id = ?")
            .bind(name)
            .bind(name_key(name))
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Genre with id {} not found", id)));
        }
        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM genres WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Genre with id {} not found", id)));
        }
        Ok(())
    }

    /// Count genres whose name contains `word`, ignoring case
    pub async fn count_name_containing(&self, word: &str) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM genres WHERE instr(name_key, ?) > 0",
        )
        .bind(name_key(word))
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
