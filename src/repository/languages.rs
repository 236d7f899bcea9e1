//! Languages repository

use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::{language::Language, name_key},
};

#[derive(Clone)]
pub struct LanguagesRepository {
    pool: Pool<Sqlite>,
}

impl LanguagesRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<Language>> {
        let languages = sqlx::query_as::<_, Language>("SELECT id, name FROM languages ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(languages)
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Language> {
        sqlx::query_as::<_, Language>("SELECT id, name FROM languages WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Language with id {} not found", id)))
    }

    /// Optional lookup used when resolving a book's language
    pub async fn find(&self, id: Option<i64>) -> AppResult<Option<Language>> {
        let Some(id) = id else {
            return Ok(None);
        };
        let language = sqlx::query_as::<_, Language>("SELECT id, name FROM languages WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(language)
    }

    /// Whether another language already uses this name, ignoring case
    pub async fn name_exists(&self, name: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM languages WHERE name_key = ? AND id != COALESCE(?, -1)",
        )
        .bind(name_key(name))
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    pub async fn create(&self, name: &str) -> AppResult<Language> {
        let id = sqlx::query("INSERT INTO languages (name, name_key) VALUES (?, ?)")
            .bind(name)
            .bind(name_key(name))
            .execute(&self.pool)
            .await?
            .last_insert_rowid();
        self.get_by_id(id).await
    }

    pub async fn update(&self, id: i64, name: &str) -> AppResult<Language> {
        let result = sqlx::query("UPDATE languages SET name = ?, name_key = ? WHERE id = ?")
            .bind(name)
            .bind(name_key(name))
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Language with id {} not found", id)));
        }
        self.get_by_id(id).await
    }

    /// Delete a language; referencing books lose their language (SET NULL)
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM languages WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Language with id {} not found", id)));
        }
        Ok(())
    }
}
