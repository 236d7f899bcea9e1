//! Users repository

use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, User},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Sqlite>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT id, username, first_name, last_name FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    pub async fn exists(&self, id: i64) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn username_exists(&self, username: &str) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn create(&self, user: &CreateUser) -> AppResult<User> {
        let id = sqlx::query("INSERT INTO users (username, first_name, last_name) VALUES (?, ?, ?)")
            .bind(&user.username)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();
        self.get_by_id(id).await
    }

    /// Delete a user; copies they borrowed lose their borrower (SET NULL)
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        Ok(())
    }
}
