//! User account service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, User},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get(&self, id: i64) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn create(&self, form: CreateUser) -> AppResult<User> {
        form.validate()?;
        if self.repository.users.username_exists(&form.username).await? {
            return Err(AppError::ConstraintViolation(format!(
                "Username {} is already taken",
                form.username
            )));
        }
        let user = self.repository.users.create(&form).await?;
        tracing::info!("User created: id={} username={}", user.id, user.username);
        Ok(user)
    }

    /// Delete a user; their borrowed copies keep existing without a borrower
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.repository.users.delete(id).await?;
        tracing::info!("User deleted: id={}", id);
        Ok(())
    }
}
