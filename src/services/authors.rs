//! Author management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::author::{Author, AuthorDetails, CreateAuthor, UpdateAuthor},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
}

impl AuthorsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Author>> {
        self.repository.authors.list().await
    }

    /// Author with the books attributed to them
    pub async fn get(&self, id: i64) -> AppResult<AuthorDetails> {
        let author = self.repository.authors.get_by_id(id).await?;
        let books = self.repository.books.list_by_author(id).await?;
        Ok(AuthorDetails { author, books })
    }

    pub async fn create(&self, form: CreateAuthor) -> AppResult<Author> {
        form.validate()?;
        let author = self.repository.authors.create(&form).await?;
        tracing::info!("Catalog create: author id={} ({})", author.id, author);
        Ok(author)
    }

    pub async fn update(&self, id: i64, update: UpdateAuthor) -> AppResult<Author> {
        update.validate()?;
        let mut author = self.repository.authors.get_by_id(id).await?;
        update.apply(&mut author);
        let updated = self.repository.authors.update(&author).await?;
        tracing::info!("Catalog update: author id={}", id);
        Ok(updated)
    }

    /// Delete an author. Blocked while books reference them.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let author = self.repository.authors.get_by_id(id).await?;
        let books = self.repository.authors.count_books(id).await?;
        if books > 0 {
            tracing::warn!("Catalog delete blocked: author id={} has {} books", id, books);
            return Err(AppError::ConstraintViolation(format!(
                "Author \"{}\" cannot be deleted while {} books reference them; delete or reassign those books first",
                author, books
            )));
        }
        self.repository.authors.delete(id).await?;
        tracing::info!("Catalog delete: author id={}", id);
        Ok(())
    }
}
