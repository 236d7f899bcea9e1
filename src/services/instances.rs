//! Book instance (physical copy) management service

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book_instance::{
        BookInstance, BookInstanceDetails, BookInstanceQuery, CreateBookInstance, UpdateBookInstance,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct InstancesService {
    repository: Repository,
}

impl InstancesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &BookInstanceQuery) -> AppResult<Vec<BookInstanceDetails>> {
        self.repository.book_instances.list(query).await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<BookInstanceDetails> {
        self.repository.book_instances.get_by_id(id).await
    }

    /// Referenced book and borrower must exist
    async fn check_references(&self, instance: &BookInstance) -> AppResult<()> {
        if let Some(book_id) = instance.book_id {
            if !self.repository.books.exists(book_id).await? {
                return Err(AppError::Validation(format!(
                    "book_id: Select a valid choice. {} is not one of the available choices.",
                    book_id
                )));
            }
        }
        if let Some(borrower_id) = instance.borrower_id {
            if !self.repository.users.exists(borrower_id).await? {
                return Err(AppError::Validation(format!(
                    "borrower_id: Select a valid choice. {} is not one of the available choices.",
                    borrower_id
                )));
            }
        }
        Ok(())
    }

    /// Register a new copy under a freshly generated UUID
    pub async fn create(&self, form: CreateBookInstance) -> AppResult<BookInstanceDetails> {
        form.validate()?;
        let instance = BookInstance {
            id: Uuid::new_v4(),
            book_id: form.book_id,
            imprint: form.imprint,
            due_back: form.due_back,
            status: form.status,
            borrower_id: form.borrower_id,
        };
        self.check_references(&instance).await?;

        let created = self.repository.book_instances.create(&instance).await?;
        tracing::info!("Catalog create: book instance {}", created);
        Ok(created)
    }

    pub async fn update(&self, id: Uuid, update: UpdateBookInstance) -> AppResult<BookInstanceDetails> {
        update.validate()?;
        let mut instance = self.repository.book_instances.get_by_id(id).await?.instance();
        update.apply(&mut instance);
        self.check_references(&instance).await?;

        let updated = self.repository.book_instances.update(&instance).await?;
        tracing::info!("Catalog update: book instance {} status={}", id, updated.status);
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repository.book_instances.delete(id).await?;
        tracing::info!("Catalog delete: book instance {}", id);
        Ok(())
    }
}
