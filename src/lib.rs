//! Local library catalog server
//!
//! REST JSON API over a catalog of books, authors, genres, languages and
//! physical copies, with a borrowing workflow (loan listings, renewal,
//! return) gated by Django-style permission codenames.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    pub fn new(config: AppConfig, repository: repository::Repository) -> Self {
        let services = services::Services::new(
            repository,
            config.catalog.clone(),
            config.loans.clone(),
        );
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
