//! Business logic services

pub mod authors;
pub mod catalog;
pub mod instances;
pub mod loans;
pub mod stats;
pub mod users;

use crate::{
    config::{CatalogConfig, LoansConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub authors: authors::AuthorsService,
    pub instances: instances::InstancesService,
    pub loans: loans::LoansService,
    pub stats: stats::StatsService,
    pub users: users::UsersService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, catalog_config: CatalogConfig, loans_config: LoansConfig) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone(), catalog_config),
            authors: authors::AuthorsService::new(repository.clone()),
            instances: instances::InstancesService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone(), loans_config),
            stats: stats::StatsService::new(repository.clone()),
            users: users::UsersService::new(repository.clone()),
            repository,
        }
    }
}
