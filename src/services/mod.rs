//! Business logic services

pub mod catalog;
pub mod circulation;
pub mod openlibrary;
pub mod reports;
pub mod stats;
pub mod students;

use crate::{
    config::{AuthConfig, CatalogConfig, LoansConfig},
    error::AppResult,
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub students: students::StudentsService,
    pub circulation: circulation::CirculationService,
    pub stats: stats::StatsService,
    pub openlibrary: openlibrary::OpenLibraryService,
    pub reports: reports::ReportsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        loans_config: LoansConfig,
        catalog_config: CatalogConfig,
    ) -> AppResult<Self> {
        Ok(Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            students: students::StudentsService::new(repository.clone(), auth_config),
            circulation: circulation::CirculationService::new(repository.clone(), loans_config),
            stats: stats::StatsService::new(repository.clone()),
            openlibrary: openlibrary::OpenLibraryService::new(repository.clone(), catalog_config)?,
            reports: reports::ReportsService::new(repository),
        })
    }
}
