use async_trait::async_trait;
use thiserror::Error;

use crate::models::{HealthInsurer, InsurerRates, Region};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Read access to the health-insurer reference dataset, plus the writes the
/// data loader needs.
#[async_trait]
pub trait InsurerRepository: Send + Sync {
    /// Insurers open in `region` (nationwide ones included), keyed by name.
    async fn rates_for_region(
        &self,
        region: Region,
    ) -> Result<InsurerRates, RepositoryError>;

    /// Every insurer, ordered by name.
    async fn list_insurers(&self) -> Result<Vec<HealthInsurer>, RepositoryError>;

    async fn get_insurer(
        &self,
        name: &str,
    ) -> Result<HealthInsurer, RepositoryError>;

    /// Inserts a new insurer with its coverage.
    async fn insert_insurer(
        &self,
        insurer: &HealthInsurer,
    ) -> Result<(), RepositoryError>;

    /// Deletes an insurer and its coverage. Deleting an unknown name is not an error.
    async fn delete_insurer(
        &self,
        name: &str,
    ) -> Result<(), RepositoryError>;

    /// Replaces every insurer in `insurers` (inserting the ones not yet
    /// stored) as a single unit: on error none of them is changed.
    /// Returns how many were written.
    async fn replace_insurers(
        &self,
        insurers: &[HealthInsurer],
    ) -> Result<usize, RepositoryError>;
}
