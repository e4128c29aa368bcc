//! Backend selection for the insurer database.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::repository::{InsurerRepository, RepositoryError};

/// Connection string of an ephemeral SQLite database.
pub const IN_MEMORY: &str = ":memory:";

/// Which insurer database to open.
///
/// | backend  | connection_string                   |
/// |----------|-------------------------------------|
/// | `sqlite` | `krankenkassen.db`, `:memory:`      |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// Name of a registered backend. Compared case-insensitively.
    pub backend: String,
    /// Handed to the backend's factory as is.
    pub connection_string: String,
}

impl DbConfig {
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: path.into(),
        }
    }

    pub fn in_memory() -> Self {
        Self::sqlite(IN_MEMORY)
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::sqlite("krankenkassen.db")
    }
}

/// Opens insurer repositories for one backend.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Lowercase backend name, e.g. `"sqlite"`.
    fn backend_name(&self) -> &'static str;

    /// Connects, prepares the schema, and returns a repository ready for lookups.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn InsurerRepository>, RepositoryError>;
}

/// The backends compiled into a binary.
#[derive(Default)]
pub struct RepositoryRegistry {
    factories: BTreeMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `factory`. A later factory with the same name wins.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Registered backend names in alphabetical order.
    pub fn available_backends(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    /// Opens `config` with the matching backend.
    ///
    /// Fails with [`RepositoryError::Configuration`] for an unregistered
    /// backend; factory errors are passed through.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn InsurerRepository>, RepositoryError> {
        let wanted = config.backend.trim().to_lowercase();
        let Some(factory) = self.factories.get(wanted.as_str()) else {
            return Err(RepositoryError::Configuration(format!(
                "unknown backend '{}', expected one of: {}",
                config.backend,
                self.available_backends().join(", ")
            )));
        };
        factory.create(config).await
    }
}
