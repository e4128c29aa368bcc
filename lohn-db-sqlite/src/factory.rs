use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lohn_core::db::repository::{InsurerRepository, RepositoryError};
use lohn_core::db::{DbConfig, RepositoryFactory};
use tracing::info;

use crate::repository::SqliteRepository;

/// Overrides the directory the bundled insurer seeds are read from.
pub const SEEDS_DIR_ENV: &str = "LOHN_DB_SQLITE_SEEDS_DIR";

/// Where the seed SQL files live: `$LOHN_DB_SQLITE_SEEDS_DIR`, else `./seeds`
/// when it exists, else the `seeds/` directory shipped with this crate.
pub fn seeds_dir() -> PathBuf {
    std::env::var_os(SEEDS_DIR_ENV)
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("seeds")).filter(|dir| dir.is_dir()))
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("seeds"))
}

/// Opens `connection_string`, brings the schema up to date and runs the seed
/// files in `seeds` that this database has not seen yet.
pub async fn open_seeded(
    connection_string: &str,
    seeds: &Path,
) -> Result<SqliteRepository, RepositoryError> {
    let repo = SqliteRepository::new(connection_string)
        .await
        .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
    let prepared = async {
        repo.run_migrations().await?;
        repo.run_seeds(seeds).await
    };
    let applied = prepared
        .await
        .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
    info!(database = connection_string, applied, "insurer database ready");
    Ok(repo)
}

/// The `"sqlite"` backend. A bare file path is created if missing;
/// `:memory:` gives a seeded throwaway database.
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn InsurerRepository>, RepositoryError> {
        let repo = open_seeded(&config.connection_string, &seeds_dir()).await?;
        Ok(Box::new(repo))
    }
}
