use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use lohn_core::{
    HealthInsurer, InsurerCoverage, InsurerRates, InsurerRepository, Region, RepositoryError,
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions};
use sqlx::{Executor, Row};
use tracing::{debug, info};

use crate::decimal::{decimal_to_text, get_decimal};

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Open a database from a bare file path (created if missing), a
    /// `sqlite:` URL, or `:memory:`.
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = if is_memory(database_url) {
            // Every pooled connection to `:memory:` would see its own empty
            // database, so the pool is pinned to one long-lived connection.
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect("sqlite::memory:")
                .await
        } else {
            let path = database_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true);
            SqlitePoolOptions::new().connect_with(options).await
        }
        .with_context(|| format!("Failed to connect to database: {}", database_url))?;

        debug!(database = database_url, "opened sqlite database");
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Runs the `*.sql` files in `seeds_dir` in file-name order, each in
    /// its own transaction. A file already recorded in `applied_seeds` is
    /// skipped, so seeds never overwrite data imported later. Returns the
    /// number of files applied.
    pub async fn run_seeds(
        &self,
        seeds_dir: &Path,
    ) -> Result<usize> {
        let mut files: Vec<_> = std::fs::read_dir(seeds_dir)
            .with_context(|| format!("Failed to read seeds directory '{}'", seeds_dir.display()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "sql"))
            .collect();
        files.sort();

        let mut applied = 0;
        for path in files {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let mut tx = self.pool.begin().await.context("Failed to start seed transaction")?;
            let seen: Option<String> =
                sqlx::query_scalar("SELECT file_name FROM applied_seeds WHERE file_name = ?")
                    .bind(&file_name)
                    .fetch_optional(&mut *tx)
                    .await
                    .context("Failed to read applied seeds")?;
            if seen.is_some() {
                debug!(file = %file_name, "seed file already applied");
                continue;
            }

            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;
            (&mut *tx)
                .execute(sqlx::raw_sql(&sql))
                .await
                .with_context(|| format!("Failed to execute seed file '{}'", path.display()))?;
            sqlx::query("INSERT INTO applied_seeds (file_name) VALUES (?)")
                .bind(&file_name)
                .execute(&mut *tx)
                .await
                .context("Failed to record seed file")?;
            tx.commit().await.context("Failed to commit seed file")?;

            info!(file = %path.display(), "applied seed file");
            applied += 1;
        }

        Ok(applied)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Region codes per insurer id, for every insurer without nationwide coverage.
    async fn region_codes(&self) -> Result<BTreeMap<i64, BTreeSet<Region>>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT insurer_id, region_code FROM health_insurer_regions ORDER BY insurer_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let mut regions: BTreeMap<i64, BTreeSet<Region>> = BTreeMap::new();
        for row in rows {
            let insurer_id: i64 = row.try_get("insurer_id").map_err(db_error)?;
            let code: String = row.try_get("region_code").map_err(db_error)?;
            let region = Region::parse(&code).ok_or_else(|| {
                RepositoryError::Database(format!("Invalid region code: {code}"))
            })?;
            regions.entry(insurer_id).or_default().insert(region);
        }
        Ok(regions)
    }
}

fn is_memory(database_url: &str) -> bool {
    matches!(database_url, ":memory:" | "sqlite::memory:" | "sqlite://:memory:")
}

fn row_to_insurer(
    row: &sqlx::sqlite::SqliteRow,
    regions: &mut BTreeMap<i64, BTreeSet<Region>>,
) -> Result<HealthInsurer, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(db_error)?;
    let all_regions: bool = row.try_get("all_regions").map_err(db_error)?;

    let coverage = if all_regions {
        InsurerCoverage::All
    } else {
        InsurerCoverage::Regions(regions.remove(&id).unwrap_or_default())
    };

    Ok(HealthInsurer {
        name: row.try_get("name").map_err(db_error)?,
        coverage,
        contribution_rate: get_decimal(row, "contribution_rate")?,
    })
}

#[async_trait]
impl InsurerRepository for SqliteRepository {
    async fn rates_for_region(
        &self,
        region: Region,
    ) -> Result<InsurerRates, RepositoryError> {
        let rows = sqlx::query(
            "SELECT i.name, i.contribution_rate
             FROM health_insurers i
             WHERE i.all_regions = 1
                OR EXISTS (
                    SELECT 1 FROM health_insurer_regions r
                    WHERE r.insurer_id = i.id AND r.region_code = ?
                )
             ORDER BY i.name",
        )
        .bind(region.code())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let mut rates = InsurerRates::new();
        for row in rows {
            let name: String = row.try_get("name").map_err(db_error)?;
            rates.insert(name, get_decimal(&row, "contribution_rate")?);
        }
        debug!(region = region.code(), insurers = rates.len(), "loaded insurer rates");
        Ok(rates)
    }

    async fn list_insurers(&self) -> Result<Vec<HealthInsurer>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, contribution_rate, all_regions FROM health_insurers ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let mut regions = self.region_codes().await?;
        rows.iter()
            .map(|row| row_to_insurer(row, &mut regions))
            .collect()
    }

    async fn get_insurer(
        &self,
        name: &str,
    ) -> Result<HealthInsurer, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, contribution_rate, all_regions FROM health_insurers WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or(RepositoryError::NotFound)?;

        let mut regions = self.region_codes().await?;
        row_to_insurer(&row, &mut regions)
    }

    async fn insert_insurer(
        &self,
        insurer: &HealthInsurer,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        insert_in(&mut tx, insurer).await?;
        tx.commit().await.map_err(db_error)
    }

    async fn delete_insurer(
        &self,
        name: &str,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        delete_in(&mut tx, name).await?;
        tx.commit().await.map_err(db_error)
    }

    async fn replace_insurers(
        &self,
        insurers: &[HealthInsurer],
    ) -> Result<usize, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        for insurer in insurers {
            delete_in(&mut tx, &insurer.name).await?;
        }
        for insurer in insurers {
            insert_in(&mut tx, insurer).await?;
        }
        // Dropping `tx` on an early return rolls the whole batch back.
        tx.commit().await.map_err(db_error)?;
        Ok(insurers.len())
    }
}

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

async fn insert_in(
    conn: &mut SqliteConnection,
    insurer: &HealthInsurer,
) -> Result<(), RepositoryError> {
    let all_regions = matches!(insurer.coverage, InsurerCoverage::All);
    let insurer_id = sqlx::query(
        "INSERT INTO health_insurers (name, contribution_rate, all_regions) VALUES (?, ?, ?)",
    )
    .bind(&insurer.name)
    .bind(decimal_to_text(insurer.contribution_rate))
    .bind(all_regions)
    .execute(&mut *conn)
    .await
    .map_err(db_error)?
    .last_insert_rowid();

    if let InsurerCoverage::Regions(regions) = &insurer.coverage {
        for region in regions {
            sqlx::query(
                "INSERT INTO health_insurer_regions (insurer_id, region_code) VALUES (?, ?)",
            )
            .bind(insurer_id)
            .bind(region.code())
            .execute(&mut *conn)
            .await
            .map_err(db_error)?;
        }
    }
    Ok(())
}

async fn delete_in(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "DELETE FROM health_insurer_regions
         WHERE insurer_id IN (SELECT id FROM health_insurers WHERE name = ?)",
    )
    .bind(name)
    .execute(&mut *conn)
    .await
    .map_err(db_error)?;

    sqlx::query("DELETE FROM health_insurers WHERE name = ?")
        .bind(name)
        .execute(&mut *conn)
        .await
        .map_err(db_error)?;
    Ok(())
}
