use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lohn_core::{HealthInsurer, InsurerCoverage, InsurerRepository};
use lohn_data::InsurerLoader;
use lohn_db_sqlite::SqliteRepository;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Imports health insurers and their contribution rates from CSV.
///
/// Columns: `name`, `regions` (`Alle`, or states separated by `;`, e.g.
/// `SN;TH`), `contribution_rate` (total rate in percent, `17.05` or `17,05`).
/// An insurer already in the database is replaced together with its regions.
#[derive(Parser, Debug)]
#[command(name = "lohn-data-loader", version, about, long_about = None)]
struct Args {
    /// CSV file to import
    #[arg(short, long)]
    file: PathBuf,

    /// SQLite file (created if missing) or `:memory:`
    #[arg(short, long, default_value = "krankenkassen.db")]
    database: String,

    /// Create or upgrade the schema first
    #[arg(short, long)]
    migrate: bool,

    /// Apply the seed SQL files in this directory before importing
    #[arg(short, long)]
    seeds: Option<PathBuf>,

    /// Validate the file and print what would be imported, without writing
    #[arg(long)]
    dry_run: bool,
}

fn describe(insurer: &HealthInsurer) -> String {
    let regions = match &insurer.coverage {
        InsurerCoverage::All => "bundesweit".to_string(),
        InsurerCoverage::Regions(regions) => regions
            .iter()
            .map(|r| r.code())
            .collect::<Vec<_>>()
            .join(","),
    };
    format!("{:<32} {:>6}%  {regions}", insurer.name, insurer.contribution_rate.normalize())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();

    let args = Args::parse();

    let path = args.file.display();
    let file = File::open(&args.file).with_context(|| format!("cannot open {path}"))?;
    let records = InsurerLoader::parse(file).with_context(|| format!("cannot read {path}"))?;
    info!(records = records.len(), file = %path, "parsed insurer file");

    if args.dry_run {
        for record in &records {
            let insurer = record
                .to_insurer()
                .with_context(|| format!("invalid row for '{}'", record.name))?;
            println!("{}", describe(&insurer));
        }
        println!("{} insurers valid, nothing written.", records.len());
        return Ok(());
    }

    let repo = SqliteRepository::new(&args.database)
        .await
        .with_context(|| format!("cannot open database {}", args.database))?;

    if args.migrate {
        repo.run_migrations().await.context("schema migration failed")?;
        println!("Schema is up to date.");
    }

    if let Some(dir) = &args.seeds {
        let applied = repo
            .run_seeds(dir)
            .await
            .with_context(|| format!("seed files in {} failed", dir.display()))?;
        println!("Applied {applied} new seed files from {}.", dir.display());
    }

    let loaded = InsurerLoader::load(&repo, &records)
        .await
        .context("import aborted, database unchanged")?;

    let total = repo.list_insurers().await.context("cannot count insurers")?.len();
    println!("Imported {loaded} insurers from {path}; {total} in {}.", args.database);

    Ok(())
}
