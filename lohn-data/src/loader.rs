use std::collections::BTreeSet;
use std::io::Read;

use lohn_core::{HealthInsurer, InsurerCoverage, InsurerRepository, Region, RepositoryError};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when loading insurer data.
#[derive(Debug, Error)]
pub enum InsurerLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Unknown region '{region}' for insurer '{insurer}'")]
    UnknownRegion { insurer: String, region: String },

    #[error("Insurer '{0}' lists no regions (use 'Alle' for nationwide insurers)")]
    NoRegions(String),

    #[error("Insurer name must not be empty")]
    EmptyName,

    #[error("Insurer '{0}' is listed more than once")]
    DuplicateName(String),

    #[error("Contribution rate {rate} for insurer '{insurer}' is outside 0..=100")]
    InvalidRate { insurer: String, rate: Decimal },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for InsurerLoaderError {
    fn from(err: csv::Error) -> Self {
        InsurerLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from the insurer CSV file.
///
/// - `name`: insurer name as shown in the form
/// - `regions`: `Alle`/`all`, or a `;`-separated list of state names or codes
/// - `contribution_rate`: total rate in percent (`17.05` or `17,05`)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct InsurerRecord {
    pub name: String,
    pub regions: String,
    #[serde(deserialize_with = "deserialize_rate")]
    pub contribution_rate: Decimal,
}

fn deserialize_rate<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.trim()
        .replace(',', ".")
        .parse::<Decimal>()
        .map_err(serde::de::Error::custom)
}

impl InsurerRecord {
    /// Validate the record and turn it into the domain type.
    pub fn to_insurer(&self) -> Result<HealthInsurer, InsurerLoaderError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(InsurerLoaderError::EmptyName);
        }
        if self.contribution_rate < Decimal::ZERO || self.contribution_rate > Decimal::ONE_HUNDRED
        {
            return Err(InsurerLoaderError::InvalidRate {
                insurer: name.to_string(),
                rate: self.contribution_rate,
            });
        }

        Ok(HealthInsurer {
            name: name.to_string(),
            coverage: parse_coverage(name, &self.regions)?,
            contribution_rate: self.contribution_rate,
        })
    }
}

fn parse_coverage(
    insurer: &str,
    regions: &str,
) -> Result<InsurerCoverage, InsurerLoaderError> {
    let trimmed = regions.trim();
    if trimmed.eq_ignore_ascii_case("alle") || trimmed.eq_ignore_ascii_case("all") {
        return Ok(InsurerCoverage::All);
    }

    let mut set = BTreeSet::new();
    for part in trimmed.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let region = Region::parse(part).ok_or_else(|| InsurerLoaderError::UnknownRegion {
            insurer: insurer.to_string(),
            region: part.to_string(),
        })?;
        set.insert(region);
    }

    if set.is_empty() {
        return Err(InsurerLoaderError::NoRegions(insurer.to_string()));
    }
    Ok(InsurerCoverage::Regions(set))
}

/// Loader for the health-insurer reference dataset.
///
/// Works against any [`InsurerRepository`] backend.
pub struct InsurerLoader;

impl InsurerLoader {
    /// Parse insurer records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<InsurerRecord>, InsurerLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: InsurerRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Load insurer records into the database.
    ///
    /// Every record is validated before anything is written, then all
    /// insurers are replaced in one repository transaction: either the whole
    /// file lands or the database is left as it was. Loading the same file
    /// twice produces the same result. Returns the number of insurers written.
    pub async fn load<R: InsurerRepository + ?Sized>(
        repo: &R,
        records: &[InsurerRecord],
    ) -> Result<usize, InsurerLoaderError> {
        let mut seen = BTreeSet::new();
        let mut insurers = Vec::with_capacity(records.len());
        for record in records {
            let insurer = record.to_insurer()?;
            if !seen.insert(insurer.name.clone()) {
                return Err(InsurerLoaderError::DuplicateName(insurer.name));
            }
            debug!(insurer = %insurer.name, rate = %insurer.contribution_rate, "validated insurer");
            insurers.push(insurer);
        }

        Ok(repo.replace_insurers(&insurers).await?)
    }
}
