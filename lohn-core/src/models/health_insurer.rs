use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Region;

/// Insurer name mapped to its total contribution rate in percent.
pub type InsurerRates = BTreeMap<String, Decimal>;

/// Where a statutory health insurer accepts members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsurerCoverage {
    /// Open nationwide.
    All,
    /// Open only in the listed states.
    Regions(BTreeSet<Region>),
}

impl InsurerCoverage {
    pub fn covers(
        &self,
        region: Region,
    ) -> bool {
        match self {
            Self::All => true,
            Self::Regions(regions) => regions.contains(&region),
        }
    }
}

/// One record of the insurer reference dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthInsurer {
    pub name: String,
    pub coverage: InsurerCoverage,
    /// Total contribution rate in percent, i.e. the 14.6% base rate plus the
    /// insurer's supplemental contribution.
    pub contribution_rate: Decimal,
}

impl HealthInsurer {
    /// The insurer's supplemental contribution on top of the base rate.
    pub fn supplemental_rate(&self) -> Decimal {
        self.contribution_rate - Decimal::new(146, 1)
    }
}
