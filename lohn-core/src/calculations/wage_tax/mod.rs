//! Statutory wage-tax (Lohnsteuer) engines.
//!
//! The net-salary calculator never computes withholding tax itself. It asks a
//! [`WageTaxEngine`] for the tax year in question, so a new year's flowchart
//! can be added without touching the calculator. Engines work in cents, the
//! way the official flowchart does.

mod pap2025;

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{TaxClass, TaxEngineResult};

pub use pap2025::Pap2025;

/// Errors raised by a wage-tax engine or the engine registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WageTaxError {
    #[error("gross pay must not be negative, got {0} cents")]
    NegativeGross(i64),

    #[error("health insurance supplement must not be negative, got {0}%")]
    NegativeSupplement(Decimal),

    #[error("no wage tax engine for tax year {requested}; available: {available:?}")]
    UnsupportedYear { requested: i32, available: Vec<i32> },

    #[error("wage tax amount out of range: {0}")]
    Overflow(Decimal),
}

/// Length of the pay period the gross amount refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PayPeriod {
    Year,
    #[default]
    Month,
    Week,
    Day,
}

impl PayPeriod {
    /// Flowchart code (`LZZ`): 1 = year, 2 = month, 3 = week, 4 = day.
    pub fn code(&self) -> u8 {
        match self {
            Self::Year => 1,
            Self::Month => 2,
            Self::Week => 3,
            Self::Day => 4,
        }
    }
}

/// Insurance facts that shape the deductible insurance allowance.
///
/// The defaults describe the ordinary employee: statutory pension and health
/// insurance, no supplemental contribution, outside Saxony, with children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutoryFlags {
    pub pension_insured: bool,
    pub private_health_insured: bool,
    /// Health insurer's supplemental contribution in percent.
    pub health_supplement_rate: Decimal,
    pub saxony_care_rate: bool,
    pub childless_care_surcharge: bool,
}

impl Default for StatutoryFlags {
    fn default() -> Self {
        Self {
            pension_insured: true,
            private_health_insured: false,
            health_supplement_rate: Decimal::ZERO,
            saxony_care_rate: false,
            childless_care_surcharge: false,
        }
    }
}

/// Input to a wage-tax engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WageTaxRequest {
    /// Gross pay for the period in cents.
    pub gross_minor: i64,
    pub tax_class: TaxClass,
    pub pay_period: PayPeriod,
    pub flags: StatutoryFlags,
}

impl WageTaxRequest {
    /// A monthly request with default statutory flags.
    pub fn monthly(
        gross_minor: i64,
        tax_class: TaxClass,
    ) -> Self {
        Self {
            gross_minor,
            tax_class,
            pay_period: PayPeriod::Month,
            flags: StatutoryFlags::default(),
        }
    }
}

/// Withholding tax and solidarity surcharge for the requested period, in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WageTaxOutcome {
    pub withholding_minor: i64,
    pub surcharge_minor: i64,
}

impl From<WageTaxOutcome> for TaxEngineResult {
    fn from(outcome: WageTaxOutcome) -> Self {
        TaxEngineResult::from_minor_units(outcome.withholding_minor, outcome.surcharge_minor)
    }
}

/// One implementation per tax year.
pub trait WageTaxEngine: Send + Sync {
    /// Calendar year whose rules this engine implements.
    fn tax_year(&self) -> i32;

    fn compute(
        &self,
        request: &WageTaxRequest,
    ) -> Result<WageTaxOutcome, WageTaxError>;
}

/// Wage-tax engines keyed by tax year.
pub struct WageTaxRegistry {
    engines: BTreeMap<i32, Arc<dyn WageTaxEngine>>,
}

impl WageTaxRegistry {
    pub fn new() -> Self {
        Self {
            engines: BTreeMap::new(),
        }
    }

    /// A registry holding every engine this crate ships.
    pub fn with_builtin_engines() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(Pap2025));
        registry
    }

    /// Registers an engine, replacing any engine for the same year.
    pub fn register(
        &mut self,
        engine: Arc<dyn WageTaxEngine>,
    ) {
        self.engines.insert(engine.tax_year(), engine);
    }

    /// Registered tax years, ascending.
    pub fn available_years(&self) -> Vec<i32> {
        self.engines.keys().copied().collect()
    }

    pub fn get(
        &self,
        year: i32,
    ) -> Result<Arc<dyn WageTaxEngine>, WageTaxError> {
        self.engines
            .get(&year)
            .cloned()
            .ok_or_else(|| WageTaxError::UnsupportedYear {
                requested: year,
                available: self.available_years(),
            })
    }

    /// The engine for the most recent registered year.
    pub fn latest(&self) -> Option<Arc<dyn WageTaxEngine>> {
        self.engines.values().next_back().cloned()
    }
}

impl Default for WageTaxRegistry {
    fn default() -> Self {
        Self::new()
    }
}
