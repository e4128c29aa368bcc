//! Net-salary calculation from gross pay.
//!
//! Deductions, in the order they are computed:
//!
//! | Deduction | Basis |
//! |-----------|-------|
//! | Withholding tax, solidarity surcharge | [`WageTaxEngine`] result |
//! | Church tax | withholding tax × 8% (BY, BW) or 9% |
//! | Health insurance | `((insurer rate − 14.6) / 2 + 7.3)`% of gross |
//! | Long-term care | 1.525% of gross |
//! | Pension | 9.3% of gross |
//! | Unemployment | 1.2% of gross |
//!
//! Each component is rounded half-up to the cent before it is subtracted.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use lohn_core::calculations::{ContributionRates, NetSalaryCalculator};
//! use lohn_core::{CalculationInput, Region, TaxClass, TaxEngineResult};
//!
//! let calculator = NetSalaryCalculator::new(ContributionRates::statutory_2025());
//! let input = CalculationInput {
//!     gross_pay: dec!(3000.00),
//!     region: Region::Berlin,
//!     tax_class: TaxClass::I,
//!     church_tax: false,
//!     insurer_rate: dec!(14.6),
//! };
//! let tax = TaxEngineResult {
//!     withholding_tax: dec!(316.83),
//!     solidarity_surcharge: dec!(0.00),
//! };
//!
//! let result = calculator.compute(&input, &tax).unwrap();
//!
//! assert_eq!(result.health_insurance, dec!(219.00));
//! assert_eq!(result.net_pay, dec!(2103.42));
//! ```

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::common::{percent_of, round_half_up};
use super::wage_tax::{WageTaxEngine, WageTaxError, WageTaxRequest};
use crate::models::{CalculationInput, CalculationResult, Region, TaxEngineResult};

/// Errors that can occur while computing a net salary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalculationError {
    /// Gross pay missing, not a number, or not positive; or a negative rate.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No contribution rate is known for the selected insurer in the region.
    #[error("no contribution rate for insurer '{insurer}' in {region}")]
    MissingRate { insurer: String, region: Region },

    /// A configured statutory rate is outside 0–100%.
    #[error("contribution rate '{name}' must be between 0 and 100, got {value}")]
    InvalidRate { name: &'static str, value: Decimal },

    /// The wage-tax engine failed; the calculation is aborted.
    #[error("wage tax engine failed: {0}")]
    TaxEngine(#[from] WageTaxError),
}

/// Statutory social-insurance and church-tax rates, all in percent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRates {
    /// General health-insurance rate shared by employer and employee.
    pub health_base: Decimal,
    /// Employee's half of the general health-insurance rate.
    pub health_employee_base: Decimal,
    pub long_term_care: Decimal,
    pub pension: Decimal,
    pub unemployment: Decimal,
}

impl ContributionRates {
    /// Employee shares for 2025.
    pub fn statutory_2025() -> Self {
        Self {
            health_base: Decimal::new(146, 1),
            health_employee_base: Decimal::new(73, 1),
            long_term_care: Decimal::new(1525, 3),
            pension: Decimal::new(93, 1),
            unemployment: Decimal::new(12, 1),
        }
    }

    /// Checks every rate lies within 0–100%.
    pub fn validate(&self) -> Result<(), CalculationError> {
        let rates = [
            ("health_base", self.health_base),
            ("health_employee_base", self.health_employee_base),
            ("long_term_care", self.long_term_care),
            ("pension", self.pension),
            ("unemployment", self.unemployment),
        ];
        for (name, value) in rates {
            if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
                return Err(CalculationError::InvalidRate { name, value });
            }
        }
        Ok(())
    }

    /// Employee's health-insurance share in percent for an insurer's total rate.
    pub fn health_employee_share(
        &self,
        insurer_rate: Decimal,
    ) -> Decimal {
        (insurer_rate - self.health_base) / Decimal::TWO + self.health_employee_base
    }
}

impl Default for ContributionRates {
    fn default() -> Self {
        Self::statutory_2025()
    }
}

/// Combines a wage-tax result with church tax and social insurance.
#[derive(Debug, Clone, Default)]
pub struct NetSalaryCalculator {
    rates: ContributionRates,
}

impl NetSalaryCalculator {
    pub fn new(rates: ContributionRates) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &ContributionRates {
        &self.rates
    }

    /// Computes the net salary from validated input and the engine's tax result.
    ///
    /// # Errors
    ///
    /// * [`CalculationError::InvalidInput`] if gross pay is not positive or
    ///   the insurer rate is negative.
    /// * [`CalculationError::InvalidRate`] if the configured rates are invalid.
    pub fn compute(
        &self,
        input: &CalculationInput,
        tax: &TaxEngineResult,
    ) -> Result<CalculationResult, CalculationError> {
        self.rates.validate()?;
        validate_input(input)?;

        let gross = input.gross_pay;
        let withholding_tax = round_half_up(tax.withholding_tax);
        let solidarity_surcharge = round_half_up(tax.solidarity_surcharge);

        let church_tax = if input.church_tax {
            round_half_up(withholding_tax * input.region.church_tax_rate())
        } else {
            Decimal::ZERO
        };

        let health_share = self.rates.health_employee_share(input.insurer_rate);
        let health_insurance = contribution(gross, health_share)?;
        let long_term_care_insurance = contribution(gross, self.rates.long_term_care)?;
        let pension_insurance = contribution(gross, self.rates.pension)?;
        let unemployment_insurance = contribution(gross, self.rates.unemployment)?;

        let deductions = [
            withholding_tax,
            solidarity_surcharge,
            church_tax,
            health_insurance,
            long_term_care_insurance,
            pension_insurance,
            unemployment_insurance,
        ]
        .into_iter()
        .try_fold(Decimal::ZERO, Decimal::checked_add)
        .ok_or_else(|| too_large(gross))?;
        let net_pay = gross - deductions;

        debug!(
            gross = %gross,
            withholding_tax = %withholding_tax,
            solidarity_surcharge = %solidarity_surcharge,
            church_tax = %church_tax,
            health_share = %health_share,
            health_insurance = %health_insurance,
            long_term_care = %long_term_care_insurance,
            pension = %pension_insurance,
            unemployment = %unemployment_insurance,
            net_pay = %net_pay,
            "net salary computed"
        );

        Ok(CalculationResult {
            gross_pay: gross,
            withholding_tax,
            solidarity_surcharge,
            church_tax,
            health_insurance,
            long_term_care_insurance,
            pension_insurance,
            unemployment_insurance,
            net_pay,
        })
    }

    /// Asks `engine` for the monthly wage tax on `input` and computes the net salary.
    ///
    /// Gross pay is converted to cents by truncation.
    pub fn calculate(
        &self,
        engine: &dyn WageTaxEngine,
        input: &CalculationInput,
    ) -> Result<CalculationResult, CalculationError> {
        validate_input(input)?;

        let gross_minor = input
            .gross_pay
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.trunc().to_i64())
            .ok_or_else(|| too_large(input.gross_pay))?;

        let request = WageTaxRequest::monthly(gross_minor, input.tax_class);
        let tax: TaxEngineResult = engine.compute(&request)?.into();

        self.compute(input, &tax)
    }
}

fn too_large(gross: Decimal) -> CalculationError {
    CalculationError::InvalidInput(format!("gross pay {gross} is too large"))
}

/// One social-insurance share of `gross`, rounded half-up to the cent.
fn contribution(
    gross: Decimal,
    rate: Decimal,
) -> Result<Decimal, CalculationError> {
    percent_of(gross, rate)
        .map(round_half_up)
        .ok_or_else(|| too_large(gross))
}

fn validate_input(input: &CalculationInput) -> Result<(), CalculationError> {
    if input.gross_pay <= Decimal::ZERO {
        return Err(CalculationError::InvalidInput(format!(
            "gross pay must be greater than 0, got {}",
            input.gross_pay
        )));
    }
    if input.insurer_rate < Decimal::ZERO {
        return Err(CalculationError::InvalidInput(format!(
            "insurer rate must not be negative, got {}",
            input.insurer_rate
        )));
    }
    Ok(())
}
