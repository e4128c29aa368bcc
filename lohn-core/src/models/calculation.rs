use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Region, TaxClass};

/// Everything the net-salary calculation needs from the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationInput {
    /// Monthly gross pay in euros. Must be positive.
    pub gross_pay: Decimal,
    pub region: Region,
    pub tax_class: TaxClass,
    pub church_tax: bool,
    /// Selected insurer's total contribution rate in percent. Must not be negative.
    pub insurer_rate: Decimal,
}

/// Withholding tax and solidarity surcharge for one pay period, in euros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaxEngineResult {
    pub withholding_tax: Decimal,
    pub solidarity_surcharge: Decimal,
}

impl TaxEngineResult {
    /// Builds a result from cent amounts as returned by a wage-tax engine.
    pub fn from_minor_units(
        withholding_tax: i64,
        solidarity_surcharge: i64,
    ) -> Self {
        Self {
            withholding_tax: Decimal::new(withholding_tax, 2),
            solidarity_surcharge: Decimal::new(solidarity_surcharge, 2),
        }
    }
}

/// A finished net-salary calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub gross_pay: Decimal,
    pub withholding_tax: Decimal,
    pub solidarity_surcharge: Decimal,
    pub church_tax: Decimal,
    pub health_insurance: Decimal,
    pub long_term_care_insurance: Decimal,
    pub pension_insurance: Decimal,
    pub unemployment_insurance: Decimal,
    pub net_pay: Decimal,
}

impl CalculationResult {
    /// Sum of taxes (withholding tax, surcharge, church tax).
    pub fn total_taxes(&self) -> Decimal {
        self.withholding_tax + self.solidarity_surcharge + self.church_tax
    }

    /// Sum of the employee's social-insurance contributions.
    pub fn total_social_insurance(&self) -> Decimal {
        self.health_insurance
            + self.long_term_care_insurance
            + self.pension_insurance
            + self.unemployment_insurance
    }

    pub fn total_deductions(&self) -> Decimal {
        self.total_taxes() + self.total_social_insurance()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn engine_result_converts_cents_to_euros() {
        let result = TaxEngineResult::from_minor_units(31683, 12681);

        assert_eq!(result.withholding_tax, dec!(316.83));
        assert_eq!(result.solidarity_surcharge, dec!(126.81));
    }

    #[test]
    fn deductions_add_up() {
        let result = CalculationResult {
            gross_pay: dec!(3000.00),
            withholding_tax: dec!(316.83),
            solidarity_surcharge: dec!(0.00),
            church_tax: dec!(28.51),
            health_insurance: dec!(219.00),
            long_term_care_insurance: dec!(45.75),
            pension_insurance: dec!(279.00),
            unemployment_insurance: dec!(36.00),
            net_pay: dec!(2074.91),
        };

        assert_eq!(result.total_taxes(), dec!(345.34));
        assert_eq!(result.total_social_insurance(), dec!(579.75));
        assert_eq!(result.total_deductions(), dec!(925.09));
        assert_eq!(result.gross_pay - result.total_deductions(), result.net_pay);
    }
}
