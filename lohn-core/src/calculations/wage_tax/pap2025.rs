//! Wage-tax flowchart for 2025 (Programmablaufplan Lohnsteuer 2025).
//!
//! The engine follows the official step structure and its rounding rules:
//!
//! | Step | Meaning |
//! |------|---------|
//! | MPARA | Contribution ceilings and employee contribution rates |
//! | MRE4JL | Annualise the period's gross pay |
//! | MZTABFB | Lump sums built into the tax table (ANP, SAP, EFA) |
//! | UPEVP / MVSP | Deductible insurance allowance (Vorsorgepauschale) |
//! | UPMLST / UPTAB25 | Income tax per § 32a EStG 2025 |
//! | MST5_6 | Tax classes V and VI |
//! | MSOLZ | Solidarity surcharge |
//! | UPANTEIL | Share of the annual amount for the pay period |
//!
//! Old-age relief, pension payments, annual allowances, child allowances and
//! one-off payments are not part of [`WageTaxRequest`] and count as zero.
//! Under private health insurance no premium is known, so the private part of
//! the allowance is zero as well.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::debug;

use super::{PayPeriod, StatutoryFlags, WageTaxEngine, WageTaxError, WageTaxOutcome, WageTaxRequest};
use crate::calculations::common::{round_down, round_up};
use crate::models::TaxClass;

/// Basic tax-free allowance (Grundfreibetrag).
const BASIC_ALLOWANCE: i64 = 12_096;
/// Annual solidarity-surcharge exemption limit per table factor.
const SURCHARGE_EXEMPTION: i64 = 19_950;
/// Class V/VI thresholds W1STKL5, W2STKL5, W3STKL5.
const CLASS5_THRESHOLDS: (i64, i64, i64) = (13_785, 34_240, 222_260);
/// Employee lump sum (Arbeitnehmer-Pauschbetrag).
const EMPLOYEE_LUMP_SUM: i64 = 1_230;
/// Special-expense lump sum (Sonderausgaben-Pauschbetrag).
const SPECIAL_EXPENSE_LUMP_SUM: i64 = 36;
/// Single-parent relief (Entlastungsbetrag für Alleinerziehende), class II.
const SINGLE_PARENT_RELIEF: i64 = 4_260;

/// The 2025 wage-tax engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pap2025;

/// Contribution parameters of MPARA.
struct Parameters {
    pension_ceiling: Decimal,
    pension_rate: Decimal,
    health_care_ceiling: Decimal,
    health_rate: Decimal,
    care_rate: Decimal,
}

impl Parameters {
    fn for_flags(flags: &StatutoryFlags) -> Self {
        let mut care_rate = if flags.saxony_care_rate {
            Decimal::new(23, 3)
        } else {
            Decimal::new(18, 3)
        };
        if flags.childless_care_surcharge {
            care_rate += Decimal::new(6, 3);
        }

        Self {
            pension_ceiling: Decimal::from(96_600),
            pension_rate: Decimal::new(93, 3),
            health_care_ceiling: Decimal::from(66_150),
            // KVZ / 2 / 100 + 7%
            health_rate: flags.health_supplement_rate / Decimal::TWO / Decimal::ONE_HUNDRED
                + Decimal::new(7, 2),
            care_rate,
        }
    }
}

impl WageTaxEngine for Pap2025 {
    fn tax_year(&self) -> i32 {
        2025
    }

    fn compute(
        &self,
        request: &WageTaxRequest,
    ) -> Result<WageTaxOutcome, WageTaxError> {
        if request.gross_minor < 0 {
            return Err(WageTaxError::NegativeGross(request.gross_minor));
        }
        if request.flags.health_supplement_rate < Decimal::ZERO {
            return Err(WageTaxError::NegativeSupplement(
                request.flags.health_supplement_rate,
            ));
        }

        let params = Parameters::for_flags(&request.flags);
        let class = request.tax_class;
        let table_factor = table_factor(class);

        // MRE4JL / MRE4ABZ: no allowances, so ZRE4 and ZRE4VP equal ZRE4J.
        let annual_gross = annualise(request.gross_minor, request.pay_period);

        // MZTABFB
        let table_allowances = table_allowances(annual_gross, class);

        // MLSTJAHR
        let insurance_allowance = insurance_allowance(annual_gross, class, &params, &request.flags);
        let taxable_income = annual_gross - table_allowances - insurance_allowance;
        let annual_tax = round_down(income_tax(taxable_income, class), 0);

        // UPLSTLZZ
        let withholding = period_share(annual_tax * Decimal::ONE_HUNDRED, request.pay_period);

        // MSOLZ: without child allowances the surcharge base is the annual tax.
        let surcharge = solidarity_surcharge(annual_tax, table_factor)
            .map(|annual| round_down(annual * Decimal::ONE_HUNDRED, 0))
            .map(|cents| period_share(cents, request.pay_period))
            .unwrap_or(Decimal::ZERO);

        debug!(
            tax_class = %class,
            annual_gross = %annual_gross,
            table_allowances = %table_allowances,
            insurance_allowance = %insurance_allowance,
            taxable_income = %taxable_income,
            annual_tax = %annual_tax,
            "wage tax 2025 computed"
        );

        Ok(WageTaxOutcome {
            withholding_minor: to_minor(withholding)?,
            surcharge_minor: to_minor(surcharge)?,
        })
    }
}

/// KZTAB: 2 under the splitting table (class III), otherwise 1.
fn table_factor(class: TaxClass) -> Decimal {
    match class {
        TaxClass::III => Decimal::TWO,
        _ => Decimal::ONE,
    }
}

/// MRE4JL: gross pay of the period scaled to a year, in euros.
fn annualise(
    gross_minor: i64,
    period: PayPeriod,
) -> Decimal {
    let cents = Decimal::from(gross_minor);
    let annual = match period {
        PayPeriod::Year => cents,
        PayPeriod::Month => cents * Decimal::from(12),
        PayPeriod::Week => cents * Decimal::from(360) / Decimal::from(7),
        PayPeriod::Day => cents * Decimal::from(360),
    };
    round_down(annual / Decimal::ONE_HUNDRED, 2)
}

/// MZTABFB: lump sums worked into the tax table (ZTABFB).
fn table_allowances(
    annual_gross: Decimal,
    class: TaxClass,
) -> Decimal {
    let lump_sum = Decimal::from(EMPLOYEE_LUMP_SUM);
    let employee_lump_sum = match class {
        TaxClass::VI => Decimal::ZERO,
        _ if annual_gross <= Decimal::ZERO => Decimal::ZERO,
        _ if annual_gross < lump_sum => round_up(annual_gross, 0),
        _ => lump_sum,
    };

    let special_expenses = match class {
        TaxClass::VI => Decimal::ZERO,
        _ => Decimal::from(SPECIAL_EXPENSE_LUMP_SUM),
    };

    let single_parent = match class {
        TaxClass::II => Decimal::from(SINGLE_PARENT_RELIEF),
        _ => Decimal::ZERO,
    };

    round_down(single_parent + employee_lump_sum + special_expenses, 2)
}

/// UPEVP with MVSP: the deductible insurance allowance (VSP).
///
/// The result is the larger of the contribution-based allowance (pension
/// plus health and care shares) and the minimum allowance (12% of gross,
/// capped at 1900, or 3000 in class III, plus the pension share).
fn insurance_allowance(
    annual_gross: Decimal,
    class: TaxClass,
    params: &Parameters,
    flags: &StatutoryFlags,
) -> Decimal {
    let mut base = annual_gross;

    let pension_part = if flags.pension_insured {
        base = base.min(params.pension_ceiling);
        round_down(base * params.pension_rate, 2)
    } else {
        Decimal::ZERO
    };

    let minimum_cap = match class {
        TaxClass::III => Decimal::from(3_000),
        _ => Decimal::from(1_900),
    };
    let minimum_part = round_down(base * Decimal::new(12, 2), 2).min(minimum_cap);
    let minimum_allowance = round_up(pension_part + minimum_part, 0);

    // MVSP
    let health_base = base.min(params.health_care_ceiling);
    let health_care_part = if flags.private_health_insured {
        Decimal::ZERO
    } else {
        round_down(health_base * (params.health_rate + params.care_rate), 2)
    };
    let contribution_allowance = round_up(health_care_part + pension_part, 0);

    if minimum_allowance > contribution_allowance {
        round_down(minimum_allowance, 2)
    } else {
        contribution_allowance
    }
}

/// UPMLST: annual income tax on the taxable income (ZVE).
fn income_tax(
    taxable_income: Decimal,
    class: TaxClass,
) -> Decimal {
    let factor = table_factor(class);
    let x = if taxable_income < Decimal::ONE {
        Decimal::ZERO
    } else {
        round_down(taxable_income / factor, 0)
    };

    match class {
        TaxClass::V | TaxClass::VI => class5_6_tax(x),
        _ => tariff(x) * factor,
    }
}

/// UPTAB25: income tax tariff 2025 for one person's share `x`.
fn tariff(x: Decimal) -> Decimal {
    let basic = Decimal::from(BASIC_ALLOWANCE);
    let tax = if x < basic + Decimal::ONE {
        Decimal::ZERO
    } else if x < Decimal::from(17_444) {
        let y = round_down((x - basic) / Decimal::from(10_000), 6);
        let rw = y * Decimal::new(93_230, 2) + Decimal::from(1_400);
        rw * y
    } else if x < Decimal::from(68_481) {
        let y = round_down((x - Decimal::from(17_443)) / Decimal::from(10_000), 6);
        let rw = y * Decimal::new(17_664, 2) + Decimal::from(2_397);
        rw * y + Decimal::new(101_513, 2)
    } else if x < Decimal::from(277_826) {
        x * Decimal::new(42, 2) - Decimal::new(1_091_192, 2)
    } else {
        x * Decimal::new(45, 2) - Decimal::new(1_924_667, 2)
    };
    round_down(tax, 0)
}

/// MST5_6: tax for classes V and VI.
fn class5_6_tax(x: Decimal) -> Decimal {
    let (w1, w2, w3) = (
        Decimal::from(CLASS5_THRESHOLDS.0),
        Decimal::from(CLASS5_THRESHOLDS.1),
        Decimal::from(CLASS5_THRESHOLDS.2),
    );
    let top_rate = Decimal::new(42, 2);
    let rich_rate = Decimal::new(45, 2);

    if x > w2 {
        let tax = class5_6_band(w2);
        if x > w3 {
            let tax = round_down(tax + (w3 - w2) * top_rate, 0);
            round_down(tax + (x - w3) * rich_rate, 0)
        } else {
            round_down(tax + (x - w2) * top_rate, 0)
        }
    } else {
        let tax = class5_6_band(x);
        if x > w1 {
            let capped = round_down(class5_6_band(w1) + (x - w1) * top_rate, 0);
            tax.min(capped)
        } else {
            tax
        }
    }
}

/// UP5_6: twice the difference between the tariff at 125% and 75% of `zx`,
/// but at least 14% of `zx`.
fn class5_6_band(zx: Decimal) -> Decimal {
    let high = tariff(round_down(zx * Decimal::new(125, 2), 2));
    let low = tariff(round_down(zx * Decimal::new(75, 2), 2));
    let difference = (high - low) * Decimal::TWO;
    let minimum = round_down(zx * Decimal::new(14, 2), 0);
    difference.max(minimum)
}

/// MSOLZ: annual surcharge in euros, or `None` below the exemption limit.
fn solidarity_surcharge(
    assessment_base: Decimal,
    table_factor: Decimal,
) -> Option<Decimal> {
    let exemption = Decimal::from(SURCHARGE_EXEMPTION) * table_factor;
    if assessment_base <= exemption {
        return None;
    }

    let full = round_down(assessment_base * Decimal::new(55, 1) / Decimal::ONE_HUNDRED, 2);
    let phase_in = round_down(
        (assessment_base - exemption) * Decimal::new(119, 1) / Decimal::ONE_HUNDRED,
        2,
    );
    Some(full.min(phase_in))
}

/// UPANTEIL: share of an annual cent amount for the pay period.
fn period_share(
    annual_minor: Decimal,
    period: PayPeriod,
) -> Decimal {
    match period {
        PayPeriod::Year => annual_minor,
        PayPeriod::Month => round_down(annual_minor / Decimal::from(12), 0),
        PayPeriod::Week => round_down(annual_minor * Decimal::from(7) / Decimal::from(360), 0),
        PayPeriod::Day => round_down(annual_minor / Decimal::from(360), 0),
    }
}

fn to_minor(amount: Decimal) -> Result<i64, WageTaxError> {
    amount.to_i64().ok_or(WageTaxError::Overflow(amount))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn monthly(
        gross_minor: i64,
        class: TaxClass,
    ) -> WageTaxOutcome {
        Pap2025
            .compute(&WageTaxRequest::monthly(gross_minor, class))
            .expect("valid request")
    }

    // =========================================================================
    // Full flowchart
    // =========================================================================

    #[test]
    fn class_one_at_3000_per_month() {
        let outcome = monthly(300_000, TaxClass::I);

        assert_eq!(outcome.withholding_minor, 31683);
        assert_eq!(outcome.surcharge_minor, 0);
    }

    #[test]
    fn class_four_matches_class_one_without_factor() {
        assert_eq!(monthly(300_000, TaxClass::IV), monthly(300_000, TaxClass::I));
    }

    #[test]
    fn class_three_uses_splitting() {
        assert_eq!(monthly(300_000, TaxClass::III).withholding_minor, 5316);
    }

    #[test]
    fn class_two_gets_single_parent_relief() {
        assert_eq!(monthly(300_000, TaxClass::II).withholding_minor, 22091);
    }

    #[test]
    fn class_five_and_six() {
        assert_eq!(monthly(300_000, TaxClass::V).withholding_minor, 65316);
        assert_eq!(monthly(300_000, TaxClass::VI).withholding_minor, 69333);
    }

    #[test]
    fn low_income_is_tax_free() {
        assert_eq!(monthly(100_000, TaxClass::I), WageTaxOutcome::default());
        assert_eq!(monthly(0, TaxClass::I), WageTaxOutcome::default());
    }

    #[test]
    fn surcharge_is_phased_in_above_exemption() {
        let outcome = monthly(800_000, TaxClass::I);

        assert_eq!(outcome.withholding_minor, 189008);
        assert_eq!(outcome.surcharge_minor, 2708);
    }

    #[test]
    fn surcharge_reaches_phase_in_cap_at_10000() {
        let outcome = monthly(1_000_000, TaxClass::I);

        assert_eq!(outcome.withholding_minor, 272816);
        assert_eq!(outcome.surcharge_minor, 12681);
    }

    #[test]
    fn annual_period_yields_annual_tax() {
        let request = WageTaxRequest {
            pay_period: PayPeriod::Year,
            ..WageTaxRequest::monthly(3_600_000, TaxClass::I)
        };

        let outcome = Pap2025.compute(&request).unwrap();

        assert_eq!(outcome.withholding_minor, 380200);
    }

    #[test]
    fn without_pension_insurance_the_allowance_shrinks() {
        let request = WageTaxRequest {
            flags: StatutoryFlags {
                pension_insured: false,
                ..StatutoryFlags::default()
            },
            ..WageTaxRequest::monthly(300_000, TaxClass::I)
        };

        let outcome = Pap2025.compute(&request).unwrap();

        assert_eq!(outcome.withholding_minor, 39600);
    }

    #[test]
    fn negative_gross_is_rejected() {
        let result = Pap2025.compute(&WageTaxRequest::monthly(-1, TaxClass::I));

        assert_eq!(result, Err(WageTaxError::NegativeGross(-1)));
    }

    #[test]
    fn negative_supplement_is_rejected() {
        let request = WageTaxRequest {
            flags: StatutoryFlags {
                health_supplement_rate: dec!(-0.5),
                ..StatutoryFlags::default()
            },
            ..WageTaxRequest::monthly(300_000, TaxClass::I)
        };

        assert_eq!(
            Pap2025.compute(&request),
            Err(WageTaxError::NegativeSupplement(dec!(-0.5)))
        );
    }

    // =========================================================================
    // Individual steps
    // =========================================================================

    #[test]
    fn annualise_monthly_pay() {
        assert_eq!(annualise(300_000, PayPeriod::Month), dec!(36000.00));
        assert_eq!(annualise(70_000, PayPeriod::Week), dec!(36000.00));
    }

    #[test]
    fn table_allowances_by_class() {
        assert_eq!(table_allowances(dec!(36000), TaxClass::I), dec!(1266));
        assert_eq!(table_allowances(dec!(36000), TaxClass::II), dec!(5526));
        assert_eq!(table_allowances(dec!(36000), TaxClass::VI), dec!(0));
        assert_eq!(table_allowances(dec!(1000.40), TaxClass::I), dec!(1037));
    }

    #[test]
    fn insurance_allowance_at_36000() {
        let flags = StatutoryFlags::default();
        let params = Parameters::for_flags(&flags);

        assert_eq!(
            insurance_allowance(dec!(36000), TaxClass::I, &params, &flags),
            dec!(6516)
        );
    }

    #[test]
    fn minimum_allowance_wins_for_small_income() {
        let flags = StatutoryFlags::default();
        let params = Parameters::for_flags(&flags);

        assert_eq!(
            insurance_allowance(dec!(12000), TaxClass::I, &params, &flags),
            dec!(2556)
        );
    }

    #[test]
    fn tariff_zones() {
        assert_eq!(tariff(dec!(12096)), dec!(0));
        assert_eq!(tariff(dec!(28218)), dec!(3802));
        assert_eq!(tariff(dec!(100000)), dec!(31088));
        assert_eq!(tariff(dec!(300000)), dec!(115753));
    }

    #[test]
    fn surcharge_exemption_is_doubled_for_splitting() {
        assert_eq!(solidarity_surcharge(dec!(30000), Decimal::TWO), None);
        assert!(solidarity_surcharge(dec!(30000), Decimal::ONE).is_some());
    }
}
