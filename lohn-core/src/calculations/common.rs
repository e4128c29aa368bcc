//! Rounding and percentage helpers shared by the payroll calculations.
//!
//! The net-salary calculator rounds commercially (half away from zero); the
//! wage-tax flowchart only ever truncates or rounds up at fixed scales, so
//! both directions are provided here.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 round away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use lohn_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(45.745)), dec!(45.75));
/// assert_eq!(round_half_up(dec!(45.744)), dec!(45.74));
/// assert_eq!(round_half_up(dec!(-45.745)), dec!(-45.75));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Truncates towards zero at `dp` decimal places (`setScale(dp, DOWN)` in the
/// official flowchart notation).
///
/// ```
/// use rust_decimal_macros::dec;
/// use lohn_core::calculations::common::round_down;
///
/// assert_eq!(round_down(dec!(3802.98), 0), dec!(3802));
/// assert_eq!(round_down(dec!(1.077599), 4), dec!(1.0775));
/// ```
pub fn round_down(
    value: Decimal,
    dp: u32,
) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::ToZero)
}

/// Rounds away from zero at `dp` decimal places (`setScale(dp, UP)`).
///
/// ```
/// use rust_decimal_macros::dec;
/// use lohn_core::calculations::common::round_up;
///
/// assert_eq!(round_up(dec!(5248.01), 0), dec!(5249));
/// assert_eq!(round_up(dec!(5248.00), 0), dec!(5248));
/// ```
pub fn round_up(
    value: Decimal,
    dp: u32,
) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::AwayFromZero)
}

/// `percent` percent of `base`, unrounded. `None` if the product overflows.
pub fn percent_of(
    base: Decimal,
    percent: Decimal,
) -> Option<Decimal> {
    base.checked_mul(percent)?.checked_div(Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
    }

    #[test]
    fn round_half_up_handles_negative_values() {
        assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
    }

    #[test]
    fn round_half_up_handles_large_values() {
        assert_eq!(round_half_up(dec!(999999.999)), dec!(1000000.00));
    }

    // =========================================================================
    // round_down / round_up tests
    // =========================================================================

    #[test]
    fn round_down_never_rounds_up() {
        assert_eq!(round_down(dec!(0.999), 2), dec!(0.99));
        assert_eq!(round_down(dec!(31683.99), 0), dec!(31683));
    }

    #[test]
    fn round_down_truncates_negative_values_towards_zero() {
        assert_eq!(round_down(dec!(-1.5), 0), dec!(-1));
    }

    #[test]
    fn round_up_rounds_any_remainder_up() {
        assert_eq!(round_up(dec!(1229.01), 0), dec!(1230));
        assert_eq!(round_up(dec!(6516.00), 0), dec!(6516));
    }

    // =========================================================================
    // percent_of tests
    // =========================================================================

    #[test]
    fn percent_of_scales_by_one_hundredth() {
        assert_eq!(percent_of(dec!(3000), dec!(7.3)), Some(dec!(219)));
        assert_eq!(percent_of(dec!(3000), dec!(1.525)), Some(dec!(45.75)));
    }

    #[test]
    fn percent_of_zero_is_zero() {
        assert_eq!(percent_of(dec!(3000), dec!(0)), Some(dec!(0)));
    }

    #[test]
    fn percent_of_overflow_is_none() {
        assert_eq!(percent_of(Decimal::MAX, dec!(9.3)), None);
    }
}
