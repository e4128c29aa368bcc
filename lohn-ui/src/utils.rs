use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error, PartialEq)]
pub enum ParseDecimalError {
    #[error("no amount entered")]
    Empty,

    #[error("'{input}' is not a number")]
    Invalid {
        input: String,
        #[source]
        source: rust_decimal::Error,
    },
}

/// Normalizes input for decimal parsing.
///
/// Whitespace, apostrophes and a trailing `€` are removed. When a comma is
/// present it is the decimal separator and dots are thousands separators
/// (`3.000,50`); otherwise the dot is the decimal separator (`3000.50`).
fn normalize_decimal_input(s: &str) -> String {
    let compact: String = s
        .trim()
        .trim_end_matches('€')
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\'')
        .collect();

    if compact.contains(',') {
        compact.replace('.', "").replace(',', ".")
    } else {
        compact
    }
}

/// Parses a user-typed amount into a [`Decimal`].
///
/// Accepts German (`3.000,50`) and plain (`3000.50`) notation.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Err(ParseDecimalError::Empty);
    }
    normalized.parse().map_err(|e| {
        tracing::debug!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError::Invalid {
            input: s.trim().to_string(),
            source: e,
        }
    })
}

/// Formats an amount as `"<value> €"` with exactly two decimals.
pub fn format_euro(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2} €", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_decimal_plain_notation() {
        assert_eq!(parse_decimal("3000").unwrap(), dec!(3000));
        assert_eq!(parse_decimal("3000.50").unwrap(), dec!(3000.50));
    }

    #[test]
    fn parse_decimal_german_notation() {
        assert_eq!(parse_decimal("3000,50").unwrap(), dec!(3000.50));
        assert_eq!(parse_decimal("3.000,50").unwrap(), dec!(3000.50));
        assert_eq!(parse_decimal("1.234.567,89").unwrap(), dec!(1234567.89));
    }

    #[test]
    fn parse_decimal_strips_whitespace_and_currency() {
        assert_eq!(parse_decimal("  3 000 € ").unwrap(), dec!(3000));
    }

    #[test]
    fn parse_decimal_empty_is_its_own_error() {
        assert_eq!(parse_decimal(""), Err(ParseDecimalError::Empty));
        assert_eq!(parse_decimal("   "), Err(ParseDecimalError::Empty));
    }

    #[test]
    fn parse_decimal_invalid_returns_error() {
        assert!(matches!(
            parse_decimal("abc"),
            Err(ParseDecimalError::Invalid { ref input, .. }) if input == "abc"
        ));
    }

    #[test]
    fn parse_decimal_keeps_sign() {
        assert_eq!(parse_decimal("-100").unwrap(), dec!(-100));
    }

    #[test]
    fn format_euro_always_two_decimals() {
        assert_eq!(format_euro(dec!(2103.42)), "2103.42 €");
        assert_eq!(format_euro(dec!(2000)), "2000.00 €");
        assert_eq!(format_euro(dec!(0.005)), "0.01 €");
    }
}
