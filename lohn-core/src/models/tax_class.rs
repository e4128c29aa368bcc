use std::fmt;

use serde::{Deserialize, Serialize};

/// German wage-tax class (Steuerklasse I–VI).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaxClass {
    I,
    II,
    III,
    IV,
    V,
    VI,
}

impl TaxClass {
    pub fn all() -> &'static [TaxClass] {
        &[
            TaxClass::I,
            TaxClass::II,
            TaxClass::III,
            TaxClass::IV,
            TaxClass::V,
            TaxClass::VI,
        ]
    }

    /// Numeric class as used on payslips and by the wage-tax flowchart.
    pub fn number(&self) -> u8 {
        match self {
            Self::I => 1,
            Self::II => 2,
            Self::III => 3,
            Self::IV => 4,
            Self::V => 5,
            Self::VI => 6,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::I),
            2 => Some(Self::II),
            3 => Some(Self::III),
            4 => Some(Self::IV),
            5 => Some(Self::V),
            6 => Some(Self::VI),
            _ => None,
        }
    }

    /// Accepts `1`–`6` as well as roman numerals.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(n) = s.parse::<u8>() {
            return Self::from_number(n);
        }
        match s.to_ascii_uppercase().as_str() {
            "I" => Some(Self::I),
            "II" => Some(Self::II),
            "III" => Some(Self::III),
            "IV" => Some(Self::IV),
            "V" => Some(Self::V),
            "VI" => Some(Self::VI),
            _ => None,
        }
    }
}

impl fmt::Display for TaxClass {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn numbers_round_trip() {
        for class in TaxClass::all() {
            assert_eq!(TaxClass::from_number(class.number()), Some(*class));
        }
    }

    #[test]
    fn out_of_range_numbers_are_rejected() {
        assert_eq!(TaxClass::from_number(0), None);
        assert_eq!(TaxClass::from_number(7), None);
        assert_eq!(TaxClass::parse("7"), None);
    }

    #[test]
    fn parse_accepts_roman_numerals() {
        assert_eq!(TaxClass::parse("iii"), Some(TaxClass::III));
        assert_eq!(TaxClass::parse(" 5 "), Some(TaxClass::V));
    }

    #[test]
    fn display_is_the_class_number() {
        assert_eq!(TaxClass::IV.to_string(), "4");
    }
}
