use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The sixteen German federal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    BadenWuerttemberg,
    Bayern,
    Berlin,
    Brandenburg,
    Bremen,
    Hamburg,
    Hessen,
    MecklenburgVorpommern,
    Niedersachsen,
    NordrheinWestfalen,
    RheinlandPfalz,
    Saarland,
    Sachsen,
    SachsenAnhalt,
    SchleswigHolstein,
    Thueringen,
}

impl Region {
    /// All states in the order the form lists them.
    pub fn all() -> &'static [Region] {
        &[
            Region::BadenWuerttemberg,
            Region::Bayern,
            Region::Berlin,
            Region::Brandenburg,
            Region::Bremen,
            Region::Hamburg,
            Region::Hessen,
            Region::MecklenburgVorpommern,
            Region::Niedersachsen,
            Region::NordrheinWestfalen,
            Region::RheinlandPfalz,
            Region::Saarland,
            Region::Sachsen,
            Region::SachsenAnhalt,
            Region::SchleswigHolstein,
            Region::Thueringen,
        ]
    }

    /// Two-letter state code used as the storage key.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadenWuerttemberg => "BW",
            Self::Bayern => "BY",
            Self::Berlin => "BE",
            Self::Brandenburg => "BB",
            Self::Bremen => "HB",
            Self::Hamburg => "HH",
            Self::Hessen => "HE",
            Self::MecklenburgVorpommern => "MV",
            Self::Niedersachsen => "NI",
            Self::NordrheinWestfalen => "NW",
            Self::RheinlandPfalz => "RP",
            Self::Saarland => "SL",
            Self::Sachsen => "SN",
            Self::SachsenAnhalt => "ST",
            Self::SchleswigHolstein => "SH",
            Self::Thueringen => "TH",
        }
    }

    /// German display name, as shown in the form and written to exports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BadenWuerttemberg => "Baden-Württemberg",
            Self::Bayern => "Bayern",
            Self::Berlin => "Berlin",
            Self::Brandenburg => "Brandenburg",
            Self::Bremen => "Bremen",
            Self::Hamburg => "Hamburg",
            Self::Hessen => "Hessen",
            Self::MecklenburgVorpommern => "Mecklenburg-Vorpommern",
            Self::Niedersachsen => "Niedersachsen",
            Self::NordrheinWestfalen => "Nordrhein-Westfalen",
            Self::RheinlandPfalz => "Rheinland-Pfalz",
            Self::Saarland => "Saarland",
            Self::Sachsen => "Sachsen",
            Self::SachsenAnhalt => "Sachsen-Anhalt",
            Self::SchleswigHolstein => "Schleswig-Holstein",
            Self::Thueringen => "Thüringen",
        }
    }

    /// Church tax as a fraction of the withholding tax.
    ///
    /// Bavaria and Baden-Württemberg levy 8%, every other state 9%.
    pub fn church_tax_rate(&self) -> Decimal {
        match self {
            Self::Bayern | Self::BadenWuerttemberg => Decimal::new(8, 2),
            _ => Decimal::new(9, 2),
        }
    }

    /// Parses a state code or name.
    ///
    /// Matching ignores case, and `ue`/`ü` are interchangeable so
    /// "Baden-Wuerttemberg" and "Thueringen" are accepted.
    pub fn parse(s: &str) -> Option<Self> {
        let wanted = fold(s.trim());
        if wanted.is_empty() {
            return None;
        }
        Self::all()
            .iter()
            .copied()
            .find(|region| fold(region.code()) == wanted || fold(region.name()) == wanted)
    }
}

fn fold(s: &str) -> String {
    s.to_lowercase().replace('ü', "ue")
}

impl fmt::Display for Region {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.name())
    }
}
