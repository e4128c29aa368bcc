use lohn_core::{Region, TaxClass};
use rust_decimal::Decimal;

use crate::utils::format_euro;

/// Column headers shared by the history table and every exporter.
pub const HEADERS: [&str; 6] = ["Brutto", "Bundesland", "SK", "Kirche", "Kasse", "Netto"];

/// One saved calculation, as the user entered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Gross pay exactly as typed.
    pub gross_text: String,
    pub region: Region,
    pub tax_class: TaxClass,
    pub church_tax: bool,
    pub insurer: String,
    pub net_pay: Decimal,
}

impl HistoryEntry {
    /// The entry as table cells, in [`HEADERS`] order.
    pub fn fields(&self) -> [String; 6] {
        [
            self.gross_text.clone(),
            self.region.name().to_string(),
            self.tax_class.to_string(),
            if self.church_tax { "Ja" } else { "Nein" }.to_string(),
            self.insurer.clone(),
            format_euro(self.net_pay),
        ]
    }
}

/// Append-only record of saved calculations for the running session.
#[derive(Debug, Clone, Default)]
pub struct HistoryLedger {
    entries: Vec<HistoryEntry>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(
        &mut self,
        entry: HistoryEntry,
    ) -> &HistoryEntry {
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
