use lohn_core::{InsurerRates, Region, TaxClass};
use rust_decimal::Decimal;

/// Field values of the calculator form.
///
/// The insurer list depends on the region; it is replaced by the session
/// whenever the region changes.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub gross_text: String,
    pub region: Region,
    pub tax_class: TaxClass,
    pub church_tax: bool,
    insurers: InsurerRates,
    insurer: Option<String>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            gross_text: String::new(),
            region: Region::all()[0],
            tax_class: TaxClass::I,
            church_tax: false,
            insurers: InsurerRates::new(),
            insurer: None,
        }
    }
}

impl FormState {
    /// Replaces the insurer list. The current choice survives if it is
    /// still offered, otherwise the first insurer is selected.
    pub fn set_insurers(
        &mut self,
        insurers: InsurerRates,
    ) {
        let keep = self
            .insurer
            .as_ref()
            .is_some_and(|name| insurers.contains_key(name));
        if !keep {
            self.insurer = insurers.keys().next().cloned();
        }
        self.insurers = insurers;
    }

    pub fn clear_insurers(&mut self) {
        self.insurers.clear();
        self.insurer = None;
    }

    pub fn insurers(&self) -> &InsurerRates {
        &self.insurers
    }

    /// Insurer names in display order; `kasse <n>` picks the n-th (1-based).
    pub fn insurer_names(&self) -> Vec<&str> {
        self.insurers.keys().map(String::as_str).collect()
    }

    /// Selects an insurer by 1-based list position. Returns the chosen name.
    pub fn select_insurer_index(
        &mut self,
        position: usize,
    ) -> Option<&str> {
        let name = self.insurers.keys().nth(position.checked_sub(1)?)?.clone();
        self.insurer = Some(name);
        self.insurer.as_deref()
    }

    /// Selects an insurer by name: exact match first, then a unique
    /// case-insensitive prefix.
    pub fn select_insurer_name(
        &mut self,
        wanted: &str,
    ) -> Option<&str> {
        let wanted = wanted.trim();
        let name = if self.insurers.contains_key(wanted) {
            wanted.to_string()
        } else {
            let lower = wanted.to_lowercase();
            let mut matches = self
                .insurers
                .keys()
                .filter(|name| name.to_lowercase().starts_with(&lower));
            match (matches.next(), matches.next()) {
                (Some(only), None) => only.clone(),
                _ => return None,
            }
        };
        self.insurer = Some(name);
        self.insurer.as_deref()
    }

    pub fn selected_insurer(&self) -> Option<&str> {
        self.insurer.as_deref()
    }

    /// Name and total contribution rate of the selected insurer.
    pub fn selected_rate(&self) -> Option<(&str, Decimal)> {
        let name = self.insurer.as_deref()?;
        self.insurers.get(name).map(|rate| (name, *rate))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn rates(entries: &[(&str, Decimal)]) -> InsurerRates {
        entries.iter().map(|(n, r)| (n.to_string(), *r)).collect()
    }

    #[test]
    fn default_form_matches_first_choices() {
        let form = FormState::default();

        assert_eq!(form.region, Region::BadenWuerttemberg);
        assert_eq!(form.tax_class, TaxClass::I);
        assert!(!form.church_tax);
        assert_eq!(form.selected_insurer(), None);
    }

    #[test]
    fn new_list_selects_first_insurer() {
        let mut form = FormState::default();

        form.set_insurers(rates(&[("hkk", dec!(16.79)), ("BARMER", dec!(17.89))]));

        assert_eq!(form.selected_rate(), Some(("BARMER", dec!(17.89))));
    }

    #[test]
    fn selection_survives_refresh_when_still_offered() {
        let mut form = FormState::default();
        form.set_insurers(rates(&[("hkk", dec!(16.79)), ("BARMER", dec!(17.89))]));
        form.select_insurer_name("hkk");

        form.set_insurers(rates(&[("AOK Bayern", dec!(17.29)), ("hkk", dec!(16.79))]));

        assert_eq!(form.selected_insurer(), Some("hkk"));
    }

    #[test]
    fn selection_resets_when_insurer_disappears() {
        let mut form = FormState::default();
        form.set_insurers(rates(&[("AOK Nordost", dec!(18.1)), ("hkk", dec!(16.79))]));
        form.select_insurer_name("AOK Nordost");

        form.set_insurers(rates(&[("AOK Bayern", dec!(17.29)), ("hkk", dec!(16.79))]));

        assert_eq!(form.selected_insurer(), Some("AOK Bayern"));
    }

    #[test]
    fn select_by_position_is_one_based() {
        let mut form = FormState::default();
        form.set_insurers(rates(&[("A", dec!(15)), ("B", dec!(16))]));

        assert_eq!(form.select_insurer_index(2), Some("B"));
        assert_eq!(form.select_insurer_index(0), None);
        assert_eq!(form.select_insurer_index(3), None);
        assert_eq!(form.selected_insurer(), Some("B"));
    }

    #[test]
    fn select_by_unique_prefix() {
        let mut form = FormState::default();
        form.set_insurers(rates(&[
            ("AOK Bayern", dec!(17.29)),
            ("Techniker Krankenkasse", dec!(17.05)),
        ]));

        assert_eq!(form.select_insurer_name("techniker"), Some("Techniker Krankenkasse"));
    }

    #[test]
    fn ambiguous_prefix_selects_nothing() {
        let mut form = FormState::default();
        form.set_insurers(rates(&[("AOK Bayern", dec!(17.29)), ("AOK PLUS", dec!(17.7))]));

        assert_eq!(form.select_insurer_name("aok"), None);
        assert_eq!(form.selected_insurer(), Some("AOK Bayern"));
    }

    #[test]
    fn cleared_list_has_no_rate() {
        let mut form = FormState::default();
        form.set_insurers(rates(&[("hkk", dec!(16.79))]));

        form.clear_insurers();

        assert_eq!(form.selected_rate(), None);
        assert!(form.insurer_names().is_empty());
    }
}
