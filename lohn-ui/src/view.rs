//! Text rendering of the form, the result, the history and the insurer list.

use colored::{Color, ColoredString, Colorize};
use lohn_core::{CalculationResult, Region};
use rust_decimal::Decimal;

use crate::form::FormState;
use crate::history::{HEADERS, HistoryLedger};
use crate::session::FormStatus;
use crate::settings::Theme;
use crate::utils::format_euro;

/// Colours for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub title: Color,
    pub label: Color,
    pub value: Color,
    pub result: Color,
    pub error: Color,
    pub muted: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                title: Color::Blue,
                label: Color::Black,
                value: Color::Blue,
                result: Color::Green,
                error: Color::Red,
                muted: Color::BrightBlack,
            },
            Theme::Dark => Self {
                title: Color::BrightCyan,
                label: Color::BrightWhite,
                value: Color::BrightYellow,
                result: Color::BrightGreen,
                error: Color::BrightRed,
                muted: Color::White,
            },
        }
    }

    fn paint(
        &self,
        text: &str,
        color: Color,
    ) -> ColoredString {
        text.color(color)
    }
}

pub fn banner(
    title: &str,
    palette: &Palette,
) -> String {
    format!(
        "{}\n{}",
        palette.paint(&format!("=== {title} ==="), palette.title).bold(),
        palette.paint("Befehle: hilfe | Bruttogehalt direkt eingeben, z. B. 3000", palette.muted)
    )
}

fn or_dash(text: &str) -> String {
    if text.is_empty() { "-".to_string() } else { text.to_string() }
}

pub fn render_form(
    form: &FormState,
    palette: &Palette,
) -> String {
    let insurer = match form.selected_rate() {
        Some((name, rate)) => format!("{name} ({}%)", rate.normalize()),
        None => "-".to_string(),
    };
    let rows = [
        ("Bruttogehalt (€)", or_dash(&form.gross_text)),
        ("Bundesland", form.region.name().to_string()),
        ("Steuerklasse", form.tax_class.to_string()),
        ("Kirchensteuer", if form.church_tax { "Ja" } else { "Nein" }.to_string()),
        ("Krankenkasse", insurer),
    ];
    rows.iter()
        .map(|(label, value)| {
            format!(
                "{} {}",
                palette.paint(&format!("{label:<18}"), palette.label),
                palette.paint(value, palette.value)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The result line: `Netto: …`, an error, or an empty `Netto: ` when idle.
pub fn render_status(
    status: &FormStatus,
    palette: &Palette,
) -> String {
    match status {
        FormStatus::Idle => "Netto: ".to_string(),
        FormStatus::Computed(result) => palette
            .paint(&format!("Netto: {}", format_euro(result.net_pay)), palette.result)
            .bold()
            .to_string(),
        FormStatus::Failed(message) => palette
            .paint(&format!("Fehler: {message}"), palette.error)
            .to_string(),
    }
}

/// Every deduction of `result`, one per line, amounts right-aligned.
pub fn render_breakdown(
    result: &CalculationResult,
    palette: &Palette,
) -> String {
    let rows: [(&str, Decimal); 10] = [
        ("Brutto", result.gross_pay),
        ("Lohnsteuer", result.withholding_tax),
        ("Solidaritätszuschlag", result.solidarity_surcharge),
        ("Kirchensteuer", result.church_tax),
        ("Krankenversicherung", result.health_insurance),
        ("Pflegeversicherung", result.long_term_care_insurance),
        ("Rentenversicherung", result.pension_insurance),
        ("Arbeitslosenversicherung", result.unemployment_insurance),
        ("Abzüge gesamt", result.total_deductions()),
        ("Netto", result.net_pay),
    ];
    rows.iter()
        .map(|(label, amount)| {
            let line = format!("{label:<26}{:>14}", format_euro(*amount));
            if *label == "Netto" {
                palette.paint(&line, palette.result).bold().to_string()
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_history(
    ledger: &HistoryLedger,
    palette: &Palette,
) -> String {
    if ledger.is_empty() {
        return palette.paint("Verlauf ist leer", palette.muted).to_string();
    }

    let rows: Vec<[String; 6]> = ledger.entries().iter().map(|e| e.fields()).collect();
    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: &[String]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let header = format_row(&HEADERS.map(str::to_string));
    let mut lines = vec![palette.paint(&header, palette.label).bold().to_string()];
    lines.extend(rows.iter().map(|row| format_row(row.as_slice())));
    lines.join("\n")
}

pub fn render_insurers(
    form: &FormState,
    palette: &Palette,
) -> String {
    let region: Region = form.region;
    if form.insurers().is_empty() {
        return palette
            .paint(&format!("Keine Krankenkassen für {region}"), palette.error)
            .to_string();
    }

    let selected = form.selected_insurer();
    form.insurers()
        .iter()
        .enumerate()
        .map(|(i, (name, rate))| {
            let marker = if Some(name.as_str()) == selected { "*" } else { " " };
            let line = format!("{marker}{:>3}. {name} ({}%)", i + 1, rate.normalize());
            if marker == "*" {
                palette.paint(&line, palette.value).to_string()
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn help_text() -> &'static str {
    "\
brutto <Betrag>        Bruttogehalt setzen (oder Betrag direkt eingeben)
land <Bundesland>      Bundesland wählen (Name oder Kürzel, z. B. BY)
klasse <1-6>           Steuerklasse wählen
kirche an|aus          Kirchensteuer ein- oder ausschalten
kasse <Name|Nummer>    Krankenkasse wählen
kassen                 Krankenkassen des Bundeslands anzeigen
berechnen              Netto mit Aufschlüsselung anzeigen
speichern              Berechnung in den Verlauf übernehmen
verlauf                Verlauf anzeigen
export csv|pdf|txt [Datei]  Verlauf exportieren
log <Level>            Log-Level ändern (error, warn, info, debug, trace)
log konsole an|aus     Log-Ausgabe auf stderr ein- oder ausschalten
log datei <Pfad>|aus   Log zusätzlich in eine Datei schreiben oder beenden
hilfe                  Diese Hilfe
ende                   Programm beenden"
}

#[cfg(test)]
mod tests {
    use lohn_core::{InsurerRates, TaxClass};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::history::HistoryEntry;

    fn plain() -> Palette {
        colored::control::set_override(false);
        Palette::for_theme(Theme::Light)
    }

    fn result() -> CalculationResult {
        CalculationResult {
            gross_pay: dec!(3000),
            withholding_tax: dec!(316.83),
            solidarity_surcharge: dec!(0),
            church_tax: dec!(0),
            health_insurance: dec!(219.00),
            long_term_care_insurance: dec!(45.75),
            pension_insurance: dec!(279.00),
            unemployment_insurance: dec!(36.00),
            net_pay: dec!(2103.42),
        }
    }

    #[test]
    fn themes_use_different_palettes() {
        assert_ne!(Palette::for_theme(Theme::Light), Palette::for_theme(Theme::Dark));
    }

    #[test]
    fn status_lines() {
        let palette = plain();

        assert_eq!(render_status(&FormStatus::Idle, &palette), "Netto: ");
        assert_eq!(
            render_status(&FormStatus::Computed(result()), &palette),
            "Netto: 2103.42 €"
        );
        assert_eq!(
            render_status(&FormStatus::Failed("Bruttogehalt fehlt".to_string()), &palette),
            "Fehler: Bruttogehalt fehlt"
        );
    }

    #[test]
    fn breakdown_lists_every_deduction() {
        let text = render_breakdown(&result(), &plain());

        assert_eq!(text.lines().count(), 10);
        assert!(text.contains("Krankenversicherung"));
        assert!(text.lines().last().unwrap().ends_with("2103.42 €"));
    }

    #[test]
    fn history_table_aligns_columns() {
        let mut ledger = HistoryLedger::new();
        ledger.append(HistoryEntry {
            gross_text: "3000".to_string(),
            region: Region::Berlin,
            tax_class: TaxClass::I,
            church_tax: false,
            insurer: "hkk".to_string(),
            net_pay: dec!(2103.42),
        });

        let text = render_history(&ledger, &plain());

        assert_eq!(
            text,
            "Brutto | Bundesland | SK | Kirche | Kasse | Netto\n\
             3000   | Berlin     | 1  | Nein   | hkk   | 2103.42 €"
        );
    }

    #[test]
    fn empty_history_says_so() {
        assert_eq!(render_history(&HistoryLedger::new(), &plain()), "Verlauf ist leer");
    }

    #[test]
    fn insurer_list_marks_selection() {
        let mut form = FormState::default();
        let rates: InsurerRates = [
            ("BARMER".to_string(), dec!(17.89)),
            ("hkk".to_string(), dec!(16.79)),
        ]
        .into_iter()
        .collect();
        form.set_insurers(rates);

        let text = render_insurers(&form, &plain());

        assert_eq!(text, "*  1. BARMER (17.89%)\n   2. hkk (16.79%)");
    }
}
