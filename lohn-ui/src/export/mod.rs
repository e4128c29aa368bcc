//! Serializes the history ledger to CSV, a plain-text report, or PDF.
//!
//! Exporters borrow the ledger immutably and write nothing but the target file.

mod pdf;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::history::{HEADERS, HistoryLedger};

pub use pdf::render_pdf;

pub const DEFAULT_CSV_FILE: &str = "netto_verlauf.csv";
pub const DEFAULT_PDF_FILE: &str = "netto_verlauf.pdf";
pub const DEFAULT_TEXT_FILE: &str = "netto_verlauf.txt";

/// Title line of the text and PDF reports.
pub const REPORT_TITLE: &str = "Brutto-Netto-Verlauf";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("write failed: {0}")]
    Write(#[from] io::Error),

    #[error("PDF export failed: {0}")]
    Pdf(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Pdf,
    Text,
}

impl ExportFormat {
    pub fn default_path(&self) -> &'static str {
        match self {
            Self::Csv => DEFAULT_CSV_FILE,
            Self::Pdf => DEFAULT_PDF_FILE,
            Self::Text => DEFAULT_TEXT_FILE,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "pdf" => Some(Self::Pdf),
            "txt" | "text" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Writes `ledger` to `path` in `format`.
pub fn export(
    ledger: &HistoryLedger,
    format: ExportFormat,
    path: &Path,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Csv => export_csv(ledger, path),
        ExportFormat::Pdf => export_pdf(ledger, path),
        ExportFormat::Text => export_text_report(ledger, path),
    }
}

/// CSV with a header row and one row per entry.
pub fn write_csv<W: Write>(
    ledger: &HistoryLedger,
    writer: W,
) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADERS)?;
    for entry in ledger.entries() {
        csv_writer.write_record(entry.fields())?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn export_csv(
    ledger: &HistoryLedger,
    path: &Path,
) -> Result<(), ExportError> {
    write_file(path, |file| write_csv(ledger, file))?;
    info!(path = %path.display(), rows = ledger.len(), "exported CSV");
    Ok(())
}

/// Title, header and rows, each row's cells joined by `" | "`.
pub fn report_lines(ledger: &HistoryLedger) -> Vec<String> {
    let mut lines = Vec::with_capacity(ledger.len() + 2);
    lines.push(REPORT_TITLE.to_string());
    lines.push(HEADERS.join(" | "));
    lines.extend(ledger.entries().iter().map(|e| e.fields().join(" | ")));
    lines
}

pub fn write_text_report<W: Write>(
    ledger: &HistoryLedger,
    mut writer: W,
) -> Result<(), ExportError> {
    for line in report_lines(ledger) {
        writeln!(writer, "{line}")?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_text_report(
    ledger: &HistoryLedger,
    path: &Path,
) -> Result<(), ExportError> {
    write_file(path, |file| write_text_report(ledger, file))?;
    info!(path = %path.display(), rows = ledger.len(), "exported text report");
    Ok(())
}

pub fn export_pdf(
    ledger: &HistoryLedger,
    path: &Path,
) -> Result<(), ExportError> {
    let lines = report_lines(ledger);
    let bytes =
        render_pdf(&lines[0], &lines[1..]).map_err(|e| ExportError::Pdf(e.to_string()))?;
    write_file(path, |mut file| {
        file.write_all(&bytes)?;
        file.flush()?;
        Ok(())
    })?;
    info!(path = %path.display(), rows = ledger.len(), "exported PDF");
    Ok(())
}

/// Creates `path` and hands a buffered writer to `write`, attaching the path
/// to any I/O error.
fn write_file<F>(
    path: &Path,
    write: F,
) -> Result<(), ExportError>
where
    F: FnOnce(BufWriter<File>) -> Result<(), ExportError>,
{
    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write(BufWriter::new(file)).map_err(|e| match e {
        ExportError::Write(source) => ExportError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use lohn_core::{Region, TaxClass};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::history::HistoryEntry;

    fn ledger() -> HistoryLedger {
        let mut ledger = HistoryLedger::new();
        ledger.append(HistoryEntry {
            gross_text: "3000".to_string(),
            region: Region::Berlin,
            tax_class: TaxClass::I,
            church_tax: false,
            insurer: "Techniker Krankenkasse".to_string(),
            net_pay: dec!(2031.92),
        });
        ledger.append(HistoryEntry {
            gross_text: "4.500,00".to_string(),
            region: Region::Bayern,
            tax_class: TaxClass::III,
            church_tax: true,
            insurer: "AOK Bayern".to_string(),
            net_pay: dec!(3261.7),
        });
        ledger
    }

    #[test]
    fn csv_has_header_and_rows_in_order() {
        let mut out = Vec::new();

        write_csv(&ledger(), &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Brutto,Bundesland,SK,Kirche,Kasse,Netto\n\
             3000,Berlin,1,Nein,Techniker Krankenkasse,2031.92 €\n\
             \"4.500,00\",Bayern,3,Ja,AOK Bayern,3261.70 €\n"
        );
    }

    #[test]
    fn empty_ledger_exports_header_only() {
        let mut out = Vec::new();

        write_csv(&HistoryLedger::new(), &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "Brutto,Bundesland,SK,Kirche,Kasse,Netto\n");
    }

    #[test]
    fn report_joins_cells_with_pipes() {
        assert_eq!(
            report_lines(&ledger()),
            vec![
                "Brutto-Netto-Verlauf".to_string(),
                "Brutto | Bundesland | SK | Kirche | Kasse | Netto".to_string(),
                "3000 | Berlin | 1 | Nein | Techniker Krankenkasse | 2031.92 €".to_string(),
                "4.500,00 | Bayern | 3 | Ja | AOK Bayern | 3261.70 €".to_string(),
            ]
        );
    }

    #[test]
    fn text_report_ends_every_line_with_newline() {
        let mut out = Vec::new();

        write_text_report(&ledger(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 4);
        assert!(text.ends_with("3261.70 €\n"));
    }

    #[test]
    fn export_format_parse_and_defaults() {
        assert_eq!(ExportFormat::parse("CSV"), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::parse("txt"), Some(ExportFormat::Text));
        assert_eq!(ExportFormat::parse("docx"), None);
        assert_eq!(ExportFormat::Pdf.default_path(), "netto_verlauf.pdf");
    }

    #[test]
    fn unwritable_path_is_an_io_error_naming_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");

        let err = export_csv(&ledger(), &path).unwrap_err();

        assert!(matches!(err, ExportError::Io { path: ref p, .. } if *p == path));
    }
}
