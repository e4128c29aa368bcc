//! Parser for the lines typed at the form prompt.

use std::path::PathBuf;

use lohn_core::{Region, TaxClass};
use thiserror::Error;

use crate::export::ExportFormat;

/// Command words offered for completion, German first.
pub const COMMANDS: &[&str] = &[
    "brutto", "land", "klasse", "kirche", "kasse", "berechnen", "speichern", "verlauf", "kassen",
    "export", "log", "hilfe", "ende", "gross", "state", "class", "church", "insurer", "calc",
    "save", "history", "insurers", "help", "quit", "exit",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsurerChoice {
    /// 1-based position in the insurer list.
    Position(usize),
    Name(String),
}

/// `log ...`: the filter, the stderr output, or the log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogCommand {
    /// A level such as `debug` or a full filter directive.
    Level(String),
    Console(bool),
    File(PathBuf),
    FileOff,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormCommand {
    /// Sets the gross pay text; an empty string clears it.
    Gross(String),
    Region(Region),
    TaxClass(TaxClass),
    ChurchTax(bool),
    Insurer(InsurerChoice),
    Calculate,
    Save,
    History,
    Insurers,
    Export {
        format: ExportFormat,
        path: Option<PathBuf>,
    },
    Log(LogCommand),
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unbekannter Befehl '{0}' (hilfe zeigt alle Befehle)")]
    Unknown(String),

    #[error("'{command}' braucht ein Argument: {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("Ungültiger Wert '{value}' für '{command}': erwartet {expected}")]
    InvalidArgument {
        command: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl FormCommand {
    /// Parses one input line. Returns `Ok(None)` for a blank line.
    ///
    /// A line that starts like a number (digit, sign or decimal separator)
    /// is taken as the gross pay, so typing `3000` alone is the same as
    /// `brutto 3000`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        if line.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '-' | '+' | ',' | '.')) {
            return Ok(Some(Self::Gross(line.to_string())));
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "brutto" | "gross" => Self::Gross(rest.to_string()),
            "land" | "bundesland" | "state" | "region" => {
                let arg = require(rest, "land", "Bundesland")?;
                Self::Region(Region::parse(arg).ok_or_else(|| CommandError::InvalidArgument {
                    command: "land",
                    value: arg.to_string(),
                    expected: "einen der 16 Bundesländer",
                })?)
            }
            "klasse" | "steuerklasse" | "class" => {
                let arg = require(rest, "klasse", "1-6")?;
                Self::TaxClass(TaxClass::parse(arg).ok_or_else(|| CommandError::InvalidArgument {
                    command: "klasse",
                    value: arg.to_string(),
                    expected: "1-6",
                })?)
            }
            "kirche" | "church" => {
                let arg = require(rest, "kirche", "an|aus")?;
                Self::ChurchTax(parse_toggle(arg).ok_or_else(|| CommandError::InvalidArgument {
                    command: "kirche",
                    value: arg.to_string(),
                    expected: "an|aus",
                })?)
            }
            "kasse" | "insurer" => {
                let arg = require(rest, "kasse", "Name oder Nummer")?;
                let choice = match arg.trim_start_matches('#').parse::<usize>() {
                    Ok(n) => InsurerChoice::Position(n),
                    Err(_) => InsurerChoice::Name(arg.to_string()),
                };
                Self::Insurer(choice)
            }
            "berechnen" | "calc" | "calculate" => Self::Calculate,
            "speichern" | "save" => Self::Save,
            "verlauf" | "history" => Self::History,
            "kassen" | "insurers" => Self::Insurers,
            "export" => {
                let arg = require(rest, "export", "csv|pdf|txt [Datei]")?;
                let (kind, path) = match arg.split_once(char::is_whitespace) {
                    Some((kind, path)) => (kind, Some(PathBuf::from(path.trim()))),
                    None => (arg, None),
                };
                let format = ExportFormat::parse(kind).ok_or_else(|| CommandError::InvalidArgument {
                    command: "export",
                    value: kind.to_string(),
                    expected: "csv|pdf|txt",
                })?;
                Self::Export { format, path }
            }
            "log" => Self::Log(parse_log(require(rest, "log", LOG_USAGE)?)?),
            "hilfe" | "help" | "?" => Self::Help,
            "ende" | "quit" | "exit" => Self::Quit,
            _ => return Err(CommandError::Unknown(word.to_string())),
        };
        Ok(Some(command))
    }
}

fn require<'a>(
    rest: &'a str,
    command: &'static str,
    expected: &'static str,
) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument { command, expected })
    } else {
        Ok(rest)
    }
}

const LOG_USAGE: &str = "<Level> | konsole an|aus | datei <Pfad>|aus";

fn parse_log(arg: &str) -> Result<LogCommand, CommandError> {
    let (target, value) = match arg.split_once(char::is_whitespace) {
        Some((target, value)) => (target, value.trim()),
        None => (arg, ""),
    };
    match target.to_lowercase().as_str() {
        "konsole" | "console" => {
            let on = parse_toggle(value).ok_or_else(|| CommandError::InvalidArgument {
                command: "log konsole",
                value: value.to_string(),
                expected: "an|aus",
            })?;
            Ok(LogCommand::Console(on))
        }
        "datei" | "file" => match parse_toggle(value) {
            Some(false) => Ok(LogCommand::FileOff),
            _ if value.is_empty() => Err(CommandError::MissingArgument {
                command: "log datei",
                expected: "<Pfad>|aus",
            }),
            _ => Ok(LogCommand::File(PathBuf::from(value))),
        },
        _ => Ok(LogCommand::Level(arg.to_string())),
    }
}

fn parse_toggle(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "an" | "ja" | "ein" | "on" | "yes" | "1" => Some(true),
        "aus" | "nein" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(line: &str) -> FormCommand {
        FormCommand::parse(line).unwrap().unwrap()
    }

    #[test]
    fn blank_line_is_no_command() {
        assert_eq!(FormCommand::parse("   "), Ok(None));
    }

    #[test]
    fn bare_number_sets_gross() {
        assert_eq!(parse("3.000,50"), FormCommand::Gross("3.000,50".to_string()));
    }

    #[test]
    fn signed_or_fractional_amount_sets_gross() {
        assert_eq!(parse("-3000"), FormCommand::Gross("-3000".to_string()));
        assert_eq!(parse("+3000"), FormCommand::Gross("+3000".to_string()));
        assert_eq!(parse(",5"), FormCommand::Gross(",5".to_string()));
        assert_eq!(parse(".5"), FormCommand::Gross(".5".to_string()));
    }

    #[test]
    fn brutto_without_argument_clears_gross() {
        assert_eq!(parse("brutto"), FormCommand::Gross(String::new()));
    }

    #[test]
    fn region_accepts_multi_word_names_and_codes() {
        assert_eq!(parse("land Sachsen-Anhalt"), FormCommand::Region(Region::SachsenAnhalt));
        assert_eq!(parse("land by"), FormCommand::Region(Region::Bayern));
        assert_eq!(parse("state Thueringen"), FormCommand::Region(Region::Thueringen));
    }

    #[test]
    fn unknown_region_is_invalid() {
        assert!(matches!(
            FormCommand::parse("land Sachs"),
            Err(CommandError::InvalidArgument { command: "land", .. })
        ));
    }

    #[test]
    fn tax_class_range() {
        assert_eq!(parse("klasse 3"), FormCommand::TaxClass(TaxClass::III));
        assert!(FormCommand::parse("klasse 7").is_err());
    }

    #[test]
    fn church_toggle_words() {
        assert_eq!(parse("kirche an"), FormCommand::ChurchTax(true));
        assert_eq!(parse("church off"), FormCommand::ChurchTax(false));
        assert!(FormCommand::parse("kirche vielleicht").is_err());
    }

    #[test]
    fn insurer_by_position_or_name() {
        assert_eq!(parse("kasse 2"), FormCommand::Insurer(InsurerChoice::Position(2)));
        assert_eq!(parse("kasse #3"), FormCommand::Insurer(InsurerChoice::Position(3)));
        assert_eq!(
            parse("kasse AOK PLUS"),
            FormCommand::Insurer(InsurerChoice::Name("AOK PLUS".to_string()))
        );
    }

    #[test]
    fn export_with_and_without_path() {
        assert_eq!(
            parse("export csv"),
            FormCommand::Export {
                format: ExportFormat::Csv,
                path: None
            }
        );
        assert_eq!(
            parse("export pdf /tmp/verlauf.pdf"),
            FormCommand::Export {
                format: ExportFormat::Pdf,
                path: Some(PathBuf::from("/tmp/verlauf.pdf"))
            }
        );
    }

    #[test]
    fn missing_argument_names_the_command() {
        assert_eq!(
            FormCommand::parse("export"),
            Err(CommandError::MissingArgument {
                command: "export",
                expected: "csv|pdf|txt [Datei]"
            })
        );
    }

    #[test]
    fn log_targets() {
        assert_eq!(parse("log debug"), FormCommand::Log(LogCommand::Level("debug".to_string())));
        assert_eq!(
            parse("log lohn_core=trace,warn"),
            FormCommand::Log(LogCommand::Level("lohn_core=trace,warn".to_string()))
        );
        assert_eq!(parse("log konsole aus"), FormCommand::Log(LogCommand::Console(false)));
        assert_eq!(parse("log console on"), FormCommand::Log(LogCommand::Console(true)));
        assert_eq!(parse("log datei aus"), FormCommand::Log(LogCommand::FileOff));
        assert_eq!(
            parse("log datei /tmp/lohn.log"),
            FormCommand::Log(LogCommand::File(PathBuf::from("/tmp/lohn.log")))
        );
        assert!(FormCommand::parse("log datei").is_err());
        assert!(FormCommand::parse("log konsole leise").is_err());
    }

    #[test]
    fn english_aliases() {
        assert_eq!(parse("calc"), FormCommand::Calculate);
        assert_eq!(parse("save"), FormCommand::Save);
        assert_eq!(parse("quit"), FormCommand::Quit);
    }

    #[test]
    fn unknown_word_is_reported() {
        assert_eq!(
            FormCommand::parse("drucken"),
            Err(CommandError::Unknown("drucken".to_string()))
        );
    }
}
