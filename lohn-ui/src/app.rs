//! Wiring from settings to a ready session.

use anyhow::{Context, Result};
use lohn_core::calculations::{ContributionRates, NetSalaryCalculator, WageTaxRegistry};
use lohn_core::db::RepositoryRegistry;
use lohn_db_sqlite::SqliteRepositoryFactory;
use tracing::{debug, info};

use crate::command::{FormCommand, InsurerChoice, LogCommand};
use crate::logging;
use crate::session::{FormStatus, Session};
use crate::settings::Settings;
use crate::view::{self, Palette};

/// Registry with every database backend compiled into the binary.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

/// Opens the configured backend and wage-tax engine and starts a session.
pub async fn open_session(settings: &Settings) -> Result<Session> {
    let db_config = settings.db_config();
    debug!("connecting to {} backend", db_config.backend);
    let repo = build_registry()
        .create(&db_config)
        .await
        .with_context(|| {
            format!("cannot open insurer database '{}'", db_config.connection_string)
        })?;

    let engine = WageTaxRegistry::with_builtin_engines()
        .get(settings.year)
        .context("no wage-tax engine for the configured year")?;

    let rates = ContributionRates::statutory_2025();
    rates.validate().context("invalid contribution rates")?;

    info!(year = settings.year, backend = %db_config.backend, "session ready");
    Ok(Session::open(repo, engine, NetSalaryCalculator::new(rates)).await)
}

/// What the prompt loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Text to print, possibly empty.
    Show(String),
    Quit,
}

/// Applies one parsed command to the session and renders the reply.
pub async fn dispatch(
    session: &mut Session,
    command: FormCommand,
    palette: &Palette,
) -> Reply {
    let text = match command {
        FormCommand::Gross(text) => view::render_status(session.set_gross_text(&text), palette),
        FormCommand::Region(region) => {
            let status = view::render_status(session.set_region(region).await, palette);
            format!("{}\n{status}", view::render_insurers(session.form(), palette))
        }
        FormCommand::TaxClass(class) => view::render_status(session.set_tax_class(class), palette),
        FormCommand::ChurchTax(on) => view::render_status(session.set_church_tax(on), palette),
        FormCommand::Insurer(choice) => {
            let selected = match choice {
                InsurerChoice::Position(n) => session.select_insurer_index(n),
                InsurerChoice::Name(name) => session.select_insurer_name(&name),
            };
            match selected {
                Ok(status) => view::render_status(status, palette),
                Err(e) => error_line(&e, palette),
            }
        }
        FormCommand::Calculate => {
            let status = session.recalculate().clone();
            let mut out = view::render_form(session.form(), palette);
            if let Some(result) = status.result() {
                out.push_str("\n\n");
                out.push_str(&view::render_breakdown(result, palette));
            } else {
                out.push('\n');
                out.push_str(&view::render_status(&status, palette));
            }
            out
        }
        FormCommand::Save => match session.save() {
            Ok(entry) => format!("Gespeichert: {}", entry.fields().join(" | ")),
            Err(e) => error_line(&e, palette),
        },
        FormCommand::History => view::render_history(session.history(), palette),
        FormCommand::Insurers => view::render_insurers(session.form(), palette),
        FormCommand::Export { format, path } => match session.export(format, path.as_deref()) {
            Ok(()) => {
                let target = path
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| format.default_path().to_string());
                format!("{} Einträge nach {target} exportiert", session.history().len())
            }
            Err(e) => error_line(&e, palette),
        },
        FormCommand::Log(command) => match apply_log(command) {
            Ok(message) => message,
            Err(e) => error_line(&format!("{e:#}"), palette),
        },
        FormCommand::Help => view::help_text().to_string(),
        FormCommand::Quit => return Reply::Quit,
    };
    Reply::Show(text)
}

fn apply_log(command: LogCommand) -> Result<String> {
    Ok(match command {
        LogCommand::Level(level) => {
            logging::set_log_level(&level)?;
            format!("Log-Level: {level}")
        }
        LogCommand::Console(true) => {
            logging::set_console_enabled(true)?;
            "Log-Ausgabe auf der Konsole an".to_string()
        }
        LogCommand::Console(false) => {
            logging::set_console_enabled(false)?;
            "Log-Ausgabe auf der Konsole aus".to_string()
        }
        LogCommand::File(path) => {
            logging::enable_file_logging(&path)?;
            format!("Log-Datei: {}", path.display())
        }
        LogCommand::FileOff => {
            logging::disable_file_logging();
            "Log-Datei geschlossen".to_string()
        }
    })
}

fn error_line(
    error: &dyn std::fmt::Display,
    palette: &Palette,
) -> String {
    view::render_status(&FormStatus::Failed(error.to_string()), palette)
}
