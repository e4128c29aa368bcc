use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use lohn_core::{Region, TaxClass};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing::{debug, info, warn};

use lohn_ui::app::{self, Reply};
use lohn_ui::command::{COMMANDS, FormCommand};
use lohn_ui::logging;
use lohn_ui::session::{FormStatus, Session};
use lohn_ui::settings::{Language, Overrides, Settings, Theme};
use lohn_ui::view::{self, Palette};

// ─── CLI definition ───

/// German gross-to-net salary calculator.
///
/// Without a subcommand an interactive form is started. Every option
/// overrides the matching key of the settings file.
#[derive(Debug, Parser)]
#[command(name = "BruttoNetto", version)]
struct Cli {
    /// Settings file (default: `settings.toml` in the working directory, if present).
    #[arg(long)]
    settings: Option<PathBuf>,

    #[arg(long, value_enum)]
    theme: Option<Theme>,

    #[arg(long, value_enum)]
    lang: Option<Language>,

    /// Database backend to use.
    #[arg(long)]
    backend: Option<String>,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `krankenkassen.db`) or `:memory:`.
    #[arg(long)]
    db: Option<String>,

    /// Tax year of the wage-tax engine.
    #[arg(long)]
    year: Option<i32>,

    /// Log filter: a level such as `info` or a full `RUST_LOG` directive.
    #[arg(long)]
    log_level: Option<String>,

    /// Also append log output to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Computes one net salary and prints the breakdown.
    Calc {
        /// Monthly gross pay, e.g. `3000` or `3.000,50`.
        #[arg(long)]
        brutto: String,

        /// Federal state, name or two-letter code.
        #[arg(long, default_value = "BW")]
        land: String,

        /// Tax class 1-6.
        #[arg(long, default_value = "1")]
        klasse: String,

        /// Church member.
        #[arg(long)]
        kirche: bool,

        /// Health insurer name or unique prefix; the first insurer otherwise.
        #[arg(long)]
        kasse: Option<String>,
    },
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            theme: self.theme,
            lang: self.lang,
            backend: self.backend.clone(),
            db: self.db.clone(),
            year: self.year,
            log_level: self.log_level.clone(),
            log_file: self.log_file.clone(),
        }
    }
}

// ─── prompt helper ───

/// Completion, hints and highlighting for the form prompt.
#[derive(Clone)]
struct FormHelper {
    commands: &'static [&'static str],
}

impl FormHelper {
    fn new() -> Self {
        Self { commands: COMMANDS }
    }

    fn is_command(
        &self,
        word: &str,
    ) -> bool {
        self.commands.contains(&word.to_lowercase().as_str())
    }
}

impl Helper for FormHelper {}

impl Completer for FormHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if line.is_empty() || line.contains(' ') {
            return Ok((0, vec![]));
        }

        let candidates = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: format!("{cmd} "),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for FormHelper {
    fn highlight<'l>(
        &self,
        line: &'l str,
        _pos: usize,
    ) -> Cow<'l, str> {
        let word = line.split(' ').next().unwrap_or_default();
        if self.is_command(word) {
            let rest = &line[word.len()..];
            Owned(format!("{}{rest}", word.bright_cyan()))
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(
        &self,
        _line: &str,
        _pos: usize,
        _forced: bool,
    ) -> bool {
        true
    }
}

impl Hinter for FormHelper {
    type Hint = String;

    fn hint(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> Option<String> {
        let line = &line[..pos];
        if line.is_empty() || line.contains(' ') {
            return None;
        }
        self.commands
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].bright_black().to_string())
    }
}

impl Validator for FormHelper {}

// ─── modes ───

async fn run_form(
    mut session: Session,
    settings: &Settings,
) -> Result<()> {
    let palette = Palette::for_theme(settings.theme);
    let mut rl = Editor::new()?;
    rl.set_helper(Some(FormHelper::new()));

    println!("{}", view::banner(settings.lang.window_title(), &palette));
    println!("{}", view::render_form(session.form(), &palette));
    println!();

    loop {
        match rl.readline("brutto-netto> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                let command = match FormCommand::parse(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        println!("{}", e.to_string().red());
                        continue;
                    }
                };
                debug!(?command, "form command");

                match app::dispatch(&mut session, command, &palette).await {
                    Reply::Show(text) if text.is_empty() => {}
                    Reply::Show(text) => println!("{text}"),
                    Reply::Quit => break,
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "Strg-C: 'ende' beendet das Programm".yellow());
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                warn!(error = %err, "prompt failed");
                return Err(err.into());
            }
        }
    }

    info!(saved = session.history().len(), "form closed");
    Ok(())
}

async fn run_calc(
    mut session: Session,
    settings: &Settings,
    command: Command,
) -> Result<()> {
    let Command::Calc {
        brutto,
        land,
        klasse,
        kirche,
        kasse,
    } = command;

    let Some(region) = Region::parse(&land) else {
        bail!("unknown federal state '{land}'");
    };
    let Some(tax_class) = TaxClass::parse(&klasse) else {
        bail!("tax class must be 1-6, got '{klasse}'");
    };

    session.set_region(region).await;
    session.set_tax_class(tax_class);
    session.set_church_tax(kirche);
    if let Some(name) = kasse {
        session.select_insurer_name(&name)?;
    }

    let palette = Palette::for_theme(settings.theme);
    match session.set_gross_text(&brutto).clone() {
        FormStatus::Computed(result) => {
            println!("{}\n", view::render_form(session.form(), &palette));
            println!("{}", view::render_breakdown(&result, &palette));
            Ok(())
        }
        FormStatus::Failed(message) => bail!(message),
        FormStatus::Idle => bail!("Bruttogehalt fehlt"),
    }
}

// ─── entry point ───

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.settings.as_deref())?.with_overrides(cli.overrides());

    logging::init_logging(&settings.log_level);
    if let Some(path) = &settings.log_file {
        logging::enable_file_logging(path)?;
    }
    debug!(?settings, "settings loaded");

    let session = app::open_session(&settings).await?;

    match cli.command {
        Some(command) => run_calc(session, &settings, command).await,
        None => run_form(session, &settings).await,
    }
}
