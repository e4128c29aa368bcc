//! The `log` prompt command against the process-wide subscriber.
//!
//! Everything runs in one test: the subscriber is global to this binary.

use lohn_ui::app::{self, Reply};
use lohn_ui::command::FormCommand;
use lohn_ui::logging;
use lohn_ui::session::Session;
use lohn_ui::settings::{Settings, Theme};
use lohn_ui::view::Palette;
use pretty_assertions::assert_eq;

async fn run(
    session: &mut Session,
    line: &str,
) -> String {
    colored::control::set_override(false);
    let command = FormCommand::parse(line).unwrap().unwrap();
    match app::dispatch(session, command, &Palette::for_theme(Theme::Light)).await {
        Reply::Show(text) => text,
        Reply::Quit => panic!("unexpected quit"),
    }
}

#[tokio::test]
async fn test_log_command_switches_outputs() {
    logging::init_logging("warn");
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("brutto-netto.log");
    let settings = Settings {
        db: ":memory:".to_string(),
        ..Settings::default()
    };
    let mut session = app::open_session(&settings).await.unwrap();

    assert_eq!(run(&mut session, "log konsole aus").await, "Log-Ausgabe auf der Konsole aus");
    let reply = run(&mut session, &format!("log datei {}", path.display())).await;
    assert_eq!(reply, format!("Log-Datei: {}", path.display()));

    tracing::warn!("eintrag bei offener datei");
    assert_eq!(run(&mut session, "log datei aus").await, "Log-Datei geschlossen");
    tracing::warn!("eintrag nach dem schliessen");

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("eintrag bei offener datei"));
    assert!(!text.contains("nach dem schliessen"));

    assert_eq!(run(&mut session, "log info").await, "Log-Level: info");
    assert_eq!(run(&mut session, "log konsole an").await, "Log-Ausgabe auf der Konsole an");
    assert!(run(&mut session, "log [kaputt").await.starts_with("Fehler: invalid log level"));
}

#[tokio::test]
async fn test_missing_log_directory_is_reported() {
    logging::init_logging("warn");
    let settings = Settings {
        db: ":memory:".to_string(),
        ..Settings::default()
    };
    let mut session = app::open_session(&settings).await.unwrap();

    let reply = run(&mut session, "log datei /nonexistent-dir/x.log").await;

    assert!(reply.starts_with("Fehler: cannot open log file"));
}
