//! Drives the prompt commands against a seeded in-memory SQLite database.

use lohn_core::Region;
use lohn_ui::app::{self, Reply};
use lohn_ui::command::FormCommand;
use lohn_ui::session::Session;
use lohn_ui::settings::{Settings, Theme};
use lohn_ui::view::Palette;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

fn memory_settings() -> Settings {
    Settings {
        db: ":memory:".to_string(),
        ..Settings::default()
    }
}

fn plain() -> Palette {
    colored::control::set_override(false);
    Palette::for_theme(Theme::Light)
}

async fn run(
    session: &mut Session,
    line: &str,
) -> Reply {
    let command = FormCommand::parse(line).unwrap().unwrap();
    app::dispatch(session, command, &plain()).await
}

fn shown(reply: Reply) -> String {
    match reply {
        Reply::Show(text) => text,
        Reply::Quit => panic!("unexpected quit"),
    }
}

#[test]
fn test_registry_offers_sqlite() {
    assert_eq!(app::build_registry().available_backends(), vec!["sqlite"]);
}

#[tokio::test]
async fn test_open_session_with_unknown_backend_fails() {
    let settings = Settings {
        backend: "postgres".to_string(),
        ..memory_settings()
    };

    let err = app::open_session(&settings).await.err().unwrap();

    assert!(format!("{err:#}").contains("sqlite"));
}

#[tokio::test]
async fn test_open_session_with_unsupported_year_fails() {
    let settings = Settings {
        year: 1999,
        ..memory_settings()
    };

    assert!(app::open_session(&settings).await.is_err());
}

#[tokio::test]
async fn test_seeded_session_offers_regional_insurers() {
    let mut session = app::open_session(&memory_settings()).await.unwrap();

    let listing = shown(run(&mut session, "land Sachsen").await);

    assert_eq!(session.form().region, Region::Sachsen);
    assert!(listing.contains("AOK PLUS (17.7%)"));
    assert!(listing.contains("Techniker Krankenkasse (17.05%)"));
    assert!(!listing.contains("AOK Bayern"));
}

#[tokio::test]
async fn test_prompt_flow_computes_and_saves() {
    let mut session = app::open_session(&memory_settings()).await.unwrap();

    run(&mut session, "land BE").await;
    run(&mut session, "kasse Techniker").await;
    let status = shown(run(&mut session, "3000").await);
    assert!(status.starts_with("Netto: "));

    let saved = shown(run(&mut session, "speichern").await);
    assert!(saved.starts_with("Gespeichert: 3000 | Berlin | 1 | Nein | Techniker Krankenkasse"));

    let history = shown(run(&mut session, "verlauf").await);
    assert_eq!(history.lines().count(), 2);
    assert!(session.history().entries()[0].net_pay > dec!(2000));
}

#[tokio::test]
async fn test_calculate_shows_breakdown() {
    let mut session = app::open_session(&memory_settings()).await.unwrap();
    run(&mut session, "brutto 3000").await;

    let text = shown(run(&mut session, "berechnen").await);

    assert!(text.contains("Lohnsteuer"));
    assert!(text.contains("316.83 €"));
}

#[tokio::test]
async fn test_errors_are_shown_inline() {
    let mut session = app::open_session(&memory_settings()).await.unwrap();

    assert_eq!(shown(run(&mut session, "speichern").await), "Fehler: Bruttogehalt fehlt");
    assert_eq!(
        shown(run(&mut session, "kasse 99").await),
        "Fehler: Unbekannte Krankenkasse: #99"
    );
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn test_quit_ends_the_loop() {
    let mut session = app::open_session(&memory_settings()).await.unwrap();

    assert_eq!(run(&mut session, "ende").await, Reply::Quit);
}
