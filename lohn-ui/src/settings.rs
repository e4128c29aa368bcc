//! User settings: an optional `settings.toml`, overridden by CLI flags.
//!
//! ```toml
//! theme = "dark"
//! lang = "en"
//! backend = "sqlite"
//! db = "krankenkassen.db"
//! year = 2025
//! log_level = "info"
//! log_file = "brutto-netto.log"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use lohn_core::db::DbConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File read when `--settings` is not given. A missing default file is not an error.
pub const DEFAULT_SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Colour palette of the terminal form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Language of the window title. All other text is German.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    De,
    En,
}

impl Language {
    pub fn window_title(&self) -> &'static str {
        match self {
            Self::De => "Brutto-Netto-Rechner",
            Self::En => "Gross-to-Net Calculator",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(match self {
            Self::Light => "light",
            Self::Dark => "dark",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub theme: Theme,
    pub lang: Language,
    pub backend: String,
    pub db: String,
    pub year: i32,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        let db = DbConfig::default();
        Self {
            theme: Theme::default(),
            lang: Language::default(),
            backend: db.backend,
            db: db.connection_string,
            year: 2025,
            log_level: "warn".to_string(),
            log_file: None,
        }
    }
}

/// Values given on the command line; `None` keeps the file value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub theme: Option<Theme>,
    pub lang: Option<Language>,
    pub backend: Option<String>,
    pub db: Option<String>,
    pub year: Option<i32>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    pub fn parse(
        text: &str,
        path: &Path,
    ) -> Result<Self, SettingsError> {
        toml::from_str(text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads `path`, or the default file when `path` is `None`.
    ///
    /// An explicitly named file must exist; a missing default file yields
    /// [`Settings::default`].
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_SETTINGS_FILE), false),
        };

        match std::fs::read_to_string(&path) {
            Ok(text) => Self::parse(&text, &path),
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(SettingsError::Io { path, source }),
        }
    }

    pub fn with_overrides(
        mut self,
        overrides: Overrides,
    ) -> Self {
        if let Some(theme) = overrides.theme {
            self.theme = theme;
        }
        if let Some(lang) = overrides.lang {
            self.lang = lang;
        }
        if let Some(backend) = overrides.backend {
            self.backend = backend;
        }
        if let Some(db) = overrides.db {
            self.db = db;
        }
        if let Some(year) = overrides.year {
            self.year = year;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        if overrides.log_file.is_some() {
            self.log_file = overrides.log_file;
        }
        self
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            backend: self.backend.clone(),
            connection_string: self.db.clone(),
        }
    }
}
