//! YAML configuration file and its merge with command-line flags.
//!
//! ```yaml
//! endpoint: http://localhost:5000
//! language: en
//! store_dir: /var/lib/news_pulse
//! speech:
//!   tts_command: espeak -v en
//!   stt_command: /usr/local/bin/transcribe-once
//! ```
//!
//! Precedence: command-line flag, then file value, then built-in default.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::cli::Cli;
use crate::render::Theme;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_STORE_DIR: &str = ".news_pulse";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Contents of the YAML file. Every field is optional.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub endpoint: Option<String>,
    pub language: Option<String>,
    pub store_dir: Option<PathBuf>,
    pub speech: SpeechConfig,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SpeechConfig {
    pub tts_command: Option<String>,
    pub stt_command: Option<String>,
}

impl FileConfig {
    pub fn from_yaml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&text, path)?;
        info!("Loaded configuration");
        Ok(config)
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: String,
    pub language: String,
    pub store_dir: PathBuf,
    pub tts_command: Option<String>,
    pub stt_command: Option<String>,
    pub theme: Theme,
    pub initial_query: Option<String>,
}

impl Settings {
    /// Resolve settings from parsed flags, reading `--config` when given.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Ok(Self::merge(cli, file))
    }

    pub fn merge(cli: &Cli, file: FileConfig) -> Self {
        let settings = Self {
            endpoint: cli
                .endpoint
                .clone()
                .or(file.endpoint)
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            language: cli
                .language
                .clone()
                .or(file.language)
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            store_dir: cli
                .store_dir
                .clone()
                .or(file.store_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR)),
            tts_command: cli.tts_command.clone().or(file.speech.tts_command),
            stt_command: cli.stt_command.clone().or(file.speech.stt_command),
            theme: if cli.dark { Theme::Dark } else { Theme::Light },
            initial_query: cli.query.clone(),
        };
        debug!(?settings, "Resolved settings");
        settings
    }
}
