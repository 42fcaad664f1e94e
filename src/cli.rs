//! Command-line interface definitions for news_pulse.
//!
//! Flags can also be supplied through environment variables, and any flag left
//! unset falls back to the YAML config file (see [`crate::config`]).

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Talk to a local backend and start on the default query
/// news_pulse
///
/// # Remote backend, French results, open on a query in dark mode
/// news_pulse --endpoint https://news.example.com --language fr --query climat --dark
///
/// # Read settings from a file
/// news_pulse --config ~/.config/news_pulse.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Base URL of the news backend
    #[arg(short, long, env = "NEWS_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Language code sent with every request
    #[arg(short, long, env = "NEWS_LANGUAGE")]
    pub language: Option<String>,

    /// Directory holding favorites and search history
    #[arg(short, long, env = "NEWS_STORE_DIR")]
    pub store_dir: Option<PathBuf>,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Query to show on startup instead of the default
    #[arg(short, long)]
    pub query: Option<String>,

    /// Start in dark mode
    #[arg(long)]
    pub dark: bool,

    /// Command used to read text aloud, e.g. "espeak -v en"
    #[arg(long, env = "NEWS_TTS_COMMAND")]
    pub tts_command: Option<String>,

    /// Command that records one utterance and prints its transcript
    #[arg(long, env = "NEWS_STT_COMMAND")]
    pub stt_command: Option<String>,
}
