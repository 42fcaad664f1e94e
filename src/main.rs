//! # news_pulse
//!
//! A terminal news desk on top of a `/get_news` backend. It renders article
//! cards with sentiment badges, keeps a sentiment chart for the page on screen,
//! and remembers favorites and recent searches between runs.
//!
//! ## Features
//!
//! - Search, category quick filters and a language selector
//! - Infinite scroll via `more`, with at most one page request in flight
//! - Favorites and search history persisted as JSON in a local store directory
//! - Optional text-to-speech and voice search through platform commands
//! - Dark mode
//!
//! ## Usage
//!
//! ```sh
//! news_pulse --endpoint http://localhost:5000 --language en
//! ```
//!
//! ## Architecture
//!
//! 1. **Configuration**: CLI flags merged over an optional YAML file
//! 2. **Startup**: load favorites and history, fetch the first page
//! 3. **Loop**: input lines and page completions are raced with `select!`;
//!    each line is parsed into an action and dispatched, each completion is
//!    applied (or dropped when superseded)
//! 4. **Persistence**: every favorites/history mutation is written through

use clap::Parser;
use std::error::Error;
use std::io::Write as _;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod app;
mod cli;
mod config;
mod favorites;
mod history;
mod models;
mod pagination;
mod render;
mod sentiment;
mod store;
mod utils;
mod voice;

use api::HttpNewsClient;
use app::{Action, App, Flow, ParseActionError};
use cli::Cli;
use config::Settings;
use store::LocalStore;
use utils::ensure_writable_dir;
use voice::VoiceBridge;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = Instant::now();
    info!("news_pulse starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");
    let settings = Settings::resolve(&args)?;

    // Early check: the store must be writable before anything is favorited
    ensure_writable_dir(&settings.store_dir)?;
    let store = LocalStore::new(&settings.store_dir);

    let client = HttpNewsClient::new(&settings.endpoint)?;
    info!(endpoint = %settings.endpoint, language = %settings.language, "News client ready");

    let voice = VoiceBridge::detect(settings.tts_command.as_deref(), settings.stt_command.as_deref());
    let mut app = App::new(client, store, &settings.language, settings.theme, voice);

    app.startup(settings.initial_query.as_deref());
    flush(&mut app)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Action::parse(&line) {
                    Ok(action) => {
                        if app.dispatch(action).await == Flow::Quit {
                            break;
                        }
                    }
                    Err(ParseActionError::Empty) => {}
                    Err(e) => {
                        warn!(input = %line, error = %e, "Unrecognized input");
                        println!("{e}");
                    }
                }
                flush(&mut app)?;
            }
            () = app.next_completion() => {
                // Superseded responses print nothing; keep the prompt as is
                if app.has_output() {
                    println!();
                    flush(&mut app)?;
                }
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), "Session complete");
    Ok(())
}

/// Print pending output, the live alert (if any), and the prompt.
fn flush<S>(app: &mut App<S>) -> std::io::Result<()> {
    let out = app.take_output();
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(out.as_bytes())?;
    // Alerts linger on the prompt until they expire
    if let Some(alert) = app.visible_alert(Instant::now()) {
        if !out.contains(&alert.message) {
            writeln!(stdout, "[alert] {}", alert.message)?;
        }
    }
    let prompt = if app.is_loading() { "⏳> " } else { "> " };
    write!(stdout, "{prompt}")?;
    stdout.flush()
}
