//! Application state and the action dispatch table.
//!
//! Input lines are parsed into an [`Action`] by looking the first word up in
//! [`COMMANDS`]. [`App::dispatch`] then routes each action to its handler.
//! Handlers never print directly; they append to an output buffer that the
//! caller drains with [`App::take_output`].
//!
//! Page requests never block input. Each one is queued with its [`Ticket`] and
//! the caller drives them with [`App::next_completion`] alongside the input
//! loop, so a newer request can supersede one that is still in flight.

use futures::future::LocalBoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use std::fmt::Write;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::api::{FetchError, NewsSource};
use crate::favorites::Favorites;
use crate::history::SearchHistory;
use crate::models::NewsItem;
use crate::pagination::{Completion, Pager, Ticket};
use crate::render::{self, Theme};
use crate::sentiment::ChartSlot;
use crate::store::{LocalStore, StoreError};
use crate::utils::clean_category_label;
use crate::voice::VoiceBridge;

/// How long an alert stays visible.
pub const ALERT_TTL: Duration = Duration::from_secs(4);

/// A user intent, decoupled from how it was entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Search(String),
    Category(String),
    More,
    Show,
    Favorite(usize),
    Unfavorite(usize),
    Listen(usize),
    ReadMore(usize),
    Rerun(usize),
    Forget(usize),
    Favorites,
    History,
    Chart,
    Language(String),
    Dark(Option<bool>),
    Voice,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseActionError {
    #[error("empty input")]
    Empty,

    #[error("unknown command `{0}`; type `help` for a list")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

type ParseFn = fn(&str) -> Option<Action>;

/// One entry of the command table.
pub struct CommandSpec {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    parse: ParseFn,
}

fn index(arg: &str) -> Option<usize> {
    arg.trim().parse::<usize>().ok().filter(|n| *n >= 1)
}

fn bare(arg: &str, action: Action) -> Option<Action> {
    arg.trim().is_empty().then_some(action)
}

/// 1-based lookup used by every indexed action.
fn nth<T>(list: &[T], n: usize) -> Option<&T> {
    n.checked_sub(1).and_then(|i| list.get(i))
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "search",
        usage: "search <text>",
        help: "search news (blank searches technology)",
        parse: |arg| Some(Action::Search(arg.to_string())),
    },
    CommandSpec {
        name: "category",
        usage: "category <name>",
        help: "quick filter, e.g. `category ⚽ Sports`",
        parse: |arg| (!arg.trim().is_empty()).then(|| Action::Category(arg.to_string())),
    },
    CommandSpec {
        name: "more",
        usage: "more",
        help: "load the next page of the last query",
        parse: |arg| bare(arg, Action::More),
    },
    CommandSpec {
        name: "show",
        usage: "show",
        help: "show the current cards again",
        parse: |arg| bare(arg, Action::Show),
    },
    CommandSpec {
        name: "fav",
        usage: "fav <card>",
        help: "add a card to favorites",
        parse: |arg| index(arg).map(Action::Favorite),
    },
    CommandSpec {
        name: "unfav",
        usage: "unfav <favorite>",
        help: "remove a favorite",
        parse: |arg| index(arg).map(Action::Unfavorite),
    },
    CommandSpec {
        name: "listen",
        usage: "listen <card>",
        help: "read a card's summary aloud",
        parse: |arg| index(arg).map(Action::Listen),
    },
    CommandSpec {
        name: "open",
        usage: "open <card>",
        help: "print a card's article link",
        parse: |arg| index(arg).map(Action::ReadMore),
    },
    CommandSpec {
        name: "rerun",
        usage: "rerun <search>",
        help: "run a recent search again",
        parse: |arg| index(arg).map(Action::Rerun),
    },
    CommandSpec {
        name: "forget",
        usage: "forget <search>",
        help: "delete a recent search",
        parse: |arg| index(arg).map(Action::Forget),
    },
    CommandSpec {
        name: "favorites",
        usage: "favorites",
        help: "show the favorites panel",
        parse: |arg| bare(arg, Action::Favorites),
    },
    CommandSpec {
        name: "history",
        usage: "history",
        help: "show recent searches",
        parse: |arg| bare(arg, Action::History),
    },
    CommandSpec {
        name: "chart",
        usage: "chart",
        help: "show the sentiment chart",
        parse: |arg| bare(arg, Action::Chart),
    },
    CommandSpec {
        name: "lang",
        usage: "lang <code>",
        help: "set the language for the next request",
        parse: |arg| {
            let code = arg.trim();
            (!code.is_empty() && !code.contains(char::is_whitespace))
                .then(|| Action::Language(code.to_string()))
        },
    },
    CommandSpec {
        name: "dark",
        usage: "dark [on|off]",
        help: "toggle dark mode",
        parse: |arg| match arg.trim() {
            "" => Some(Action::Dark(None)),
            "on" => Some(Action::Dark(Some(true))),
            "off" => Some(Action::Dark(Some(false))),
            _ => None,
        },
    },
    CommandSpec {
        name: "voice",
        usage: "voice",
        help: "search by voice",
        parse: |arg| bare(arg, Action::Voice),
    },
    CommandSpec {
        name: "help",
        usage: "help",
        help: "list commands",
        parse: |arg| bare(arg, Action::Help),
    },
    CommandSpec {
        name: "quit",
        usage: "quit",
        help: "exit",
        parse: |arg| bare(arg, Action::Quit),
    },
];

impl Action {
    /// Parse one input line through [`COMMANDS`].
    pub fn parse(line: &str) -> Result<Self, ParseActionError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ParseActionError::Empty);
        }
        let (name, arg) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let spec = COMMANDS
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ParseActionError::Unknown(name.to_string()))?;
        (spec.parse)(arg).ok_or(ParseActionError::Usage(spec.usage))
    }
}

/// Whether the input loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// A transient message that dismisses itself after [`ALERT_TTL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub message: String,
    raised_at: Instant,
}

impl Alert {
    pub fn is_visible(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) < ALERT_TTL
    }
}

/// A finished page request and the ticket it was issued under.
type Outcome = (Ticket, Result<Vec<NewsItem>, FetchError>);

/// Owns every piece of state the news desk has.
pub struct App<S> {
    source: S,
    favorites: Favorites,
    history: SearchHistory,
    pager: Pager,
    items: Vec<NewsItem>,
    chart: ChartSlot,
    theme: Theme,
    alert: Option<Alert>,
    voice: VoiceBridge,
    in_flight: FuturesUnordered<LocalBoxFuture<'static, Outcome>>,
    out: String,
}

impl<S> App<S> {
    /// Drain everything handlers wrote since the last call.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.out)
    }

    pub fn has_output(&self) -> bool {
        !self.out.is_empty()
    }

    /// Whether the latest page request is still outstanding.
    pub fn is_loading(&self) -> bool {
        self.pager.is_loading()
    }

    /// The alert still on screen at `now`; expired alerts are dismissed.
    pub fn visible_alert(&mut self, now: Instant) -> Option<&Alert> {
        if self.alert.as_ref().is_some_and(|a| !a.is_visible(now)) {
            self.alert = None;
        }
        self.alert.as_ref()
    }
}

impl<S: NewsSource + Clone + 'static> App<S> {
    pub fn new(source: S, store: LocalStore, language: &str, theme: Theme, voice: VoiceBridge) -> Self {
        Self {
            source,
            favorites: Favorites::load(store.clone()),
            history: SearchHistory::load(store),
            pager: Pager::new(language),
            items: Vec::new(),
            chart: ChartSlot::default(),
            theme,
            alert: None,
            voice,
            in_flight: FuturesUnordered::new(),
            out: String::new(),
        }
    }

    /// First screen: panels, voice controls, then the initial query.
    pub fn startup(&mut self, initial_query: Option<&str>) {
        self.show_favorites();
        self.show_history();
        let _ = writeln!(self.out, "Voice: {}", self.voice.voice_control_label());
        if !self.voice.can_speak() {
            let _ = writeln!(self.out, "🔇 Read aloud unavailable");
        }
        self.run_query(initial_query.unwrap_or_default(), 1);
    }

    /// Route an action to its handler.
    #[instrument(level = "debug", skip(self))]
    pub async fn dispatch(&mut self, action: Action) -> Flow {
        match action {
            Action::Search(text) => self.on_search(&text),
            Action::Category(label) => self.on_category(&label),
            Action::More => self.on_more(),
            Action::Show => self.show_items(),
            Action::Favorite(n) => self.on_favorite(n),
            Action::Unfavorite(n) => self.on_unfavorite(n),
            Action::Listen(n) => self.on_listen(n),
            Action::ReadMore(n) => self.on_read_more(n),
            Action::Rerun(n) => self.on_rerun(n),
            Action::Forget(n) => self.on_forget(n),
            Action::Favorites => self.show_favorites(),
            Action::History => self.show_history(),
            Action::Chart => self.show_chart(),
            Action::Language(code) => self.on_language(&code),
            Action::Dark(on) => self.on_dark(on),
            Action::Voice => self.on_voice().await,
            Action::Help => self.show_help(),
            Action::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Wait for the next queued request to finish and apply its outcome.
    ///
    /// Never resolves while nothing is in flight. Cancel safe: an outcome is
    /// applied in the same poll that yields it.
    pub async fn next_completion(&mut self) {
        match self.in_flight.next().await {
            Some((ticket, result)) => self.apply(&ticket, result),
            None => std::future::pending().await,
        }
    }

    /// Queue the request for `ticket` without waiting on it.
    fn issue(&mut self, ticket: Ticket) {
        let _ = writeln!(
            self.out,
            "⏳ Loading \"{}\" (page {})…",
            ticket.query.query, ticket.query.page
        );
        let source = self.source.clone();
        self.in_flight.push(Box::pin(async move {
            let result = source.fetch(&ticket.query).await;
            (ticket, result)
        }));
    }

    /// Apply the outcome of `ticket`'s request. Stale outcomes are dropped.
    fn apply(&mut self, ticket: &Ticket, result: Result<Vec<NewsItem>, FetchError>) {
        if self.pager.complete(ticket) == Completion::Stale {
            debug!(token = ticket.token, ok = result.is_ok(), "Dropped superseded response");
            return;
        }
        match result {
            Ok(items) => {
                info!(count = items.len(), page = ticket.query.page, "Rendering news");
                self.items = items;
                self.show_items();
            }
            Err(e) => self.raise_alert(e.to_string()),
        }
    }

    fn run_query(&mut self, query: &str, page: u32) {
        let ticket = self.pager.begin(query, page);
        self.issue(ticket);
    }

    fn on_search(&mut self, text: &str) {
        self.run_query(text, 1);
        self.record_search(text);
    }

    fn on_category(&mut self, label: &str) {
        let category = clean_category_label(label);
        self.run_query(&category, 1);
        self.record_search(&category);
    }

    fn on_more(&mut self) {
        match self.pager.next_page() {
            Some(ticket) => self.issue(ticket),
            None => {
                let _ = writeln!(self.out, "Still loading…");
            }
        }
    }

    fn record_search(&mut self, text: &str) {
        let query = text.trim();
        if query.is_empty() {
            return;
        }
        match self.history.add(query) {
            Ok(true) => self.show_history(),
            Ok(false) => {}
            Err(e) => self.store_failed("search history", e),
        }
    }

    fn on_favorite(&mut self, n: usize) {
        let Some(item) = nth(&self.items, n).cloned() else {
            let _ = writeln!(self.out, "No card {n} on screen.");
            return;
        };
        match self.favorites.add(item) {
            Ok(true) => self.show_favorites(),
            Ok(false) => {
                let _ = writeln!(self.out, "Already in favorites.");
            }
            Err(e) => self.store_failed("favorites", e),
        }
    }

    fn on_unfavorite(&mut self, n: usize) {
        let Some(url) = nth(self.favorites.items(), n).map(|f| f.url.clone()) else {
            let _ = writeln!(self.out, "No favorite {n}.");
            return;
        };
        match self.favorites.remove(&url) {
            Ok(_) => self.show_favorites(),
            Err(e) => self.store_failed("favorites", e),
        }
    }

    fn on_listen(&mut self, n: usize) {
        let Some(text) = nth(&self.items, n).map(|item| item.blurb().to_string()) else {
            let _ = writeln!(self.out, "No card {n} on screen.");
            return;
        };
        match self.voice.speak(&text) {
            Ok(()) => {
                let _ = writeln!(self.out, "🔊 Reading card {n}…");
            }
            Err(e) => {
                warn!(error = %e, "Speech synthesis failed");
                let _ = writeln!(self.out, "🔇 {e}");
            }
        }
    }

    fn on_read_more(&mut self, n: usize) {
        match nth(&self.items, n) {
            Some(item) => {
                let _ = writeln!(self.out, "📖 {}", item.url);
            }
            None => {
                let _ = writeln!(self.out, "No card {n} on screen.");
            }
        }
    }

    fn on_rerun(&mut self, n: usize) {
        let Some(query) = nth(&self.history.recent(), n).map(|q| q.to_string()) else {
            let _ = writeln!(self.out, "No recent search {n}.");
            return;
        };
        self.run_query(&query, 1);
    }

    fn on_forget(&mut self, n: usize) {
        let Some(query) = nth(&self.history.recent(), n).map(|q| q.to_string()) else {
            let _ = writeln!(self.out, "No recent search {n}.");
            return;
        };
        match self.history.remove(&query) {
            Ok(_) => self.show_history(),
            Err(e) => self.store_failed("search history", e),
        }
    }

    fn on_language(&mut self, code: &str) {
        self.pager.set_language(code);
        let _ = writeln!(self.out, "Language set to {code}.");
    }

    fn on_dark(&mut self, on: Option<bool>) {
        let dark = on.unwrap_or(self.theme == Theme::Light);
        self.theme = if dark { Theme::Dark } else { Theme::Light };
        let _ = writeln!(self.out, "Dark mode {}.", if dark { "on" } else { "off" });
    }

    async fn on_voice(&mut self) {
        if !self.voice.can_recognize() {
            let _ = writeln!(self.out, "{}", self.voice.voice_control_label());
            return;
        }
        let _ = writeln!(self.out, "🎤 Listening…");
        match self.voice.listen(self.pager.language()).await {
            Ok(transcript) => {
                info!(%transcript, "Voice search");
                let _ = writeln!(self.out, "🎤 \"{transcript}\"");
                self.on_search(&transcript);
            }
            Err(e) => error!(error = %e, "Voice recognition error"),
        }
    }

    fn show_items(&mut self) {
        self.out.push_str(&render::render_news(&self.items, self.theme));
        let chart = self.chart.draw(&self.items);
        self.out.push_str(&chart.render());
    }

    fn show_chart(&mut self) {
        match self.chart.current() {
            Some(chart) => self.out.push_str(&chart.render()),
            None => {
                let _ = writeln!(self.out, "No chart yet.");
            }
        }
    }

    fn show_favorites(&mut self) {
        let panel = render::render_favorites(self.favorites.items(), self.theme);
        self.out.push_str(&panel);
    }

    fn show_history(&mut self) {
        let panel = render::render_history(&self.history.recent());
        self.out.push_str(&panel);
    }

    fn show_help(&mut self) {
        for cmd in COMMANDS {
            let _ = writeln!(self.out, "  {:<18} {}", cmd.usage, cmd.help);
        }
    }

    fn raise_alert(&mut self, message: String) {
        let _ = writeln!(self.out, "{message}");
        self.alert = Some(Alert {
            message,
            raised_at: Instant::now(),
        });
    }

    fn store_failed(&mut self, what: &str, e: StoreError) {
        error!(error = %e, "Failed to persist {what}");
        self.raise_alert(format!("⚠️ Could not save {what}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{NewsQuery, parse_news_response};
    use crate::store::{FAVORITES_KEY, SEARCH_HISTORY_KEY};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use tokio::sync::oneshot;

    type Page = Result<Vec<NewsItem>, FetchError>;

    /// How the scripted endpoint answers one request.
    enum Reply {
        Ready(Page),
        /// A raw response body, decoded like the HTTP client does.
        Body(&'static str),
        /// Answers once the test sends the page.
        Later(oneshot::Receiver<Page>),
        Never,
    }

    #[derive(Default)]
    struct Script {
        replies: RefCell<VecDeque<Reply>>,
        requests: RefCell<Vec<NewsQuery>>,
    }

    /// Serves scripted replies in order and records every request.
    /// Unscripted requests get an empty page.
    #[derive(Clone, Default)]
    struct ScriptedSource(Rc<Script>);

    impl ScriptedSource {
        fn push(&self, reply: Reply) {
            self.0.replies.borrow_mut().push_back(reply);
        }

        fn requests(&self) -> Vec<NewsQuery> {
            self.0.requests.borrow().clone()
        }
    }

    impl NewsSource for ScriptedSource {
        async fn fetch(&self, query: &NewsQuery) -> Page {
            self.0.requests.borrow_mut().push(query.clone());
            let reply = self.0.replies.borrow_mut().pop_front();
            match reply {
                None => Ok(Vec::new()),
                Some(Reply::Ready(page)) => page,
                Some(Reply::Body(body)) => parse_news_response(body),
                Some(Reply::Later(rx)) => rx.await.unwrap_or_else(|_| Ok(Vec::new())),
                Some(Reply::Never) => std::future::pending().await,
            }
        }
    }

    /// Apply every outcome that is ready; requests still pending stay queued.
    async fn drain(app: &mut App<ScriptedSource>) {
        while tokio::time::timeout(Duration::from_millis(50), app.next_completion())
            .await
            .is_ok()
        {}
    }

    fn news(url: &str, sentiment: &str) -> NewsItem {
        NewsItem {
            title: format!("Headline {url}"),
            summary: Some(format!("Summary {url}")),
            description: None,
            url: url.to_string(),
            image: None,
            category: Some("business".to_string()),
            sentiment: sentiment.to_string(),
            published_at: "2025-05-06T14:30:00".to_string(),
        }
    }

    fn app(source: &ScriptedSource) -> (tempfile::TempDir, LocalStore, App<ScriptedSource>) {
        let tmp = tempfile::tempdir().unwrap();
        let store = LocalStore::new(tmp.path());
        let app = App::new(source.clone(), store.clone(), "en", Theme::Light, VoiceBridge::default());
        (tmp, store, app)
    }

    #[test]
    fn test_parse_actions() {
        assert_eq!(Action::parse("search rust lang"), Ok(Action::Search("rust lang".to_string())));
        assert_eq!(Action::parse("search"), Ok(Action::Search(String::new())));
        assert_eq!(Action::parse("  fav 2 "), Ok(Action::Favorite(2)));
        assert_eq!(Action::parse("more"), Ok(Action::More));
        assert_eq!(Action::parse("dark on"), Ok(Action::Dark(Some(true))));
        assert_eq!(Action::parse("dark"), Ok(Action::Dark(None)));
        assert_eq!(Action::parse("lang fr"), Ok(Action::Language("fr".to_string())));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Action::parse("   "), Err(ParseActionError::Empty));
        assert_eq!(
            Action::parse("frobnicate"),
            Err(ParseActionError::Unknown("frobnicate".to_string()))
        );
        assert_eq!(Action::parse("fav"), Err(ParseActionError::Usage("fav <card>")));
        assert_eq!(Action::parse("fav 0"), Err(ParseActionError::Usage("fav <card>")));
        assert_eq!(Action::parse("more 3"), Err(ParseActionError::Usage("more")));
        assert_eq!(Action::parse("category  "), Err(ParseActionError::Usage("category <name>")));
    }

    #[test]
    fn test_every_command_has_unique_name() {
        let mut names: Vec<&str> = COMMANDS.iter().map(|c| c.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), COMMANDS.len());
    }

    #[tokio::test]
    async fn test_startup_fetches_default_query() {
        let source = ScriptedSource::default();
        source.push(Reply::Ready(Ok(vec![news("u1", "positive"), news("u2", "NEGATIVE")])));
        let (_tmp, _store, mut app) = app(&source);

        app.startup(None);
        assert!(app.is_loading());
        drain(&mut app).await;

        assert_eq!(source.requests()[0], NewsQuery::new("technology", "en", 1));
        assert_eq!(app.items.len(), 2);
        let tally = app.chart.current().unwrap().tally;
        assert_eq!((tally.positive, tally.neutral, tally.negative), (1, 0, 1));

        let out = app.take_output();
        assert!(out.contains("Favorites"));
        assert!(out.contains("Recent searches"));
        assert!(out.contains("Speech recognition not supported"));
        assert!(out.contains("Read aloud unavailable"));
        assert!(out.contains("Headline u1"));
    }

    #[tokio::test]
    async fn test_server_error_body_alerts_and_keeps_items() {
        let source = ScriptedSource::default();
        source.push(Reply::Ready(Ok(vec![news("u1", "positive")])));
        source.push(Reply::Body(r#"{"error": true, "message": "rate limited"}"#));
        let (_tmp, _store, mut app) = app(&source);

        app.startup(None);
        drain(&mut app).await;
        app.take_output();
        app.dispatch(Action::Search("rust".to_string())).await;
        drain(&mut app).await;

        let out = app.take_output();
        assert!(out.contains("⚠️ rate limited"));
        assert_eq!(app.items.len(), 1);
        assert_eq!(app.items[0].url, "u1");
        assert!(!app.is_loading());

        let alert = app.visible_alert(Instant::now()).unwrap();
        assert_eq!(alert.message, "⚠️ rate limited");
    }

    #[tokio::test]
    async fn test_transport_error_shows_generic_alert() {
        let source = ScriptedSource::default();
        source.push(Reply::Ready(Err(FetchError::Transport("connection refused".to_string()))));
        let (_tmp, _store, mut app) = app(&source);

        app.dispatch(Action::Search("rust".to_string())).await;
        drain(&mut app).await;

        assert!(app.take_output().contains("⚠️ Failed to fetch news!"));
        assert!(app.items.is_empty());
    }

    #[tokio::test]
    async fn test_alert_dismisses_after_ttl() {
        let source = ScriptedSource::default();
        source.push(Reply::Ready(Err(FetchError::Server("down".to_string()))));
        let (_tmp, _store, mut app) = app(&source);

        app.dispatch(Action::Search("x".to_string())).await;
        drain(&mut app).await;
        let later = Instant::now() + ALERT_TTL + Duration::from_millis(10);

        assert!(app.visible_alert(Instant::now()).is_some());
        assert!(app.visible_alert(later).is_none());
        assert!(app.visible_alert(Instant::now()).is_none());
    }

    #[tokio::test]
    async fn test_empty_batch_shows_placeholder_and_zero_chart() {
        let source = ScriptedSource::default();
        let (_tmp, _store, mut app) = app(&source);

        app.dispatch(Action::Search("nothing here".to_string())).await;
        drain(&mut app).await;

        assert!(app.take_output().contains("No news found."));
        assert_eq!(app.chart.current().unwrap().tally.total(), 0);
    }

    #[tokio::test]
    async fn test_blank_search_uses_default_and_skips_history() {
        let source = ScriptedSource::default();
        let (_tmp, store, mut app) = app(&source);

        app.dispatch(Action::Search("   ".to_string())).await;
        drain(&mut app).await;

        assert_eq!(source.requests()[0].query, "technology");
        let stored: Vec<String> = store.load(SEARCH_HISTORY_KEY);
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn test_search_records_history_once() {
        let source = ScriptedSource::default();
        let (_tmp, store, mut app) = app(&source);

        app.dispatch(Action::Search(" rust ".to_string())).await;
        app.dispatch(Action::Search("rust".to_string())).await;

        let stored: Vec<String> = store.load(SEARCH_HISTORY_KEY);
        assert_eq!(stored, vec!["rust"]);
    }

    #[tokio::test]
    async fn test_category_cleans_label_and_records_history() {
        let source = ScriptedSource::default();
        let (_tmp, _store, mut app) = app(&source);

        app.dispatch(Action::Category("⚽ Sports".to_string())).await;
        drain(&mut app).await;

        assert_eq!(source.requests()[0].query, "Sports");
        assert_eq!(app.history.recent(), vec!["Sports"]);
    }

    #[tokio::test]
    async fn test_more_requests_next_page_of_last_query() {
        let source = ScriptedSource::default();
        let (_tmp, _store, mut app) = app(&source);

        app.dispatch(Action::Search("rust".to_string())).await;
        drain(&mut app).await;
        app.dispatch(Action::More).await;
        drain(&mut app).await;
        app.dispatch(Action::More).await;
        drain(&mut app).await;

        let requests = source.requests();
        assert_eq!(requests[1], NewsQuery::new("rust", "en", 2));
        assert_eq!(requests[2], NewsQuery::new("rust", "en", 3));
    }

    #[tokio::test]
    async fn test_hung_request_keeps_input_responsive() {
        let source = ScriptedSource::default();
        source.push(Reply::Never);
        let (_tmp, _store, mut app) = app(&source);

        let flow = tokio::time::timeout(
            Duration::from_secs(1),
            app.dispatch(Action::Search("rust".to_string())),
        )
        .await
        .expect("dispatch returns while the request is in flight");
        assert_eq!(flow, Flow::Continue);
        drain(&mut app).await;
        assert!(app.is_loading());

        app.take_output();
        app.dispatch(Action::More).await;
        drain(&mut app).await;
        assert!(app.take_output().contains("Still loading…"));
        assert_eq!(source.requests().len(), 1);

        assert_eq!(app.dispatch(Action::Quit).await, Flow::Quit);
    }

    #[tokio::test]
    async fn test_new_search_supersedes_hung_request() {
        let source = ScriptedSource::default();
        source.push(Reply::Never);
        source.push(Reply::Ready(Ok(vec![news("fresh", "neutral")])));
        let (_tmp, _store, mut app) = app(&source);

        app.dispatch(Action::Search("rust".to_string())).await;
        drain(&mut app).await;
        app.dispatch(Action::Search("tokio".to_string())).await;
        drain(&mut app).await;

        assert!(!app.is_loading());
        assert_eq!(app.items[0].url, "fresh");
    }

    #[tokio::test]
    async fn test_superseded_response_arriving_late_is_discarded() {
        let source = ScriptedSource::default();
        let (old_tx, old_rx) = oneshot::channel();
        source.push(Reply::Later(old_rx));
        source.push(Reply::Ready(Ok(vec![news("new", "positive")])));
        let (_tmp, _store, mut app) = app(&source);

        app.dispatch(Action::Search("rust".to_string())).await;
        drain(&mut app).await;
        app.dispatch(Action::Search("tokio".to_string())).await;
        drain(&mut app).await;
        assert_eq!(app.items[0].url, "new");

        old_tx.send(Ok(vec![news("old", "negative")])).unwrap();
        drain(&mut app).await;

        assert!(app.in_flight.is_empty());
        assert_eq!(app.items.len(), 1);
        assert_eq!(app.items[0].url, "new");
        assert_eq!(app.chart.current().unwrap().tally.positive, 1);
    }

    #[tokio::test]
    async fn test_superseded_error_raises_no_alert() {
        let source = ScriptedSource::default();
        let (old_tx, old_rx) = oneshot::channel();
        source.push(Reply::Later(old_rx));
        let (_tmp, _store, mut app) = app(&source);

        app.dispatch(Action::Search("rust".to_string())).await;
        drain(&mut app).await;
        app.dispatch(Action::Search("tokio".to_string())).await;
        drain(&mut app).await;

        old_tx.send(Err(FetchError::Server("too late".to_string()))).unwrap();
        drain(&mut app).await;

        assert!(app.visible_alert(Instant::now()).is_none());
        assert!(!app.take_output().contains("too late"));
    }

    #[tokio::test]
    async fn test_favorite_is_persisted_once() {
        let source = ScriptedSource::default();
        source.push(Reply::Ready(Ok(vec![news("u1", "positive"), news("u2", "neutral")])));
        let (_tmp, store, mut app) = app(&source);
        app.startup(None);
        drain(&mut app).await;

        app.dispatch(Action::Favorite(2)).await;
        app.dispatch(Action::Favorite(2)).await;
        app.dispatch(Action::Favorite(9)).await;

        let stored: Vec<NewsItem> = store.load(FAVORITES_KEY);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].url, "u2");
        assert!(app.take_output().contains("No card 9 on screen."));
    }

    #[tokio::test]
    async fn test_unfavorite_removes_and_persists() {
        let source = ScriptedSource::default();
        source.push(Reply::Ready(Ok(vec![news("u1", "positive"), news("u2", "neutral")])));
        let (_tmp, store, mut app) = app(&source);
        app.startup(None);
        drain(&mut app).await;
        app.dispatch(Action::Favorite(1)).await;
        app.dispatch(Action::Favorite(2)).await;

        app.dispatch(Action::Unfavorite(1)).await;

        let stored: Vec<NewsItem> = store.load(FAVORITES_KEY);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].url, "u2");
        assert_eq!(app.favorites.items().len(), 1);
    }

    #[tokio::test]
    async fn test_rerun_and_forget_address_newest_first() {
        let source = ScriptedSource::default();
        let (_tmp, store, mut app) = app(&source);
        for q in ["a", "b", "c"] {
            app.dispatch(Action::Search(q.to_string())).await;
            drain(&mut app).await;
        }

        app.dispatch(Action::Rerun(3)).await;
        drain(&mut app).await;
        assert_eq!(source.requests().last().unwrap().query, "a");

        app.dispatch(Action::Forget(1)).await;
        let stored: Vec<String> = store.load(SEARCH_HISTORY_KEY);
        assert_eq!(stored, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_language_applies_to_next_request() {
        let source = ScriptedSource::default();
        let (_tmp, _store, mut app) = app(&source);

        app.dispatch(Action::Language("de".to_string())).await;
        app.dispatch(Action::Search("fussball".to_string())).await;
        drain(&mut app).await;

        assert_eq!(source.requests()[0].language, "de");
    }

    #[tokio::test]
    async fn test_dark_toggle() {
        let source = ScriptedSource::default();
        let (_tmp, _store, mut app) = app(&source);

        app.dispatch(Action::Dark(None)).await;
        assert_eq!(app.theme, Theme::Dark);
        app.dispatch(Action::Dark(None)).await;
        assert_eq!(app.theme, Theme::Light);
        app.dispatch(Action::Dark(Some(true))).await;
        assert_eq!(app.theme, Theme::Dark);
    }

    #[tokio::test]
    async fn test_voice_unavailable_reports_label() {
        let source = ScriptedSource::default();
        let (_tmp, _store, mut app) = app(&source);

        app.dispatch(Action::Voice).await;
        drain(&mut app).await;

        assert!(app.take_output().contains("Speech recognition not supported"));
        assert!(source.requests().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_voice_transcript_becomes_search() {
        use crate::voice::PlatformCommand;

        let source = ScriptedSource::default();
        let tmp = tempfile::tempdir().unwrap();
        let store = LocalStore::new(tmp.path());
        let voice = VoiceBridge::new(None, PlatformCommand::parse("echo climate"));
        let mut app = App::new(source.clone(), store, "en", Theme::Light, voice);

        app.dispatch(Action::Voice).await;
        drain(&mut app).await;

        assert_eq!(source.requests()[0].query, "climate en");
        assert_eq!(app.history.recent(), vec!["climate en"]);
    }

    #[tokio::test]
    async fn test_quit_stops_loop() {
        let source = ScriptedSource::default();
        let (_tmp, _store, mut app) = app(&source);
        assert_eq!(app.dispatch(Action::Quit).await, Flow::Quit);
        assert_eq!(app.dispatch(Action::Help).await, Flow::Continue);
    }
}
