//! News endpoint client.
//!
//! This module issues `GET /get_news?query=..&language=..&page=..` requests and
//! turns the JSON envelope into a page of [`NewsItem`]s.
//!
//! # Architecture
//!
//! - [`NewsSource`]: Core trait defining async page retrieval
//! - [`HttpNewsClient`]: `reqwest` implementation talking to the real endpoint
//!
//! There is no retry layer: every call is independent and a
//! failure is reported once to the caller, which shows it as a transient alert.

use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::models::{NewsItem, NewsResponse};
use crate::utils::truncate_for_log;

/// Query used when the user submits nothing but whitespace.
pub const DEFAULT_QUERY: &str = "technology";

/// Upper bound on one page request, connect through body.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Why an [`HttpNewsClient`] could not be built.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("could not build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Why a page could not be shown.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a usable response (connect, read, or decode).
    #[error("⚠️ Failed to fetch news!")]
    Transport(String),

    /// The endpoint answered with `error: true`; the message is shown verbatim.
    #[error("⚠️ {0}")]
    Server(String),
}

/// One page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsQuery {
    pub query: String,
    pub language: String,
    pub page: u32,
}

impl NewsQuery {
    /// Build a request, trimming the query and falling back to
    /// [`DEFAULT_QUERY`] when it is blank. Pages start at 1.
    pub fn new(query: &str, language: &str, page: u32) -> Self {
        Self {
            query: normalize_query(query),
            language: language.to_string(),
            page: page.max(1),
        }
    }
}

/// Trim `raw`; blank input becomes [`DEFAULT_QUERY`].
pub fn normalize_query(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        DEFAULT_QUERY.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Trait for anything that can serve pages of news.
///
/// The application controller is generic over this trait so it can be
/// exercised without a network.
pub trait NewsSource {
    /// Fetch one page of items.
    async fn fetch(&self, query: &NewsQuery) -> Result<Vec<NewsItem>, FetchError>;
}

/// HTTP client for the news endpoint.
#[derive(Debug, Clone)]
pub struct HttpNewsClient {
    http: reqwest::Client,
    base: Url,
}

impl HttpNewsClient {
    /// Create a client rooted at `endpoint` (e.g. `http://localhost:5000`).
    pub fn new(endpoint: &str) -> Result<Self, ClientError> {
        Self::with_timeout(endpoint, REQUEST_TIMEOUT)
    }

    /// Like [`HttpNewsClient::new`] with a custom per-request timeout.
    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base = Url::parse(endpoint)?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base })
    }

    /// The full request URL for `query`.
    pub fn request_url(&self, query: &NewsQuery) -> Result<Url, url::ParseError> {
        let path_and_query = format!(
            "get_news?query={}&language={}&page={}",
            urlencoding::encode(&query.query),
            urlencoding::encode(&query.language),
            query.page
        );
        let mut base = self.base.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(&path_and_query)
    }

    async fn get_text(&self, url: Url) -> Result<String, reqwest::Error> {
        let resp = self.http.get(url).send().await?;
        resp.text().await
    }
}

impl NewsSource for HttpNewsClient {
    #[instrument(level = "info", skip_all, fields(query = %query.query, language = %query.language, page = query.page))]
    async fn fetch(&self, query: &NewsQuery) -> Result<Vec<NewsItem>, FetchError> {
        let t0 = Instant::now();
        let url = self
            .request_url(query)
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        debug!(%url, "Requesting news page");

        let body = self.get_text(url).await.map_err(|e| {
            warn!(error = %e, "News request failed");
            FetchError::Transport(e.to_string())
        })?;

        let items = parse_news_response(&body)?;
        info!(
            count = items.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched news page"
        );
        Ok(items)
    }
}

/// Decode a response body into items or the error it signals.
pub fn parse_news_response(body: &str) -> Result<Vec<NewsItem>, FetchError> {
    let resp: NewsResponse = serde_json::from_str(body).map_err(|e| {
        warn!(
            error = %e,
            body_preview = %truncate_for_log(body, 300),
            "Endpoint returned non-conforming JSON"
        );
        FetchError::Transport(e.to_string())
    })?;

    if resp.error {
        let message = resp.message.unwrap_or_else(|| "Unknown error".to_string());
        warn!(%message, "Endpoint signalled an error");
        return Err(FetchError::Server(message));
    }
    Ok(resp.items)
}
