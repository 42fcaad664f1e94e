//! Data models for news items and the endpoint's response envelope.
//!
//! This module defines the core data structures used throughout the application:
//! - [`NewsItem`]: A single article as returned by the news endpoint
//! - [`NewsResponse`]: The `{ error?, message?, items }` envelope around a page of items
//! - [`Sentiment`] and [`Category`]: Case-insensitive views over the free-text fields
//!
//! The models use camelCase field names on the wire (and in storage) so that a
//! favorited item round-trips byte-for-byte through the local store.

use serde::{Deserialize, Serialize};

/// A news article as received from the news endpoint.
///
/// Items are immutable once received. The `url` is the identity used for
/// favorites de-duplication.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    /// The article headline.
    pub title: String,
    /// A short summary of the article, preferred over `description`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Fallback blurb used when the endpoint sends no summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Canonical article link.
    pub url: String,
    /// Optional lead image URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Free-text category, e.g. "Technology".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Sentiment label exactly as classified by the backend.
    #[serde(default)]
    pub sentiment: String,
    /// Publication timestamp as sent by the backend.
    #[serde(default)]
    pub published_at: String,
}

impl NewsItem {
    /// The text shown on a card and read aloud: the summary, else the description.
    pub fn blurb(&self) -> &str {
        self.summary
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or_default()
    }

    pub fn sentiment_kind(&self) -> Sentiment {
        Sentiment::classify(&self.sentiment)
    }

    pub fn category_kind(&self) -> Category {
        Category::classify(self.category.as_deref())
    }
}

/// The JSON envelope returned by `GET /get_news`.
///
/// A response with `error: true` carries a human readable `message` and is
/// never rendered.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct NewsResponse {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub items: Vec<NewsItem>,
}

/// Sentiment bucket of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// Classify a label case-insensitively. Anything that is not exactly
    /// "positive" or "negative" counts as neutral.
    pub fn classify(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }
}

/// Known categories; everything else falls into [`Category::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Technology,
    Sports,
    Entertainment,
    Business,
    Other,
}

impl Category {
    pub fn classify(label: Option<&str>) -> Self {
        match label.map(str::to_lowercase).as_deref() {
            Some("technology") => Category::Technology,
            Some("sports") => Category::Sports,
            Some("entertainment") => Category::Entertainment,
            Some("business") => Category::Business,
            _ => Category::Other,
        }
    }
}
