//! Text rendering for news cards, favorites chips and history chips.
//!
//! Every interactive control is printed with the command that triggers it and
//! the 1-based index it addresses, e.g. `fav 2` or `forget 1`.
//!
//! # Card layout
//!
//! ```text
//! [1] 💻 technology
//!     Chips get faster
//!     A new fab opens.
//!     🕒 2025-05-06 14:30   [green] positive
//!     🖼  https://example.com/chip.jpg
//!     📖 Read More: https://example.com/chips
//!     ⭐ fav 1   🔊 listen 1
//! ```

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt::Write;

use crate::models::{Category, NewsItem, Sentiment};
use crate::utils::{format_published, truncate_title};

/// Placeholder shown for an empty batch.
pub const NO_NEWS: &str = "No news found.";
/// Image shown on a favorites chip when the item has none.
pub const FALLBACK_IMAGE: &str = "fallback.jpg";
/// Characters of the title kept on a favorites chip.
pub const FAVORITE_TITLE_CHARS: usize = 40;

static CATEGORY_ICONS: Lazy<HashMap<Category, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (Category::Technology, "💻"),
        (Category::Sports, "⚽"),
        (Category::Entertainment, "🎬"),
        (Category::Business, "💼"),
        (Category::Other, "📰"),
    ])
});

pub fn category_icon(category: Category) -> &'static str {
    CATEGORY_ICONS.get(&category).copied().unwrap_or("📰")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Badge color for a sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeColor {
    Green,
    Red,
    Gray,
}

impl BadgeColor {
    pub fn for_sentiment(label: &str) -> Self {
        match Sentiment::classify(label) {
            Sentiment::Positive => BadgeColor::Green,
            Sentiment::Negative => BadgeColor::Red,
            Sentiment::Neutral => BadgeColor::Gray,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BadgeColor::Green => "green",
            BadgeColor::Red => "red",
            BadgeColor::Gray => "gray",
        }
    }

    fn ansi(self) -> &'static str {
        match self {
            BadgeColor::Green => "\x1b[30;42m",
            BadgeColor::Red => "\x1b[97;41m",
            BadgeColor::Gray => "\x1b[97;100m",
        }
    }
}

/// A sentiment badge showing the label as received.
pub fn sentiment_badge(label: &str, theme: Theme) -> String {
    let color = BadgeColor::for_sentiment(label);
    match theme {
        Theme::Light => format!("[{}] {}", color.name(), label),
        Theme::Dark => format!("{} {} \x1b[0m", color.ansi(), label),
    }
}

/// Render one card. `index` is the 1-based position used by card actions.
pub fn render_card(index: usize, item: &NewsItem, theme: Theme) -> String {
    let mut out = String::new();
    let category = item
        .category
        .as_deref()
        .filter(|c| !c.is_empty())
        .unwrap_or("General");

    let _ = writeln!(out, "[{index}] {} {category}", category_icon(item.category_kind()));
    let _ = writeln!(out, "    {}", item.title);
    let _ = writeln!(out, "    {}", item.blurb());
    let _ = writeln!(
        out,
        "    🕒 {}   {}",
        format_published(&item.published_at),
        sentiment_badge(&item.sentiment, theme)
    );
    if let Some(image) = &item.image {
        let _ = writeln!(out, "    🖼  {image}");
    }
    let _ = writeln!(out, "    📖 Read More: {}", item.url);
    let _ = writeln!(out, "    ⭐ fav {index}   🔊 listen {index}");
    out
}

/// Render a batch of cards, or the placeholder for an empty batch.
pub fn render_news(items: &[NewsItem], theme: Theme) -> String {
    if items.is_empty() {
        return format!("{NO_NEWS}\n");
    }
    items
        .iter()
        .enumerate()
        .map(|(i, item)| render_card(i + 1, item, theme))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the favorites panel.
pub fn render_favorites(favorites: &[NewsItem], theme: Theme) -> String {
    let mut out = String::from("Favorites\n");
    if favorites.is_empty() {
        out.push_str("  (none)\n");
        return out;
    }
    for (i, item) in favorites.iter().enumerate() {
        let _ = writeln!(
            out,
            "  ({}) {}  🖼 {}  {}  ✖ unfav {}",
            i + 1,
            truncate_title(&item.title, FAVORITE_TITLE_CHARS),
            item.image.as_deref().unwrap_or(FALLBACK_IMAGE),
            sentiment_badge(&item.sentiment, theme),
            i + 1
        );
    }
    out
}

/// Render history chips. `recent` is already newest first.
pub fn render_history(recent: &[&str]) -> String {
    let mut out = String::from("Recent searches\n");
    if recent.is_empty() {
        out.push_str("  (none)\n");
        return out;
    }
    for (i, query) in recent.iter().enumerate() {
        let _ = writeln!(out, "  <{}> {query}  × forget {}", i + 1, i + 1);
    }
    out
}
