//! Sentiment tally and the pie chart it feeds.
//!
//! A chart always reflects exactly one rendered batch. Rendering a new batch
//! replaces the previous chart; counts never accumulate across pages.

use std::fmt::Write;

use crate::models::{NewsItem, Sentiment};

/// Per-batch counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SentimentTally {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentTally {
    pub fn tally(items: &[NewsItem]) -> Self {
        items.iter().fold(Self::default(), |mut acc, item| {
            match item.sentiment_kind() {
                Sentiment::Positive => acc.positive += 1,
                Sentiment::Neutral => acc.neutral += 1,
                Sentiment::Negative => acc.negative += 1,
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }
}

/// One fixed slice of the pie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub label: &'static str,
    pub color: &'static str,
    pub value: usize,
}

/// A pie chart over one tally. Labels and colors never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentimentChart {
    pub tally: SentimentTally,
}

impl SentimentChart {
    pub const LABELS: [&'static str; 3] = ["Positive 😀", "Neutral 😐", "Negative 😞"];
    pub const COLORS: [&'static str; 3] = ["#28a745", "#6c757d", "#dc3545"];

    const BAR_WIDTH: usize = 30;

    pub fn new(tally: SentimentTally) -> Self {
        Self { tally }
    }

    pub fn slices(&self) -> [Slice; 3] {
        let values = [self.tally.positive, self.tally.neutral, self.tally.negative];
        std::array::from_fn(|i| Slice {
            label: Self::LABELS[i],
            color: Self::COLORS[i],
            value: values[i],
        })
    }

    /// Text rendering: one proportional bar per slice.
    pub fn render(&self) -> String {
        let total = self.tally.total();
        let mut out = String::from("Sentiment\n");
        for slice in self.slices() {
            let (width, pct) = if total == 0 {
                (0, 0.0)
            } else {
                (
                    slice.value * Self::BAR_WIDTH / total,
                    slice.value as f64 * 100.0 / total as f64,
                )
            };
            let _ = writeln!(
                out,
                "  {:<12} {:<width$} {:>3} ({:>5.1}%) {}",
                slice.label,
                "█".repeat(width),
                slice.value,
                pct,
                slice.color,
                width = Self::BAR_WIDTH
            );
        }
        out
    }
}

/// Holds the single live chart. Drawing discards any previous instance.
#[derive(Debug, Default)]
pub struct ChartSlot {
    current: Option<SentimentChart>,
}

impl ChartSlot {
    /// Replace the live chart with one for `items` and return it.
    pub fn draw(&mut self, items: &[NewsItem]) -> &SentimentChart {
        self.current.insert(SentimentChart::new(SentimentTally::tally(items)))
    }

    pub fn current(&self) -> Option<&SentimentChart> {
        self.current.as_ref()
    }
}
