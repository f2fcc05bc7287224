//! Reply normalization.
//!
//! Classification replies are matched case-insensitively against the label
//! keywords in a fixed order, and the first label found wins. Matching is by
//! substring, so "not positive" reads as Positive; replies naming several
//! labels resolve to whichever comes first in [`SentimentLabel::ALL`].
//! Replies matching no label pass through trimmed, so downstream code must
//! treat sentiment as an open string.

use crate::task::Task;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The bounded sentiment label set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Labels in match priority order.
    pub const ALL: [SentimentLabel; 3] = [Self::Positive, Self::Negative, Self::Neutral];

    /// Returns the capitalised label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }

    /// Finds the first label whose keyword occurs in `text`.
    #[must_use]
    pub fn detect(text: &str) -> Option<Self> {
        let lowered = text.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|label| lowered.contains(label.keyword()))
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalizes a raw model reply for `task`.
///
/// Never fails. An empty reply normalizes to an empty string.
#[must_use]
pub fn normalize(raw_text: &str, task: Task) -> String {
    let trimmed = raw_text.trim();
    if task.is_classification()
        && let Some(label) = SentimentLabel::detect(trimmed)
    {
        return label.as_str().to_string();
    }
    trimmed.to_string()
}
