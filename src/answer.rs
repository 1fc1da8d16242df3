//! Answer records returned to the presentation layer
//!
//! Scalar results are plain text; value listings deduplicate with first
//! occurrence order preserved and either render inline (up to 50 entries)
//! or hand the full list to the caller for paging at 20 items per page.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Deduplicated entries above this count are paginated instead of being
/// rendered inline.
pub const MAX_DISPLAY: usize = 50;

/// Items shown per page by the presentation layer.
pub const PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Answer {
    /// A single formatted scalar or an informational message.
    Text { content: String },

    /// A short deduplicated listing, bullet-joined for direct display.
    Direct { content: String, total: usize },

    /// A long deduplicated listing the caller pages through.
    Paginated { answers: Vec<String>, total: usize },
}

impl Answer {
    pub fn text(content: impl Into<String>) -> Self {
        Answer::Text {
            content: content.into(),
        }
    }

    /// Count of deduplicated entries, when the answer carries a listing.
    pub fn total(&self) -> Option<usize> {
        match self {
            Answer::Text { .. } => None,
            Answer::Direct { total, .. } | Answer::Paginated { total, .. } => Some(*total),
        }
    }

    pub fn page_count(&self) -> usize {
        match self {
            Answer::Paginated { total, .. } => total.div_ceil(PAGE_SIZE),
            _ => 1,
        }
    }

    /// Slice of a paginated answer for the zero-based page `index`; `None`
    /// for non-paginated answers or an out-of-range page.
    pub fn page(&self, index: usize) -> Option<&[String]> {
        match self {
            Answer::Paginated { answers, .. } => {
                let start = index.checked_mul(PAGE_SIZE)?;
                if start >= answers.len() {
                    return None;
                }
                let end = (start + PAGE_SIZE).min(answers.len());
                Some(&answers[start..end])
            }
            _ => None,
        }
    }
}

/// Deduplicate collected values preserving first-occurrence order and wrap
/// them as a direct or paginated answer. An empty input yields the canned
/// "No answers found." text.
pub fn format_answers(values: Vec<String>) -> Answer {
    if values.is_empty() {
        return Answer::text("No answers found.");
    }

    let unique: Vec<String> = values.into_iter().unique().collect();
    let total = unique.len();

    if total > MAX_DISPLAY {
        Answer::Paginated {
            answers: unique,
            total,
        }
    } else {
        let content = unique.iter().map(|answer| format!("• {}", answer)).join("\n");
        Answer::Direct { content, total }
    }
}
