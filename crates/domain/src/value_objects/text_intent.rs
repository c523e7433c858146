//! Text intent - Decides whether a text message needs search tooling

use serde::{Deserialize, Serialize};

/// Command prefix that explicitly requests a web search
pub const SEARCH_PREFIX: &str = "/search";

const URL_SCHEME_MARKERS: [&str; 2] = ["http://", "https://"];

/// How an inbound text message should be answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextIntent {
    /// Plain completion, no tools
    Plain,
    /// Completion with web search and URL context tools enabled
    Search,
}

impl TextIntent {
    /// Classify a message body
    ///
    /// The prefix check is case-insensitive; the URL scheme markers are
    /// matched verbatim anywhere in the body.
    #[must_use]
    pub fn classify(text: &str) -> Self {
        let has_prefix = text
            .get(..SEARCH_PREFIX.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(SEARCH_PREFIX));

        if has_prefix || URL_SCHEME_MARKERS.iter().any(|m| text.contains(m)) {
            Self::Search
        } else {
            Self::Plain
        }
    }

    /// Whether search tooling should be enabled
    #[must_use]
    pub const fn uses_tools(&self) -> bool {
        matches!(self, Self::Search)
    }
}
