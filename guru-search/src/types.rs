//! Core types for search backend identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Search engines that can produce candidate question links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackend {
    /// Google web search (default).
    #[default]
    Google,
    /// DuckDuckGo HTML endpoint.
    DuckDuckGo,
}

impl SearchBackend {
    /// Returns the human-readable name of this backend.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::DuckDuckGo => "DuckDuckGo",
        }
    }

    /// Returns the public endpoint this backend scrapes by default.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Google => "https://www.google.com",
            Self::DuckDuckGo => "https://html.duckduckgo.com",
        }
    }
}

impl fmt::Display for SearchBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
