//! Place id extraction from shelter detail pages
//!
//! Detail pages reference the real place id in a handful of shapes. Each
//! shape is a named pattern; patterns are tried in a fixed order and the
//! first one that matches wins. New shapes go into [`PlaceIdExtractor::new`]
//! and can be tested here without any network code.

use regex::{Regex, RegexBuilder};

/// One named id pattern; capture group 1 holds the digits
#[derive(Debug, Clone)]
pub struct IdPattern {
    name: &'static str,
    regex: Regex,
}

impl IdPattern {
    fn new(name: &'static str, pattern: &str) -> Self {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .unwrap_or_else(|e| panic!("invalid built-in id pattern {name}: {e}"));
        Self { name, regex }
    }

    /// Pattern name, for logging which shape matched
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// First id this pattern finds in `body`
    pub fn find(&self, body: &str) -> Option<u64> {
        self.regex
            .captures(body)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

/// A place id found in a page, with the pattern that found it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractedId {
    pub place_id: u64,
    pub pattern: &'static str,
}

/// Ordered set of id patterns
#[derive(Debug, Clone)]
pub struct PlaceIdExtractor {
    patterns: Vec<IdPattern>,
}

impl PlaceIdExtractor {
    /// The built-in patterns, most specific first
    pub fn new() -> Self {
        Self {
            patterns: vec![
                IdPattern::new(
                    "bookings-endpoint",
                    r"inc_ajaxgetbookingsforsingleplace\.asp\?i=(\d+)",
                ),
                IdPattern::new("data-place-id", r#"data-place-id\s*=\s*"(\d+)""#),
                IdPattern::new("place-id-label", r#"place[_\s-]*id\s*[:=]\s*"?(\d+)"?"#),
                IdPattern::new("query-param", r"[?&]i=(\d+)"),
            ],
        }
    }

    /// Pattern names in the order they are tried
    pub fn pattern_names(&self) -> Vec<&'static str> {
        self.patterns.iter().map(IdPattern::name).collect()
    }

    /// Extract the place id from a page body
    ///
    /// Returns the value of the first pattern that matches, whatever it is.
    /// Rejecting category ids is the caller's job.
    pub fn extract(&self, body: &str) -> Option<ExtractedId> {
        self.patterns.iter().find_map(|pattern| {
            pattern.find(body).map(|place_id| ExtractedId {
                place_id,
                pattern: pattern.name(),
            })
        })
    }
}

impl Default for PlaceIdExtractor {
    fn default() -> Self {
        Self::new()
    }
}
