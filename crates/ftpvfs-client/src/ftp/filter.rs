//! Post-parse entry exclusion chain.
//!
//! Each filter sees the parsed entry together with the raw line and
//! decides whether the entry belongs in the logical directory view.
//! The first filter that excludes short-circuits the rest for that
//! entry. Filters never fail; they only include or exclude.

use crate::ftp::parser::ParsedResource;
use glob::Pattern;

/// One entry-exclusion rule.
pub trait ListingFilter: Send + Sync {
    /// Short identifier used in log messages.
    fn name(&self) -> &'static str;

    /// `true` excludes the entry from the listing.
    fn exclude(&self, entry: &ParsedResource, raw_line: &str) -> bool;
}

/// Excludes the self/parent pseudo-entries (`.` and `..`).
pub struct DotsFilter;

impl ListingFilter for DotsFilter {
    fn name(&self) -> &'static str {
        "dots"
    }

    fn exclude(&self, entry: &ParsedResource, _raw_line: &str) -> bool {
        matches!(entry.name.as_deref(), Some(".") | Some(".."))
    }
}

/// Excludes `total N` summary lines that a lenient recognizer may have
/// claimed as an entry.
pub struct TotalLineFilter;

impl ListingFilter for TotalLineFilter {
    fn name(&self) -> &'static str {
        "total-line"
    }

    fn exclude(&self, _entry: &ParsedResource, raw_line: &str) -> bool {
        let mut tokens = raw_line.trim().split_whitespace();
        tokens.next() == Some("total")
            && tokens.next().is_some_and(|n| n.chars().all(|c| c.is_ascii_digit()))
            && tokens.next().is_none()
    }
}

/// Excludes entries whose name matches any caller-supplied glob.
pub struct PatternFilter {
    patterns: Vec<Pattern>,
}

impl PatternFilter {
    /// Compile the given globs; invalid patterns are rejected.
    pub fn new(globs: &[&str]) -> Result<Self, glob::PatternError> {
        let patterns = globs.iter().map(|g| Pattern::new(g)).collect::<Result<_, _>>()?;
        Ok(Self { patterns })
    }
}

impl ListingFilter for PatternFilter {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn exclude(&self, entry: &ParsedResource, _raw_line: &str) -> bool {
        let Some(name) = entry.name.as_deref() else {
            return false;
        };
        self.patterns.iter().any(|p| p.matches(name))
    }
}

/// The default filter chain, in priority order.
pub fn default_filters() -> Vec<Box<dyn ListingFilter>> {
    vec![Box::new(DotsFilter), Box::new(TotalLineFilter)]
}
