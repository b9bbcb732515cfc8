//! Directory-listing recognizer chain.
//!
//! FTP exposes no machine-readable listing grammar: `LIST` output is
//! whatever the server's `ls` equivalent prints. Each dialect gets its
//! own recognizer; recognizers are tried in a fixed order and the chain
//! stops at the first match. A line no recognizer claims is a hard
//! `UnsupportedFormat` error — a wrong partial match would silently
//! corrupt the directory view, so declining is always preferred over
//! guessing.
//!
//! Chain order (strictest grammar first):
//! 1. [`SummaryRecognizer`] — blank lines and `total N` summaries
//! 2. [`legacy::TitanParser`] — unix-like with a `YYYY HH:MM` date pair;
//!    must run before the plain unix grammars, which would otherwise
//!    match these lines with the time folded into the file name
//! 3. [`unix::UnixStrictParser`] — full `ls -l` output
//! 4. [`unix::UnixLenientParser`] — unix output missing the group column
//! 5. [`windows::WindowsParser`] — IIS/DOS style
//! 6. [`legacy::NetwareParser`] — Novell Netware
//! 7. [`legacy::As400Parser`] — IBM AS/400
//!
//! A new dialect is a new recognizer appended to the chain; existing
//! recognizers never change for it.

pub mod legacy;
pub mod unix;
pub mod windows;

use chrono::{Datelike, NaiveDate, Utc};

/// Partially-built entry produced by a recognizer.
///
/// `is_directory` and `name` stay optional until the mandatory-attribute
/// validation after the filter chain; everything else defaults.
#[derive(Debug, Clone, Default)]
pub struct ParsedResource {
    pub is_directory: Option<bool>,
    pub name: Option<String>,
    pub size: u64,
    pub owner: Option<String>,
    pub group: Option<String>,
    /// Nine-character permission string without the type char.
    pub mode: Option<String>,
    /// Epoch seconds; 0 = unknown.
    pub mtime: i64,
}

/// Outcome of a successful recognition.
pub enum Parsed {
    /// A real file or folder entry.
    Entry(ParsedResource),
    /// A line that carries no entry (summary line, blank line); dropped
    /// without consulting the rest of the chain.
    Noise,
}

/// One listing-format recognizer.
///
/// `parse` either claims the line (returning the populated entry or a
/// noise marker) or declines with `None`, without side effects.
pub trait ListingParser: Send + Sync {
    /// Short identifier used in log messages.
    fn name(&self) -> &'static str;

    fn parse(&self, line: &str) -> Option<Parsed>;
}

/// Recognizer for lines that are not entries at all: blank lines and
/// the `total N` summary emitted by `ls -l` style servers.
pub struct SummaryRecognizer;

impl ListingParser for SummaryRecognizer {
    fn name(&self) -> &'static str {
        "summary"
    }

    fn parse(&self, line: &str) -> Option<Parsed> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Some(Parsed::Noise);
        }
        let mut tokens = trimmed.split_whitespace();
        if tokens.next() == Some("total")
            && tokens.next().is_some_and(|n| n.chars().all(|c| c.is_ascii_digit()))
            && tokens.next().is_none()
        {
            return Some(Parsed::Noise);
        }
        None
    }
}

/// The default recognizer chain, in priority order.
pub fn default_chain() -> Vec<Box<dyn ListingParser>> {
    vec![
        Box::new(SummaryRecognizer),
        Box::new(legacy::TitanParser),
        Box::new(unix::UnixStrictParser),
        Box::new(unix::UnixLenientParser),
        Box::new(windows::WindowsParser),
        Box::new(legacy::NetwareParser),
        Box::new(legacy::As400Parser),
    ]
}

// ─── Date helpers shared by the recognizers ──────────────────────────

/// Map an English month abbreviation to its number.
pub(crate) fn month_number(name: &str) -> Option<u32> {
    match name.to_ascii_lowercase().as_str() {
        "jan" => Some(1),
        "feb" => Some(2),
        "mar" => Some(3),
        "apr" => Some(4),
        "may" => Some(5),
        "jun" => Some(6),
        "jul" => Some(7),
        "aug" => Some(8),
        "sep" => Some(9),
        "oct" => Some(10),
        "nov" => Some(11),
        "dec" => Some(12),
        _ => None,
    }
}

/// Epoch seconds for a calendar date + time; 0 when out of range.
pub(crate) fn epoch_from_ymd_hms(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> i64 {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or(0)
}

/// Resolve the `Mon DD (HH:MM|YYYY)` date column of unix-style listings
/// to epoch seconds.
///
/// `ls` prints the time for recent entries (year implied to be the
/// current one) and the year for older ones (time implied midnight).
/// Unresolvable input yields 0, meaning unknown.
pub(crate) fn epoch_from_month_day(month: &str, day: &str, time_or_year: &str) -> i64 {
    let Some(month) = month_number(month) else {
        return 0;
    };
    let Ok(day) = day.parse::<u32>() else {
        return 0;
    };

    if let Some((h, m)) = time_or_year.split_once(':') {
        let (Ok(hour), Ok(minute)) = (h.parse::<u32>(), m.parse::<u32>()) else {
            return 0;
        };
        epoch_from_ymd_hms(Utc::now().year(), month, day, hour, minute, 0)
    } else if let Ok(year) = time_or_year.parse::<i32>() {
        epoch_from_ymd_hms(year, month, day, 0, 0, 0)
    } else {
        0
    }
}
