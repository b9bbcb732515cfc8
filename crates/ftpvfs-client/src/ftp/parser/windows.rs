//! Windows / IIS style recognizer.
//!
//! ```text
//! 01-01-26  12:00AM       1234 file.txt
//! 01-01-26  12:00PM      <DIR> Directory Name
//! ```

use crate::ftp::parser::{epoch_from_ymd_hms, ListingParser, Parsed, ParsedResource};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WINDOWS: Regex = Regex::new(
        r"(?x)
        ^(\d{2})-(\d{2})-(\d{2,4})\s+   # month-day-year
        (\d{1,2}):(\d{2})(AM|PM)?\s+    # time, optionally 12-hour
        (<DIR>|\d+)\s+                  # size or directory marker
        (.+)$                           # name
        "
    )
    .unwrap();
}

pub struct WindowsParser;

impl ListingParser for WindowsParser {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn parse(&self, line: &str) -> Option<Parsed> {
        let caps = WINDOWS.captures(line)?;

        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        let mut year: i32 = caps[3].parse().ok()?;
        if year < 100 {
            // Two-digit years pivot the same way chrono's %y does.
            year += if year < 69 { 2000 } else { 1900 };
        }

        let mut hour: u32 = caps[4].parse().ok()?;
        let minute: u32 = caps[5].parse().ok()?;
        match caps.get(6).map(|m| m.as_str()) {
            Some("PM") if hour < 12 => hour += 12,
            Some("AM") if hour == 12 => hour = 0,
            _ => {}
        }

        let (is_directory, size) = if &caps[7] == "<DIR>" {
            (true, 0)
        } else {
            (false, caps[7].parse().unwrap_or(0))
        };

        Some(Parsed::Entry(ParsedResource {
            is_directory: Some(is_directory),
            name: Some(caps[8].to_string()),
            size,
            owner: None,
            group: None,
            mode: None,
            mtime: epoch_from_ymd_hms(year, month, day, hour, minute, 0),
        }))
    }
}
