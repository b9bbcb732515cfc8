//! Unix `ls -l` style recognizers.
//!
//! ```text
//! drwxr-xr-x   2 user group  4096 Jan  1 12:00 dirname
//! -rw-r--r--   1 user group  1234 Jan  1  2025 file.txt
//! lrwxrwxrwx   1 user group    42 Jan  1 12:00 link -> target
//! ```
//!
//! The strict grammar demands every column; the lenient variant covers
//! servers that drop the group column.

use crate::ftp::parser::{epoch_from_month_day, ListingParser, Parsed, ParsedResource};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref UNIX_STRICT: Regex = Regex::new(
        r"(?x)
        ^([-dlbcps])([rwxsStT-]{9})\s+  # type char + permission string
        (\d+)\s+                        # link count
        (\S+)\s+                        # owner
        (\S+)\s+                        # group
        (\d+)\s+                        # size
        ([A-Za-z]{3})\s+                # month
        (\d{1,2})\s+                    # day
        ((?:\d{1,2}:\d{2})|\d{4})\s+    # time or year
        (.+)$                           # name (possibly with -> target)
        "
    )
    .unwrap();
    static ref UNIX_LENIENT: Regex = Regex::new(
        r"(?x)
        ^([-dlbcps])([rwxsStT-]{9})\s+
        (\d+)\s+                        # link count
        (\S+)\s+                        # owner (no group column)
        (\d+)\s+                        # size
        ([A-Za-z]{3})\s+
        (\d{1,2})\s+
        ((?:\d{1,2}:\d{2})|\d{4})\s+
        (.+)$
        "
    )
    .unwrap();
}

/// Strip the ` -> target` suffix symlink entries carry.
fn symlink_name(raw: &str) -> String {
    match raw.find(" -> ") {
        Some(pos) => raw[..pos].to_string(),
        None => raw.to_string(),
    }
}

/// Full `ls -l` grammar with owner and group columns.
pub struct UnixStrictParser;

impl ListingParser for UnixStrictParser {
    fn name(&self) -> &'static str {
        "unix-strict"
    }

    fn parse(&self, line: &str) -> Option<Parsed> {
        let caps = UNIX_STRICT.captures(line)?;

        let type_char = &caps[1];
        let name_raw = &caps[10];
        let name = if type_char == "l" {
            symlink_name(name_raw)
        } else {
            name_raw.to_string()
        };

        Some(Parsed::Entry(ParsedResource {
            is_directory: Some(type_char == "d"),
            name: Some(name),
            size: caps[6].parse().unwrap_or(0),
            owner: Some(caps[4].to_string()),
            group: Some(caps[5].to_string()),
            mode: Some(caps[2].to_string()),
            mtime: epoch_from_month_day(&caps[7], &caps[8], &caps[9]),
        }))
    }
}

/// Unix grammar without the group column, as some servers print.
pub struct UnixLenientParser;

impl ListingParser for UnixLenientParser {
    fn name(&self) -> &'static str {
        "unix-lenient"
    }

    fn parse(&self, line: &str) -> Option<Parsed> {
        let caps = UNIX_LENIENT.captures(line)?;

        let type_char = &caps[1];
        let name_raw = &caps[9];
        let name = if type_char == "l" {
            symlink_name(name_raw)
        } else {
            name_raw.to_string()
        };

        Some(Parsed::Entry(ParsedResource {
            is_directory: Some(type_char == "d"),
            name: Some(name),
            size: caps[5].parse().unwrap_or(0),
            owner: Some(caps[4].to_string()),
            group: None,
            mode: Some(caps[2].to_string()),
            mtime: epoch_from_month_day(&caps[6], &caps[7], &caps[8]),
        }))
    }
}
