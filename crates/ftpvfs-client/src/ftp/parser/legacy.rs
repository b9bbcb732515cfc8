//! Vendor-specific recognizers: Titan FTP, Novell Netware, IBM AS/400.

use crate::ftp::parser::{
    epoch_from_month_day, epoch_from_ymd_hms, month_number, ListingParser, Parsed, ParsedResource,
};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TITAN: Regex = Regex::new(
        r"(?x)
        ^([-dl])([rwxsStT-]{9})\s+
        (\d+)\s+                        # link count
        (\S+)\s+                        # owner
        (\S+)\s+                        # group
        (\d+)\s+                        # size
        ([A-Za-z]{3})\s+                # month
        (\d{1,2})\s+                    # day
        (\d{4})\s+                      # year
        (\d{1,2}:\d{2})\s+              # time
        (.+)$                           # name
        "
    )
    .unwrap();
    static ref NETWARE: Regex = Regex::new(
        r"(?x)
        ^([d-])\s+                      # type
        \[([^\]]*)\]\s+                 # netware rights
        (\S+)\s+                        # owner
        (\d+)\s+                        # size
        ([A-Za-z]{3})\s+                # month
        (\d{1,2})\s+                    # day
        ((?:\d{1,2}:\d{2})|\d{4})\s+    # time or year
        (.+)$                           # name
        "
    )
    .unwrap();
    static ref AS400: Regex = Regex::new(
        r"(?x)
        ^(\S+)\s+                       # owner
        (\d+)\s+                        # size
        (\d{2})/(\d{2})/(\d{2})\s+      # date
        (\d{1,2}):(\d{2}):(\d{2})\s+    # time
        (\*\w+)\s+                      # attribute (*STMF, *DIR, ...)
        (.+)$                           # name
        "
    )
    .unwrap();
}

/// Titan FTP server: unix-like, but the date column carries both a
/// four-digit year and a time. Runs before the plain unix grammars,
/// which would match these lines with the time swallowed by the name.
pub struct TitanParser;

impl ListingParser for TitanParser {
    fn name(&self) -> &'static str {
        "titan"
    }

    fn parse(&self, line: &str) -> Option<Parsed> {
        let caps = TITAN.captures(line)?;

        let year: i32 = caps[9].parse().ok()?;
        let (hour, minute) = caps[10].split_once(':')?;
        let mtime = match (
            month_number(&caps[7]),
            caps[8].parse::<u32>(),
            hour.parse::<u32>(),
            minute.parse::<u32>(),
        ) {
            (Some(month), Ok(day), Ok(h), Ok(m)) => epoch_from_ymd_hms(year, month, day, h, m, 0),
            _ => 0,
        };

        Some(Parsed::Entry(ParsedResource {
            is_directory: Some(&caps[1] == "d"),
            name: Some(caps[11].to_string()),
            size: caps[6].parse().unwrap_or(0),
            owner: Some(caps[4].to_string()),
            group: Some(caps[5].to_string()),
            mode: Some(caps[2].to_string()),
            mtime,
        }))
    }
}

/// Novell Netware:
/// ```text
/// d [RWCEAFMS] admin 512 Apr 13 23:12 public
/// - [RWCEAFMS] admin 512 Apr 13 23:12 readme.txt
/// ```
/// The bracketed rights string is Netware-specific and carries no
/// owner-read/write semantics we can map; `mode` stays unset.
pub struct NetwareParser;

impl ListingParser for NetwareParser {
    fn name(&self) -> &'static str {
        "netware"
    }

    fn parse(&self, line: &str) -> Option<Parsed> {
        let caps = NETWARE.captures(line)?;

        Some(Parsed::Entry(ParsedResource {
            is_directory: Some(&caps[1] == "d"),
            name: Some(caps[8].to_string()),
            size: caps[4].parse().unwrap_or(0),
            owner: Some(caps[3].to_string()),
            group: None,
            mode: None,
            mtime: epoch_from_month_day(&caps[5], &caps[6], &caps[7]),
        }))
    }
}

/// IBM AS/400:
/// ```text
/// QSYS       2048 01/15/26 10:30:00 *DIR library/
/// QSYS       1024 01/15/26 10:30:00 *STMF data.txt
/// ```
pub struct As400Parser;

impl ListingParser for As400Parser {
    fn name(&self) -> &'static str {
        "as400"
    }

    fn parse(&self, line: &str) -> Option<Parsed> {
        let caps = AS400.captures(line)?;

        let month: u32 = caps[3].parse().ok()?;
        let day: u32 = caps[4].parse().ok()?;
        let mut year: i32 = caps[5].parse().ok()?;
        year += if year < 69 { 2000 } else { 1900 };
        let hour: u32 = caps[6].parse().ok()?;
        let minute: u32 = caps[7].parse().ok()?;
        let second: u32 = caps[8].parse().ok()?;

        let is_directory = &caps[9] == "*DIR";
        let name = caps[10].trim_end_matches('/').to_string();

        Some(Parsed::Entry(ParsedResource {
            is_directory: Some(is_directory),
            name: Some(name),
            size: caps[2].parse().unwrap_or(0),
            owner: Some(caps[1].to_string()),
            group: None,
            mode: None,
            mtime: epoch_from_ymd_hms(year, month, day, hour, minute, second),
        }))
    }
}
