/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use super::FtpListingEntry;

const DIR_MARKER: &str = "<DIR>";
const NAME_COLUMN: usize = 39;

fn is_date(s: &str) -> bool {
    let parts: Vec<&str> = s.split('-').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|c| c.is_ascii_digit()))
}

pub(super) fn looks_like(line: &str) -> bool {
    line.split_whitespace().next().map(is_date).unwrap_or(false)
}

pub(super) fn parse_line(line: &str) -> Option<FtpListingEntry> {
    let tokens: Vec<&str> = line.split_whitespace().take(3).collect();
    if tokens.len() < 3 || !is_date(tokens[0]) {
        return None;
    }

    let is_directory = tokens[2] == DIR_MARKER;
    if !is_directory && u64::from_str(tokens[2]).is_err() {
        return None;
    }

    let name = line.get(NAME_COLUMN..)?.trim_end();
    if name.is_empty() || name.starts_with(' ') {
        return None;
    }

    let raw_tokens = tokens.iter().map(|s| s.to_string()).collect();
    Some(FtpListingEntry::new(raw_tokens, is_directory, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory() {
        let e = parse_line("02-14-23  10:15AM       <DIR>          subdir").unwrap();
        assert!(e.is_directory());
        assert_eq!(e.name(), "subdir");
        assert_eq!(e.raw_tokens(), ["02-14-23", "10:15AM", "<DIR>"]);
    }

    #[test]
    fn file_with_space() {
        let e = parse_line("02-14-23  10:15AM                 1234 build log.txt").unwrap();
        assert!(!e.is_directory());
        assert_eq!(e.name(), "build log.txt");
        assert_eq!(e.raw_tokens()[2], "1234");
    }

    #[test]
    fn malformed() {
        assert!(parse_line("").is_none());
        assert!(parse_line("02-14-23  10:15AM").is_none());
        // name column missing
        assert!(parse_line("02-14-23  10:15AM  1234 a.txt").is_none());
        assert!(parse_line("02-14-23  10:15AM                 12x4 a.txt").is_none());
        assert!(parse_line("drwxr-xr-x 2 ftp ftp 4096 Feb 14 10:15 subdir").is_none());
    }
}
