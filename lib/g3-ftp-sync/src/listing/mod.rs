/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;

mod classic;
mod unix;

/// One parsed line of a detailed directory listing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FtpListingEntry {
    raw_tokens: Vec<String>,
    is_directory: bool,
    name: String,
}

impl FtpListingEntry {
    pub(crate) fn new(raw_tokens: Vec<String>, is_directory: bool, name: &str) -> Self {
        FtpListingEntry {
            raw_tokens,
            is_directory,
            name: name.to_string(),
        }
    }

    /// The leading fields of the line, before the name.
    #[inline]
    pub fn raw_tokens(&self) -> &[String] {
        &self.raw_tokens
    }

    #[inline]
    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this is the `.` or `..` pseudo entry.
    pub fn is_dot_entry(&self) -> bool {
        self.name == "." || self.name == ".."
    }
}

/// Textual layout of a detailed (`LIST`) directory listing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FtpListingDialect {
    /// Fixed width layout of IIS and other Windows servers:
    /// `02-14-23  10:15AM       <DIR>          name`.
    ClassicColumn,
    /// `ls -l` layout of Unix servers.
    UnixLong,
}

impl FtpListingDialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            FtpListingDialect::ClassicColumn => "classic",
            FtpListingDialect::UnixLong => "unix",
        }
    }

    /// Guesses the dialect from the first meaningful line of `raw`.
    pub fn detect(raw: &str) -> Option<Self> {
        let line = raw
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .find(|l| !l.trim().is_empty() && !unix::is_total_line(l))?;

        if unix::looks_like(line) {
            Some(FtpListingDialect::UnixLong)
        } else if classic::looks_like(line) {
            Some(FtpListingDialect::ClassicColumn)
        } else {
            None
        }
    }

    fn parse_line(&self, line: &str) -> Option<FtpListingEntry> {
        match self {
            FtpListingDialect::ClassicColumn => classic::parse_line(line),
            FtpListingDialect::UnixLong => unix::parse_line(line),
        }
    }
}

impl fmt::Display for FtpListingDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FtpListingDialect {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "classic" | "classic_column" | "dos" | "iis" | "windows" => {
                Ok(FtpListingDialect::ClassicColumn)
            }
            "unix" | "unix_long" | "ls" => Ok(FtpListingDialect::UnixLong),
            _ => Err(()),
        }
    }
}

fn non_empty_lines(raw: &str) -> impl Iterator<Item = &str> {
    raw.lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.trim().is_empty())
}

/// Splits a name-only (`NLST`) listing into entry names.
pub fn parse_names(raw: &str) -> Vec<String> {
    non_empty_lines(raw).map(|l| l.to_string()).collect()
}

/// Parses a detailed (`LIST`) listing, skipping every line that does not
/// match `dialect`.
pub fn parse_detailed(raw: &str, dialect: FtpListingDialect) -> Vec<FtpListingEntry> {
    non_empty_lines(raw)
        .filter_map(|l| dialect.parse_line(l))
        .collect()
}
