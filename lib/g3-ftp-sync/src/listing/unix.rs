/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use super::FtpListingEntry;

// mode, links, owner, group, size, month, day, time or year
const LEADING_FIELDS: usize = 8;

fn is_mode(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 10
        && b"-dlbcps".contains(&b[0])
        && b[1..10]
            .iter()
            .all(|c| b"rwxsStTl-".contains(c))
}

pub(super) fn is_total_line(line: &str) -> bool {
    let mut it = line.split_whitespace();
    it.next() == Some("total") && it.next().is_some() && it.next().is_none()
}

pub(super) fn looks_like(line: &str) -> bool {
    line.split_whitespace().next().map(is_mode).unwrap_or(false)
}

/// Splits off `n` whitespace separated fields, returning them and the rest
/// of the line with its inner spacing kept.
fn split_fields(line: &str, n: usize) -> Option<(Vec<&str>, &str)> {
    let mut fields = Vec::with_capacity(n);
    let mut rest = line.trim_start();
    for _ in 0..n {
        let end = rest.find(char::is_whitespace)?;
        fields.push(&rest[..end]);
        rest = rest[end..].trim_start();
    }
    Some((fields, rest))
}

pub(super) fn parse_line(line: &str) -> Option<FtpListingEntry> {
    let (fields, rest) = split_fields(line, LEADING_FIELDS)?;
    let mode = fields[0];
    if !is_mode(mode) {
        return None;
    }

    let rest = rest.trim_end();
    let name = if mode.starts_with('l') {
        rest.split_once(" -> ").map(|(n, _)| n).unwrap_or(rest)
    } else {
        rest
    };
    if name.is_empty() {
        return None;
    }

    let raw_tokens = fields.iter().map(|s| s.to_string()).collect();
    Some(FtpListingEntry::new(raw_tokens, mode.starts_with('d'), name))
}
