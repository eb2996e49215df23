/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use tokio::io::{AsyncRead, AsyncWrite};

use super::FtpControlChannel;
use crate::error::FtpRawResponseError;
use crate::io_ext::limited_read_until;
use crate::transport::FtpStatus;

#[derive(Debug)]
pub(crate) enum FtpRawResponse {
    SingleLine(u16, String),
    MultiLine(u16, Vec<String>),
}

fn parse_reply_code(line: &[u8]) -> Result<u16, FtpRawResponseError> {
    if line.len() < 4 || !line[..3].iter().all(u8::is_ascii_digit) {
        return Err(FtpRawResponseError::InvalidLineFormat);
    }
    let code = line[..3]
        .iter()
        .fold(0u16, |acc, c| acc * 10 + u16::from(c - b'0'));
    if !(100..600).contains(&code) {
        return Err(FtpRawResponseError::InvalidReplyCode(code));
    }
    Ok(code)
}

fn line_text(line: &[u8]) -> Result<&str, FtpRawResponseError> {
    std::str::from_utf8(line)
        .map(|s| s.trim_end())
        .map_err(|_| FtpRawResponseError::LineIsNotUtf8)
}

impl FtpRawResponse {
    pub(super) fn parse_single_line(line: &[u8]) -> Result<Self, FtpRawResponseError> {
        let code = parse_reply_code(line)?;
        let msg = line_text(&line[4..])?;
        Ok(FtpRawResponse::SingleLine(code, msg.to_string()))
    }

    pub(super) fn get_multi_line_parser(
        line: &[u8],
        max_lines: usize,
    ) -> Result<FtpMultiLineReplyParser, FtpRawResponseError> {
        let code = parse_reply_code(line)?;
        let end_prefix = [line[0], line[1], line[2], b' '];
        let mut lines = Vec::<String>::with_capacity(max_lines.min(16));
        lines.push(line_text(&line[4..])?.to_string());
        Ok(FtpMultiLineReplyParser {
            code,
            end_prefix,
            lines,
        })
    }

    pub(crate) fn code(&self) -> u16 {
        match self {
            FtpRawResponse::SingleLine(code, _) => *code,
            FtpRawResponse::MultiLine(code, _) => *code,
        }
    }

    pub(crate) fn line_trimmed(&self) -> Option<&str> {
        match self {
            FtpRawResponse::SingleLine(_, line) => Some(line.as_str().trim()),
            FtpRawResponse::MultiLine(_, _) => None,
        }
    }

    /// The human readable part of the reply, the first line only for
    /// multi-line replies.
    pub(crate) fn message(&self) -> &str {
        match self {
            FtpRawResponse::SingleLine(_, line) => line.as_str(),
            FtpRawResponse::MultiLine(_, lines) => lines.first().map(|s| s.as_str()).unwrap_or(""),
        }
    }

    pub(crate) fn to_status(&self) -> FtpStatus {
        FtpStatus::new(self.code(), self.message())
    }

    pub(crate) fn parse_pasv_227_reply(&self) -> Option<SocketAddr> {
        let line = match self {
            FtpRawResponse::SingleLine(_, line) => line,
            FtpRawResponse::MultiLine(_, _) => return None,
        };

        let p_start = memchr::memchr(b'(', line.as_bytes())?;
        let p_end = memchr::memchr(b')', &line.as_bytes()[p_start..])? + p_start;

        let a: Vec<&str> = line[p_start + 1..p_end].split(',').collect();
        if a.len() != 6 {
            return None;
        }

        let mut v = [0u8; 6];
        for (i, s) in a.iter().enumerate() {
            v[i] = u8::from_str(s.trim()).ok()?;
        }

        let ip = IpAddr::V4(Ipv4Addr::new(v[0], v[1], v[2], v[3]));
        let port = (u16::from(v[4]) << 8) + u16::from(v[5]);
        Some(SocketAddr::new(ip, port))
    }

    pub(crate) fn parse_epsv_229_reply(&self) -> Option<u16> {
        let line = match self {
            FtpRawResponse::SingleLine(_, line) => line,
            FtpRawResponse::MultiLine(_, _) => return None,
        };

        let p_start = memchr::memchr(b'(', line.as_bytes())?;
        let p_end = memchr::memchr(b')', &line.as_bytes()[p_start..])? + p_start;

        // (|||port|)
        let inner = &line[p_start + 1..p_end];
        let port = inner.strip_prefix("|||")?.strip_suffix('|')?;
        u16::from_str(port).ok()
    }

    /// Byte count announced in a `150 ... (1234 bytes)` preliminary reply.
    pub(crate) fn parse_150_byte_count(&self) -> Option<u64> {
        let line = self.message();
        let p_start = memchr::memrchr(b'(', line.as_bytes())?;
        let p_end = memchr::memchr(b')', &line.as_bytes()[p_start..])? + p_start;
        let (count, unit) = line[p_start + 1..p_end].split_once(' ')?;
        if unit.eq_ignore_ascii_case("bytes") {
            u64::from_str(count).ok()
        } else {
            None
        }
    }
}

pub(super) struct FtpMultiLineReplyParser {
    code: u16,
    end_prefix: [u8; 4],
    lines: Vec<String>,
}

impl FtpMultiLineReplyParser {
    pub(super) fn feed_line(&mut self, line: &[u8]) -> Result<bool, FtpRawResponseError> {
        if line.starts_with(&self.end_prefix) {
            self.lines.push(line_text(&line[4..])?.to_string());
            Ok(true)
        } else {
            // do not trim whitespace at beginning
            self.lines.push(line_text(line)?.to_string());
            Ok(false)
        }
    }

    pub(super) fn finish(self) -> FtpRawResponse {
        FtpRawResponse::MultiLine(self.code, self.lines)
    }
}

impl<T> FtpControlChannel<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    async fn read_line(
        &mut self,
        buf: &mut Vec<u8>,
        min_len: usize,
    ) -> Result<(), FtpRawResponseError> {
        buf.clear();

        let (found, len) =
            limited_read_until(&mut self.stream, b'\n', self.config.max_line_len, buf)
                .await
                .map_err(FtpRawResponseError::ReadFailed)?;

        #[cfg(feature = "log-raw-io")]
        crate::debug::log_rsp(String::from_utf8_lossy(buf).trim_end());

        if len == 0 {
            Err(FtpRawResponseError::ConnectionClosed)
        } else if !found {
            Err(FtpRawResponseError::LineTooLong(self.config.max_line_len))
        } else if len < min_len {
            Err(FtpRawResponseError::InvalidLineFormat)
        } else {
            Ok(())
        }
    }

    pub(super) async fn read_raw_response(
        &mut self,
    ) -> Result<FtpRawResponse, FtpRawResponseError> {
        let mut buf = Vec::<u8>::with_capacity(self.config.max_line_len);
        // at least <code><sp|->\n
        self.read_line(&mut buf, 5).await?;

        match buf[3] {
            b' ' | b'\r' | b'\n' => FtpRawResponse::parse_single_line(&buf),
            b'-' => {
                let mut ml_parser =
                    FtpRawResponse::get_multi_line_parser(&buf, self.config.max_multi_lines)?;
                for _i in 0..self.config.max_multi_lines {
                    self.read_line(&mut buf, 1).await?;
                    if ml_parser.feed_line(&buf)? {
                        return Ok(ml_parser.finish());
                    }
                }
                Err(FtpRawResponseError::TooManyLines(self.config.max_multi_lines))
            }
            _ => Err(FtpRawResponseError::InvalidLineFormat),
        }
    }

    pub(super) async fn timed_read_raw_response(
        &mut self,
        stage: &'static str,
    ) -> Result<FtpRawResponse, FtpRawResponseError> {
        match tokio::time::timeout(self.config.command_timeout, self.read_raw_response()).await {
            Ok(r) => r,
            Err(_) => Err(FtpRawResponseError::ReadResponseTimedOut(stage)),
        }
    }
}
