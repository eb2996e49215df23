/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use tokio::io::{AsyncRead, BufReader};

use crate::config::FtpTransferConfig;
use crate::error::FtpLineDataReadError;
use crate::io_ext::limited_read_until;

/// Reads a listing body from a data connection, line by line.
pub(crate) struct FtpListingReader<T: AsyncRead> {
    io: BufReader<T>,
    max_lines: usize,
    max_line_len: usize,
    line_buf: Vec<u8>,
}

impl<T> FtpListingReader<T>
where
    T: AsyncRead + Unpin,
{
    pub(crate) fn new(io: T, config: &FtpTransferConfig) -> Self {
        FtpListingReader {
            io: BufReader::new(io),
            max_lines: config.list_max_entries,
            max_line_len: config.list_max_line_len,
            line_buf: Vec::with_capacity(config.list_max_line_len),
        }
    }

    /// Reads until EOF, failing once more than `list_max_entries` lines
    /// have been seen.
    pub(crate) async fn read_to_end(mut self) -> Result<String, FtpLineDataReadError> {
        let mut text = String::new();
        let mut lines = 0usize;

        loop {
            self.line_buf.clear();
            let (found, nr) =
                limited_read_until(&mut self.io, b'\n', self.max_line_len, &mut self.line_buf)
                    .await?;
            if nr == 0 {
                return Ok(text);
            }
            lines += 1;
            if lines > self.max_lines {
                return Err(FtpLineDataReadError::TooManyLines);
            }
            if !found && nr >= self.max_line_len {
                return Err(FtpLineDataReadError::LineTooLong(lines));
            }

            let line = std::str::from_utf8(&self.line_buf)
                .map_err(|_| FtpLineDataReadError::UnsupportedEncoding)?;
            text.push_str(line);
            if !found {
                // last line without line ending
                return Ok(text);
            }
        }
    }
}
