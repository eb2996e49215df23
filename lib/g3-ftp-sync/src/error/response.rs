/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

/// Failures while reading one reply from the control connection.
#[derive(Debug, Error)]
pub enum FtpRawResponseError {
    #[error("control read failed: {0:?}")]
    ReadFailed(io::Error),
    #[error("control connection closed by server")]
    ConnectionClosed,
    #[error("reply line exceeds {0} bytes")]
    LineTooLong(usize),
    #[error("malformed reply line")]
    InvalidLineFormat,
    #[error("reply code {0} out of range")]
    InvalidReplyCode(u16),
    #[error("reply line is not valid utf-8")]
    LineIsNotUtf8,
    #[error("multi-line reply exceeds {0} lines")]
    TooManyLines(usize),
    #[error("no reply for '{0}' within the command timeout")]
    ReadResponseTimedOut(&'static str),
}
