/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use super::FtpRawResponseError;
use crate::control::FtpCommand;

#[derive(Debug, Error)]
pub enum FtpTransferServerError {
    #[error("unable to recv end reply: {0}")]
    RecvFailed(#[from] FtpRawResponseError),
    #[error("restart marker reply is not supported")]
    RestartNeeded,
    #[error("data connection not established")]
    DataTransferNotEstablished,
    #[error("data connection lost")]
    DataTransferLost,
    #[error("server local processing failed")]
    ServerFailed,
    #[error("page type unknown")]
    PageTypeUnknown,
    #[error("exceeded storage allocation")]
    ExceededStorageAllocation,
    #[error("file unavailable")]
    FileUnavailable,
    #[error("unexpected end reply code ({0} -> {1})")]
    UnexpectedEndReplyCode(FtpCommand, u16),
}

#[derive(Debug, Error)]
pub enum FtpLineDataReadError {
    #[error("read failed: {0:?}")]
    ReadFailed(#[from] io::Error),
    #[error("line {0} too long")]
    LineTooLong(usize),
    #[error("too many lines")]
    TooManyLines,
    #[error("unsupported encoding")]
    UnsupportedEncoding,
}
