/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use super::{
    FtpCommandError, FtpConnectError, FtpLineDataReadError, FtpSessionOpenError,
    FtpTransferServerError,
};

/// Any fault between building a request and receiving the final reply.
///
/// These never escape the client facade, they are logged and turned into
/// failed results there.
#[derive(Debug, Error)]
pub enum FtpTransportError {
    #[error("connect error: {0}")]
    ConnectFailed(#[from] FtpConnectError),
    #[error("login failed: {0}")]
    LoginFailed(#[from] FtpSessionOpenError),
    #[error("command error: {0}")]
    CommandFailed(#[from] FtpCommandError),
    #[error("data connection failed: {0:?}")]
    DataConnectFailed(io::Error),
    #[error("timed out to connect data channel")]
    DataConnectTimedOut,
    #[error("data transfer error: {0}")]
    TransferFailed(#[from] FtpTransferServerError),
    #[error("timeout to wait end reply")]
    TimeoutToWaitEndReply,
    #[error("listing read failed: {0}")]
    ListingReadFailed(#[from] FtpLineDataReadError),
    #[error("response has no data stream")]
    NoDataStream,
    #[error("no rename target set")]
    MissingRenameTarget,
}

impl FtpTransportError {
    /// The server reply code, if this fault was a negative server reply.
    pub fn reply_code(&self) -> Option<u16> {
        match self {
            FtpTransportError::CommandFailed(e) => e.reply_code(),
            FtpTransportError::LoginFailed(FtpSessionOpenError::CommandFailed(e)) => {
                e.reply_code()
            }
            FtpTransportError::LoginFailed(FtpSessionOpenError::CredentialsRejected(_)) => {
                Some(530)
            }
            FtpTransportError::TransferFailed(FtpTransferServerError::UnexpectedEndReplyCode(
                _,
                code,
            )) => Some(*code),
            _ => None,
        }
    }
}
