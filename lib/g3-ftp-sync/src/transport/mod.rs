/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::FtpRequest;
use crate::error::FtpTransportError;

mod wire;
pub use wire::{FtpWireResponse, FtpWireTransport};

#[cfg(test)]
pub(crate) mod mock;

/// A server reply, as seen by the caller.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FtpStatus {
    pub code: u16,
    pub message: String,
}

impl FtpStatus {
    pub fn new(code: u16, message: &str) -> Self {
        FtpStatus {
            code,
            message: message.to_string(),
        }
    }

    /// Preliminary, completion and intermediate replies.
    #[inline]
    pub fn is_positive(&self) -> bool {
        (100..400).contains(&self.code)
    }
}

impl fmt::Display for FtpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.message)
    }
}

/// The outcome of one executed request.
///
/// It must be closed to learn the final status of a data transfer.
/// Dropping it without closing releases the sockets.
#[async_trait]
pub trait FtpResponse: Send + Sized {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    fn status(&self) -> &FtpStatus;
    fn content_length(&self) -> Option<u64>;
    fn last_modified(&self) -> Option<DateTime<Utc>>;
    /// The data connection, for methods that transfer data.
    fn stream(&mut self) -> Option<&mut Self::Stream>;

    async fn close(self) -> Result<FtpStatus, FtpTransportError>;
}

#[async_trait]
pub trait FtpTransport: Send {
    type Response: FtpResponse;

    async fn execute(&mut self, request: &FtpRequest) -> Result<Self::Response, FtpTransportError>;
}
