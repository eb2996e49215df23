/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod auth;
mod client;
mod config;
mod connection;
mod control;
mod debug;
mod error;
mod io_ext;
mod listing;
mod request;
mod retry;
mod sync;
mod transfer;
mod transport;

pub use auth::{FtpCredentials, Password, Username};
pub use client::FtpClient;
pub use config::{FtpClientConfig, FtpControlConfig, FtpTransferConfig};
pub use connection::{FtpConnectionProvider, TcpConnectionProvider};
pub use debug::{FTP_DEBUG_LOG_LEVEL, FTP_DEBUG_LOG_TARGET};
pub use error::{
    FtpAuthError, FtpCommandError, FtpConnectError, FtpRawResponseError, FtpRequestError,
    FtpSessionOpenError, FtpSyncError, FtpTransferServerError, FtpTransportError,
};
pub use listing::{FtpListingDialect, FtpListingEntry, parse_detailed, parse_names};
pub use request::{FtpMethod, FtpRequest, FtpRequestFactory};
pub use retry::{FtpRetryPolicy, retry_until, retry_until_some};
pub use sync::FtpSyncReport;
pub use transfer::{TRANSFER_CHUNK_SIZE, TransferOutcome, transfer};
pub use transport::{FtpResponse, FtpStatus, FtpTransport, FtpWireResponse, FtpWireTransport};
