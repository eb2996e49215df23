/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod auth;
mod command;
mod connect;
mod request;
mod response;
mod session;
mod sync;
mod transfer;
mod transport;

pub use auth::FtpAuthError;
pub use command::FtpCommandError;
pub use connect::FtpConnectError;
pub use request::FtpRequestError;
pub use response::FtpRawResponseError;
pub(crate) use session::FtpAuthStatus;
pub use session::FtpSessionOpenError;
pub use sync::FtpSyncError;
pub(crate) use transfer::FtpLineDataReadError;
pub use transfer::FtpTransferServerError;
pub use transport::FtpTransportError;
