/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

use super::command::FtpCommandError;

/// Where a USER or PASS reply leaves the login.
pub(crate) enum FtpAuthStatus {
    Rejected,
    Accepted,
    PasswordRequired,
    AccountRequired,
}

#[derive(Debug, Error)]
pub enum FtpSessionOpenError {
    #[error("login command failed: {0}")]
    CommandFailed(FtpCommandError),
    #[error("service not available during login")]
    ServiceNotAvailable,
    #[error("credentials of user {0} rejected")]
    CredentialsRejected(String),
    #[error("server requires an account, which is not supported")]
    AccountRequired,
}

impl FtpSessionOpenError {
    pub(crate) fn from_command(e: FtpCommandError, username: &str) -> Self {
        match e {
            FtpCommandError::ServiceNotAvailable => FtpSessionOpenError::ServiceNotAvailable,
            FtpCommandError::NotLoggedIn => {
                FtpSessionOpenError::CredentialsRejected(username.to_string())
            }
            _ => FtpSessionOpenError::CommandFailed(e),
        }
    }
}
