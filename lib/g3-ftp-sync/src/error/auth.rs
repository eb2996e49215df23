/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FtpAuthError {
    #[error("empty username")]
    EmptyUsername,
    #[error("too long string for a username")]
    UsernameTooLong,
    #[error("line break is not allowed in username")]
    LineBreakInUsername,
    #[error("too long string for a password")]
    PasswordTooLong,
    #[error("line break is not allowed in password")]
    LineBreakInPassword,
}
