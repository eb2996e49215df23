/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use crate::error::FtpAuthError;

const USERNAME_MAX_LENGTH: usize = u8::MAX as usize;
const PASSWORD_MAX_LENGTH: usize = u8::MAX as usize;

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Username {
    inner: String,
}

impl Username {
    pub fn from_original(s: &str) -> Result<Self, FtpAuthError> {
        if s.is_empty() {
            return Err(FtpAuthError::EmptyUsername);
        }
        if s.len() > USERNAME_MAX_LENGTH {
            return Err(FtpAuthError::UsernameTooLong);
        }
        if s.contains(['\r', '\n']) {
            return Err(FtpAuthError::LineBreakInUsername);
        }
        Ok(Username {
            inner: s.to_string(),
        })
    }

    #[inline]
    pub fn as_original(&self) -> &str {
        &self.inner
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}

#[derive(Clone, Eq, PartialEq)]
pub struct Password {
    inner: String,
}

impl Password {
    pub fn from_original(s: &str) -> Result<Self, FtpAuthError> {
        if s.len() > PASSWORD_MAX_LENGTH {
            return Err(FtpAuthError::PasswordTooLong);
        }
        if s.contains(['\r', '\n']) {
            return Err(FtpAuthError::LineBreakInPassword);
        }
        Ok(Password {
            inner: s.to_string(),
        })
    }

    #[inline]
    pub fn as_original(&self) -> &str {
        &self.inner
    }
}

// never leak the secret into logs
impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Login material shared by every request of one client.
///
/// `retries` is the number of extra attempts made after the first one
/// failed, so an operation runs at most `retries + 1` times.
#[derive(Clone, Debug)]
pub struct FtpCredentials {
    username: Username,
    password: Password,
    retries: usize,
}

impl FtpCredentials {
    pub fn new(username: &str, password: &str, retries: usize) -> Result<Self, FtpAuthError> {
        Ok(FtpCredentials {
            username: Username::from_original(username)?,
            password: Password::from_original(password)?,
            retries,
        })
    }

    #[inline]
    pub fn username(&self) -> &Username {
        &self.username
    }

    #[inline]
    pub fn password(&self) -> &Password {
        &self.password
    }

    #[inline]
    pub fn retries(&self) -> usize {
        self.retries
    }
}
