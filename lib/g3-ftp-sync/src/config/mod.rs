/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use crate::listing::FtpListingDialect;

#[cfg(feature = "yaml")]
mod yaml;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FtpControlConfig {
    pub max_line_len: usize,
    pub max_multi_lines: usize,
    pub command_timeout: Duration,
}

impl Default for FtpControlConfig {
    fn default() -> Self {
        FtpControlConfig {
            max_line_len: 2048,
            max_multi_lines: 128,
            command_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FtpTransferConfig {
    pub list_max_line_len: usize,
    pub list_max_entries: usize,
    pub(crate) list_all_timeout: Duration,
    pub end_wait_timeout: Duration,
}

impl Default for FtpTransferConfig {
    fn default() -> Self {
        FtpTransferConfig {
            list_max_line_len: 2048,
            list_max_entries: 65536,
            list_all_timeout: Duration::from_secs(120),
            end_wait_timeout: Duration::from_secs(2),
        }
    }
}

impl FtpTransferConfig {
    pub fn set_list_all_timeout(&mut self, timeout: Duration) {
        // a zero timeout would fail every listing
        if !timeout.is_zero() {
            self.list_all_timeout = timeout;
        }
    }

    #[inline]
    pub fn list_all_timeout(&self) -> Duration {
        self.list_all_timeout
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FtpClientConfig {
    pub control: FtpControlConfig,
    pub transfer: FtpTransferConfig,
    pub connect_timeout: Duration,
    pub greeting_timeout: Duration,
    pub always_try_epsv: bool,
    /// Fixed pause between two attempts of the same operation.
    pub retry_delay: Duration,
    /// Layout of detailed listings, detected from the reply when unset.
    pub listing_dialect: Option<FtpListingDialect>,
}

impl Default for FtpClientConfig {
    fn default() -> Self {
        FtpClientConfig {
            control: Default::default(),
            transfer: Default::default(),
            connect_timeout: Duration::from_secs(30),
            greeting_timeout: Duration::from_secs(10),
            always_try_epsv: true,
            retry_delay: Duration::from_secs(1),
            listing_dialect: None,
        }
    }
}
