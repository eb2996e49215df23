/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::FtpRequestError;

#[derive(Debug, Error)]
pub enum FtpSyncError {
    #[error("{0}")]
    InvalidPath(#[from] FtpRequestError),
    #[error("remote root {0} can neither be listed nor created")]
    RemoteRootUnavailable(String),
    #[error("local root {0} can not be created: {1:?}")]
    LocalRootUnavailable(PathBuf, io::Error),
    #[error("local root {0} is not readable: {1:?}")]
    LocalRootUnreadable(PathBuf, io::Error),
}
