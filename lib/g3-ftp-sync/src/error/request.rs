/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FtpRequestError {
    #[error("invalid path {0}: {1}")]
    InvalidPath(String, &'static str),
}
