/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod copy;
pub use copy::{TRANSFER_CHUNK_SIZE, TransferOutcome, transfer};

mod line;
pub(crate) use line::FtpListingReader;
