/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

/// Reads until `delimiter` but never more than `max_len` bytes.
///
/// Returns whether the delimiter was found and how many bytes were
/// appended to `buf`. A zero length means EOF.
pub(crate) async fn limited_read_until<R>(
    reader: &mut R,
    delimiter: u8,
    max_len: usize,
    buf: &mut Vec<u8>,
) -> io::Result<(bool, usize)>
where
    R: AsyncBufRead + Unpin,
{
    let start = buf.len();
    let nr = reader
        .take(max_len as u64)
        .read_until(delimiter, buf)
        .await?;
    let found = nr > 0 && buf.get(start + nr - 1) == Some(&delimiter);
    Ok((found, nr))
}
