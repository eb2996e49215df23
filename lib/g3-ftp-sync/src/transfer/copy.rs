/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use log::warn;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const TRANSFER_CHUNK_SIZE: usize = 4096;

/// Result of moving one file in either direction.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TransferOutcome {
    pub success: bool,
    pub bytes_transferred: u64,
}

impl TransferOutcome {
    pub fn succeeded(bytes_transferred: u64) -> Self {
        TransferOutcome {
            success: true,
            bytes_transferred,
        }
    }

    pub fn failed(bytes_transferred: u64) -> Self {
        TransferOutcome {
            success: false,
            bytes_transferred,
        }
    }

    /// Folds two outcomes, success only if both succeeded.
    #[must_use]
    pub fn and(self, other: TransferOutcome) -> TransferOutcome {
        TransferOutcome {
            success: self.success && other.success,
            bytes_transferred: self.bytes_transferred + other.bytes_transferred,
        }
    }
}

/// Copies `source` into `destination` in chunks of [`TRANSFER_CHUNK_SIZE`].
///
/// The destination is flushed once the source reaches EOF. An I/O fault on
/// either side stops the copy and is reported as a failed outcome carrying
/// the bytes already written. Opening, positioning and closing both ends is
/// left to the caller.
pub async fn transfer<R, W>(source: &mut R, destination: &mut W) -> TransferOutcome
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buf = vec![0u8; TRANSFER_CHUNK_SIZE];
    let mut total: u64 = 0;

    loop {
        let nr = match source.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                warn!("transfer aborted after {total} bytes, read failed: {e}");
                return TransferOutcome::failed(total);
            }
        };
        if let Err(e) = destination.write_all(&buf[..nr]).await {
            warn!("transfer aborted after {total} bytes, write failed: {e}");
            return TransferOutcome::failed(total);
        }
        total += nr as u64;
    }

    if let Err(e) = destination.flush().await {
        warn!("transfer of {total} bytes failed to flush: {e}");
        return TransferOutcome::failed(total);
    }
    TransferOutcome::succeeded(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// Yields `limit` bytes, then fails.
    struct BrokenReader {
        remaining: usize,
    }

    impl AsyncRead for BrokenReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut tokio::io::ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            if self.remaining == 0 {
                return Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "reset by peer",
                )));
            }
            let n = self.remaining.min(buf.remaining());
            buf.put_slice(&vec![b'x'; n]);
            self.remaining -= n;
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn copy_preserves_content() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let mut source = data.as_slice();
        let mut destination = Vec::new();

        let outcome = transfer(&mut source, &mut destination).await;
        assert!(outcome.success);
        assert_eq!(outcome.bytes_transferred, data.len() as u64);
        assert_eq!(destination, data);
    }

    #[tokio::test]
    async fn copy_empty() {
        let mut source: &[u8] = b"";
        let mut destination = Vec::new();
        let outcome = transfer(&mut source, &mut destination).await;
        assert_eq!(outcome, TransferOutcome::succeeded(0));
    }

    #[tokio::test]
    async fn read_fault_keeps_count() {
        let mut source = BrokenReader { remaining: 5000 };
        let mut destination = Vec::new();

        let outcome = transfer(&mut source, &mut destination).await;
        assert!(!outcome.success);
        assert_eq!(outcome.bytes_transferred, 5000);
        assert_eq!(destination.len(), 5000);
    }

    #[test]
    fn fold_outcomes() {
        let a = TransferOutcome::succeeded(10);
        let b = TransferOutcome::failed(3);
        assert_eq!(a.and(a), TransferOutcome::succeeded(20));
        assert_eq!(a.and(b), TransferOutcome::failed(13));
        assert_eq!(b.and(a), TransferOutcome::failed(13));
    }
}
