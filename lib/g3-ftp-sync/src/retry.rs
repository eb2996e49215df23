/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use log::warn;

/// Bounds the attempts of one operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FtpRetryPolicy {
    /// extra attempts after the first one
    pub retries: usize,
    /// fixed pause between two attempts
    pub delay: Duration,
}

impl FtpRetryPolicy {
    pub fn new(retries: usize, delay: Duration) -> Self {
        FtpRetryPolicy { retries, delay }
    }

    #[inline]
    pub fn max_attempts(&self) -> usize {
        self.retries.saturating_add(1)
    }
}

/// Runs `probe` until it returns `true`, at most `retries + 1` times.
///
/// The probe gets the 1-based attempt number. Every failed attempt is
/// logged, and `delay` is slept between two attempts but not after the
/// last one.
pub async fn retry_until<F>(policy: FtpRetryPolicy, label: &str, mut probe: F) -> bool
where
    F: AsyncFnMut(usize) -> bool,
{
    retry_until_some(policy, label, async |attempt| {
        probe(attempt).await.then_some(())
    })
    .await
    .is_some()
}

/// Runs `probe` until it yields a value, at most `retries + 1` times.
pub async fn retry_until_some<T, F>(policy: FtpRetryPolicy, label: &str, mut probe: F) -> Option<T>
where
    F: AsyncFnMut(usize) -> Option<T>,
{
    let max_attempts = policy.max_attempts();
    for attempt in 1..=max_attempts {
        if let Some(v) = probe(attempt).await {
            return Some(v);
        }
        warn!("{label}: attempt {attempt}/{max_attempts} failed");
        if attempt < max_attempts && !policy.delay.is_zero() {
            tokio::time::sleep(policy.delay).await;
        }
    }
    None
}
