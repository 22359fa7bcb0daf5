// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

/// Exponential backoff for transient API failures.
///
/// Used inside the data-fetching collaborator only; the orchestration core
/// never retries, so a failure that survives the backoff propagates to the
/// caller unmodified.
use std::time::Duration;

use masterror::AppError;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Backoff schedule applied around a fallible async operation.
#[derive(Debug, Clone)]
pub struct Backoff {
    /// Total number of attempts before giving up (default: 3).
    pub attempts:      u32,
    /// Delay before the second attempt in milliseconds (default: 1000).
    pub base_delay_ms: u64,
    /// Multiplier applied to the delay after each failure (default: 2.0).
    pub factor:        f64
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            attempts: 3, base_delay_ms: 1000, factor: 2.0
        }
    }
}

impl Backoff {
    /// Runs `operation` until it succeeds or the schedule is exhausted.
    ///
    /// # Errors
    ///
    /// Returns the last error produced by `operation` once every attempt
    /// has failed.
    pub async fn run<F, Fut, T>(&self, label: &str, mut operation: F) -> Result<T, AppError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, AppError>>
    {
        let mut attempt = 1;
        let mut delay_ms = self.base_delay_ms;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 1 {
                        debug!("{} succeeded on attempt {}", label, attempt);
                    }
                    return Ok(result);
                }
                Err(error) => {
                    if attempt >= self.attempts {
                        warn!("{} failed after {} attempts: {}", label, self.attempts, error);
                        return Err(error);
                    }

                    warn!(
                        "{} failed on attempt {}/{}: {}. Retrying in {}ms...",
                        label, attempt, self.attempts, error, delay_ms
                    );

                    sleep(Duration::from_millis(delay_ms)).await;
                    delay_ms = (delay_ms as f64 * self.factor) as u64;
                    attempt += 1;
                }
            }
        }
    }
}
