//! Retry with backoff for transient transport failures.
//!
//! Retries sleep on the polling thread, which is also the thread that
//! watches for Ctrl+C, so the backoff carries a total budget per read.

use log::{debug, warn};
use std::time::Duration;

use super::MemorySource;
use crate::domain::{Address, SourceError};

/// Decides how long to wait before the next attempt.
pub trait RetryStrategy {
    /// Delay before retry number `attempt` (1-based), or `None` to give up.
    fn delay_for(&self, attempt: u32) -> Option<Duration>;
}

/// Doubling delay, capped, with a bounded number of retries
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    pub initial: Duration,
    pub max_delay: Duration,
    pub max_retries: u32,
    /// Most time one read may spend sleeping between attempts
    pub max_total: Duration,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(50),
            max_delay: Duration::from_secs(2),
            max_retries: 5,
            max_total: Duration::from_millis(400),
        }
    }
}

impl RetryStrategy for ExponentialBackoff {
    fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_retries {
            return None;
        }
        let waited: Duration = (1..attempt).map(|n| self.step(n)).sum();
        let delay = self.step(attempt);
        (waited.saturating_add(delay) <= self.max_total).then_some(delay)
    }
}

impl ExponentialBackoff {
    fn step(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
        self.initial.saturating_mul(factor).min(self.max_delay)
    }
}

/// Wraps a source and retries failed reads according to a strategy.
pub struct RetryingSource<S, R> {
    inner: S,
    strategy: R,
}

impl<S: MemorySource, R: RetryStrategy> RetryingSource<S, R> {
    pub fn new(inner: S, strategy: R) -> Self {
        Self { inner, strategy }
    }
}

impl<S: MemorySource, R: RetryStrategy> MemorySource for RetryingSource<S, R> {
    fn read(&mut self, address: Address, size: usize) -> Result<Vec<u8>, SourceError> {
        let mut attempt = 0u32;
        loop {
            match self.inner.read(address, size) {
                Ok(bytes) => {
                    if attempt > 0 {
                        debug!("Read at {address} succeeded after {attempt} retries");
                    }
                    return Ok(bytes);
                }
                Err(e) => {
                    attempt += 1;
                    let Some(delay) = self.strategy.delay_for(attempt) else {
                        return Err(SourceError::RetriesExhausted {
                            attempts: attempt,
                            last: Box::new(e),
                        });
                    };
                    warn!("Read at {address} failed ({e}), retrying in {}ms", delay.as_millis());
                    std::thread::sleep(delay);
                }
            }
        }
    }
}
