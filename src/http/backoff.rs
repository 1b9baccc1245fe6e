//! Deterministic exponential backoff, modelled after the gRPC
//! connection-backoff scheme but without randomized jitter so retry timing is
//! reproducible in tests.

use std::time::Duration;

const BACKOFF_INITIAL: Duration = Duration::from_secs(1);
const BACKOFF_MULTIPLIER: f64 = 1.6;

/// Cap for delays between general request retries.
pub(crate) const REQUEST_BACKOFF_CAP: Duration = Duration::from_secs(120);

/// Cap for delays between document-status polls.
pub(crate) const POLL_BACKOFF_CAP: Duration = Duration::from_secs(60);

/// Per-operation retry state. Created fresh for each logical operation and
/// discarded after success or exhaustion.
#[derive(Debug)]
pub struct BackoffTimer {
    current: Duration,
    cap: Duration,
    min_timeout: Duration,
    retries: u32,
}

impl BackoffTimer {
    pub fn new(min_timeout: Duration) -> Self {
        Self::with_cap(min_timeout, REQUEST_BACKOFF_CAP)
    }

    pub fn with_cap(min_timeout: Duration, cap: Duration) -> Self {
        Self {
            current: BACKOFF_INITIAL,
            cap,
            min_timeout,
            retries: 0,
        }
    }

    /// Number of delays handed out so far.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Timeout to apply to the next attempt: the current backoff window, but
    /// never below the configured minimum connection timeout.
    pub fn timeout(&self) -> Duration {
        self.current.max(self.min_timeout)
    }

    /// Returns the delay to sleep before the next attempt and advances the
    /// backoff window. Delays are non-decreasing and capped.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.mul_f64(BACKOFF_MULTIPLIER).min(self.cap);
        self.retries += 1;
        delay
    }
}
