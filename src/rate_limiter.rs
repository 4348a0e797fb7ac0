//! Minimum-interval gate shared by every client that draws on one quota.
//!
//! The embedding service enforces a quota per API project, not per client, so
//! all [`GeminiEmbedder`](crate::GeminiEmbedder) instances in a process share
//! a single [`RateLimiter`] by default (see [`RateLimiter::global`]). Tests and
//! callers with several independent quotas inject their own via
//! [`GeminiEmbedder::with_rate_limiter`](crate::GeminiEmbedder::with_rate_limiter).
//!
//! The state mutex is never held across a sleep: a waiter computes how long it
//! still has to wait, releases the lock, sleeps, and re-checks. A slot is only
//! granted while holding the lock, so no two grants are ever closer together
//! than the configured interval. Waiters are not served in FIFO order.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::errors::{EmbedderError, Result};

/// Default spacing between two outbound calls (20 s).
pub const DEFAULT_MIN_INTERVAL_MS: i64 = 20_000;

static GLOBAL: OnceLock<Arc<RateLimiter>> = OnceLock::new();

/// Enforces a minimum elapsed time between any two granted calls.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    /// Instant of the most recent grant; `None` until the first call.
    last_granted: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter with the given spacing.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_granted: Mutex::new(None),
        }
    }

    /// Create a limiter from a millisecond setting.
    ///
    /// # Errors
    /// [`EmbedderError::Configuration`] if `millis` is negative.
    pub fn from_millis(millis: i64) -> Result<Self> {
        Ok(Self::new(interval_from_millis(millis)?))
    }

    /// The process-wide limiter, created with [`DEFAULT_MIN_INTERVAL_MS`] on
    /// first use unless [`RateLimiter::configure_global`] ran earlier.
    pub fn global() -> Arc<RateLimiter> {
        GLOBAL
            .get_or_init(|| {
                Arc::new(Self::new(Duration::from_millis(DEFAULT_MIN_INTERVAL_MS as u64)))
            })
            .clone()
    }

    /// Set the interval of the process-wide limiter and return it.
    ///
    /// The global interval can only be chosen once. Repeating the same value
    /// is accepted; asking for a different one after the limiter exists
    /// (either configured or defaulted by [`RateLimiter::global`]) fails.
    ///
    /// # Errors
    /// [`EmbedderError::Configuration`] if `millis` is negative or conflicts
    /// with the interval already in effect.
    pub fn configure_global(millis: i64) -> Result<Arc<RateLimiter>> {
        let wanted = interval_from_millis(millis)?;
        let limiter = GLOBAL.get_or_init(|| Arc::new(Self::new(wanted))).clone();

        if limiter.min_interval != wanted {
            return Err(EmbedderError::Configuration(format!(
                "global rate limiter already configured with {} ms, cannot change to {} ms",
                limiter.min_interval.as_millis(),
                millis
            )));
        }
        Ok(limiter)
    }

    /// Minimum spacing between two granted calls.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// When the most recent call was granted, if any.
    pub fn last_granted(&self) -> Option<Instant> {
        *self.state()
    }

    /// Wait until at least [`min_interval`](Self::min_interval) has passed
    /// since the previous grant, record now as the new grant time, and return
    /// it.
    pub async fn acquire(&self) -> Instant {
        loop {
            let wait = {
                let mut last = self.state();
                let now = Instant::now();
                match *last {
                    Some(prev) if now.duration_since(prev) < self.min_interval => {
                        self.min_interval - now.duration_since(prev)
                    }
                    _ => {
                        *last = Some(now);
                        debug!("rate limiter slot granted");
                        return now;
                    }
                }
            };

            debug!(wait_ms = wait.as_millis() as u64, "rate limiter waiting");
            tokio::time::sleep(wait).await;
        }
    }

    fn state(&self) -> MutexGuard<'_, Option<Instant>> {
        // The guarded value is a plain timestamp; a panic elsewhere cannot
        // leave it half-written.
        self.last_granted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn interval_from_millis(millis: i64) -> Result<Duration> {
    u64::try_from(millis).map(Duration::from_millis).map_err(|_| {
        EmbedderError::Configuration(format!(
            "minimum request interval must be non-negative, got {millis} ms"
        ))
    })
}
