//! Global request pacing

use governor::{clock::DefaultClock, state::InMemoryState, state::NotKeyed, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::time::Duration;

use crate::config::ConfigError;
use crate::shutdown::Shutdown;

/// Longest accepted spacing between two permits
pub const MAX_PACING_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Spacing between permits for a rate in requests per second
///
/// Rates faster than one request per nanosecond are paced at one per
/// nanosecond. Returns `None` for a rate that is not positive and finite or
/// slower than one request per [`MAX_PACING_PERIOD`].
pub fn pacing_period(rps: f64) -> Option<Duration> {
    if !(rps > 0.0 && rps.is_finite()) {
        return None;
    }
    let period = Duration::try_from_secs_f64(1.0 / rps).ok()?;
    if period > MAX_PACING_PERIOD {
        return None;
    }
    Some(period.max(Duration::from_nanos(1)))
}

/// Rate limiter using the GCRA algorithm via the governor crate
///
/// One instance is shared by every worker through an `Arc`, so the limit
/// applies to the aggregate request rate, not per worker. Permits are
/// spaced `1/rate` apart with a burst of a single permit.
pub struct RequestRateLimiter {
    limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    rate_limit: Option<f64>,
}

impl RequestRateLimiter {
    /// Create a new rate limiter
    ///
    /// `None` disables rate limiting. A rate [`pacing_period`] cannot turn
    /// into a permit spacing is rejected.
    ///
    /// # Examples
    /// ```
    /// use gb_core::worker::RequestRateLimiter;
    ///
    /// // One request every 10ms across all workers
    /// let limiter = RequestRateLimiter::new(Some(100.0)).unwrap();
    /// assert!(limiter.is_enabled());
    ///
    /// let unlimited = RequestRateLimiter::new(None).unwrap();
    /// assert!(!unlimited.is_enabled());
    /// ```
    pub fn new(rate_limit: Option<f64>) -> Result<Self, ConfigError> {
        let limiter = match rate_limit {
            None => None,
            Some(rps) => {
                let quota = pacing_period(rps)
                    .and_then(Quota::with_period)
                    .ok_or_else(|| {
                        ConfigError::InvalidRateLimit(format!(
                            "{rps} requests per second cannot be paced"
                        ))
                    })?
                    .allow_burst(NonZeroU32::MIN);
                Some(RateLimiter::direct(quota))
            }
        };

        Ok(Self {
            limiter,
            rate_limit,
        })
    }

    /// Wait until a request is allowed or the run is stopped
    ///
    /// Returns `false` if the wait was cut short by the stop signal.
    pub async fn wait_or_shutdown(&self, shutdown: &mut Shutdown) -> bool {
        let Some(ref limiter) = self.limiter else {
            return true;
        };

        tokio::select! {
            biased;

            _ = shutdown.recv() => false,
            _ = limiter.until_ready() => true,
        }
    }

    /// Check if rate limiting is enabled
    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }

    /// Get the configured rate limit (requests per second)
    pub fn rate_limit(&self) -> Option<f64> {
        self.rate_limit
    }

    #[cfg(test)]
    fn try_acquire(&self) -> bool {
        match &self.limiter {
            Some(limiter) => limiter.check().is_ok(),
            None => true,
        }
    }
}

impl std::fmt::Debug for RequestRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestRateLimiter")
            .field("rate_limit", &self.rate_limit)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
