//! Configuration types for the Airtable client.

use std::time::Duration;
use url::Url;

/// Configuration for the Airtable client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Airtable Web API.
    pub base_url: Url,
    /// Personal access token sent as a bearer header.
    pub api_key: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Retry configuration.
    pub retry_config: RetryConfig,
}

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one.
    pub max_retries: u32,
    /// Initial backoff duration.
    pub initial_backoff: Duration,
    /// Maximum backoff duration (cap on the exponential term).
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(1000),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Create a configuration that gives up after the first attempt.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 1,
            ..Default::default()
        }
    }

    /// Calculate the backoff duration before the attempt following `attempt`
    /// (1-based).
    ///
    /// The exponential term is capped at `max_backoff`, then ±25% uniform
    /// jitter is applied so concurrent clients don't retry in lockstep. The
    /// result is floored to whole milliseconds and never negative.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        use rand::Rng;

        let exponent = attempt.saturating_sub(1).min(32);
        let base_ms = (self.initial_backoff.as_millis() as f64
            * self.backoff_multiplier.powi(exponent as i32))
        .min(self.max_backoff.as_millis() as f64);

        let mut rng = rand::thread_rng();
        let jitter_factor = rng.gen_range(0.75..=1.25);
        Duration::from_millis((base_ms * jitter_factor).max(0.0) as u64)
    }
}
