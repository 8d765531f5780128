//! Bounded retry configuration for transient API failures.

use core::time::Duration;
use serde::{Deserialize, Serialize};
use tokio_retry::strategy::{ExponentialBackoff, jitter};

/// How often, and how patiently, a failed request is retried.
///
/// `max_retries` counts attempts on top of the original request, so a policy
/// with `max_retries = 3` issues at most four requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetryPolicy {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry; doubles on each subsequent retry.
    #[serde(default = "default_base_delay", with = "humantime_serde")]
    pub base_delay: Duration,

    /// Upper bound for any single delay.
    #[serde(default = "default_max_delay", with = "humantime_serde")]
    pub max_delay: Duration,
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_base_delay() -> Duration {
    Duration::from_secs(1)
}

const fn default_max_delay() -> Duration {
    Duration::from_secs(10)
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay: default_base_delay(),
            max_delay: default_max_delay(),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// The deterministic backoff schedule, one entry per permitted retry.
    pub fn backoff(&self) -> impl Iterator<Item = Duration> + use<> {
        // ExponentialBackoff yields `factor * 2^n` ms for a base of 2, so halve the factor
        // to make the first delay equal to `base_delay`.
        let base_ms = u64::try_from(self.base_delay.as_millis()).unwrap_or(u64::MAX);
        ExponentialBackoff::from_millis(2)
            .factor(base_ms / 2)
            .max_delay(self.max_delay)
            .take(self.max_retries as usize)
    }

    /// The backoff schedule with random jitter applied, as used by the client.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + use<> {
        self.backoff().map(jitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_bounded() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff().count(), 3);
    }

    #[test]
    fn backoff_doubles_from_base_delay() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(60),
        };

        let delays: Vec<_> = policy.backoff().collect();
        assert_eq!(
            delays,
            vec![Duration::from_millis(100), Duration::from_millis(200), Duration::from_millis(400)]
        );
    }

    #[test]
    fn backoff_is_capped_by_max_delay() {
        let policy = RetryPolicy {
            max_retries: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(3),
        };

        assert!(policy.backoff().all(|d| d <= Duration::from_secs(3)));
        assert_eq!(policy.backoff().last(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn none_policy_has_no_retries() {
        assert_eq!(RetryPolicy::none().delays().count(), 0);
    }

    #[test]
    fn jittered_delays_never_exceed_schedule() {
        let policy = RetryPolicy {
            max_retries: 4,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(1),
        };

        for (jittered, nominal) in policy.delays().zip(policy.backoff()) {
            assert!(jittered <= nominal);
        }
    }

    #[test]
    fn deserializes_humantime_values() {
        let policy: RetryPolicy = toml::from_str("max_retries = 2\nbase_delay = \"250ms\"\nmax_delay = \"2s\"").unwrap();
        assert_eq!(policy.max_retries, 2);
        assert_eq!(policy.base_delay, Duration::from_millis(250));
        assert_eq!(policy.max_delay, Duration::from_secs(2));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let policy: RetryPolicy = toml::from_str("").unwrap();
        assert_eq!(policy, RetryPolicy::default());
    }
}
