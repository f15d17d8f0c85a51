// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::num::NonZeroU32;
use std::time::Duration;

/// Default number of attempts, the original call included.
pub const DEFAULT_MAX_ATTEMPTS: NonZeroU32 = NonZeroU32::new(8).expect("8 is not zero");

/// Default fixed pause between two consecutive attempts.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// How many times an invocation may run and how long to pause in between.
///
/// The delay is constant: there is no backoff growth and no jitter. The pause is only
/// taken between attempts, never after the last one.
///
/// | Parameter | Default |
/// |-----------|---------|
/// | `max_attempts` | `8` |
/// | `delay` | `500ms` |
///
/// With the `serde` feature the policy (de)serializes as
/// `{ "max_attempts": 8, "delay_ms": 500 }`.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use persevere::RetryPolicy;
///
/// let policy = RetryPolicy::new(3, Duration::from_millis(100));
/// assert_eq!(policy.max_attempts(), 3);
///
/// // zero attempts is not meaningful, at least one call is always made
/// assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RetryPolicy {
    max_attempts: NonZeroU32,
    #[cfg_attr(feature = "serde", serde(rename = "delay_ms", with = "millis"))]
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy. A `max_attempts` of zero is raised to one.
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: NonZeroU32::new(max_attempts).unwrap_or(NonZeroU32::MIN),
            delay,
        }
    }

    /// A policy that calls the producer exactly once.
    #[must_use]
    pub fn single_attempt() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Replaces the attempt bound. Zero is raised to one.
    #[must_use]
    pub fn with_max_attempts(self, max_attempts: u32) -> Self {
        Self::new(max_attempts, self.delay)
    }

    /// Replaces the delay between attempts.
    #[must_use]
    pub fn with_delay(self, delay: Duration) -> Self {
        Self { delay, ..self }
    }

    /// Total number of attempts, the original call included.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.get()
    }

    /// Pause between two consecutive attempts.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Upper bound on the time spent sleeping by one invocation.
    #[must_use]
    pub fn total_delay(&self) -> Duration {
        self.delay.saturating_mul(self.max_attempts.get().saturating_sub(1))
    }

    pub(crate) fn max_attempts_non_zero(&self) -> NonZeroU32 {
        self.max_attempts
    }
}

#[cfg(feature = "serde")]
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(delay: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
