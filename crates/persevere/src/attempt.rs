// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Display;
use std::num::NonZeroU32;

/// A single attempt within one invocation.
///
/// Attempts are tracked with a 0-based [`index`][Attempt::index] and expose the
/// 1-based [`number`][Attempt::number] used in user-facing messages. Each attempt also
/// knows whether it is the final one allowed by the policy.
///
/// The default attempt is both the first and the last one, which describes a
/// single-shot invocation.
///
/// # Examples
///
/// ```
/// use persevere::Attempt;
///
/// let attempt = Attempt::new(0, false);
/// assert!(attempt.is_first());
/// assert!(!attempt.is_last());
/// assert_eq!(attempt.number(), 1);
///
/// let last = Attempt::new(7, true);
/// assert_eq!(last.index(), 7);
/// assert_eq!(last.number(), 8);
/// assert!(last.is_last());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Attempt {
    index: u32,
    is_last: bool,
}

impl Default for Attempt {
    fn default() -> Self {
        Self::new(0, true)
    }
}

impl Attempt {
    /// Creates an attempt with the given 0-based index.
    #[must_use]
    pub fn new(index: u32, is_last: bool) -> Self {
        Self { index, is_last }
    }

    /// Returns the first attempt for an invocation bounded by `max_attempts`.
    #[must_use]
    pub(crate) fn first(max_attempts: NonZeroU32) -> Self {
        Self::new(0, max_attempts.get() == 1)
    }

    /// Returns true for the first attempt.
    #[must_use]
    pub fn is_first(self) -> bool {
        self.index == 0
    }

    /// Returns true if no further attempt will be made after this one.
    #[must_use]
    pub fn is_last(self) -> bool {
        self.is_last
    }

    /// Returns the 0-based attempt index.
    #[must_use]
    pub fn index(self) -> u32 {
        self.index
    }

    /// Returns the 1-based attempt number.
    #[must_use]
    pub fn number(self) -> u32 {
        self.index.saturating_add(1)
    }

    /// Moves to the next attempt, or returns `None` once `max_attempts` is reached.
    pub(crate) fn increment(self, max_attempts: NonZeroU32) -> Option<Self> {
        let next = self.index.saturating_add(1);
        let max = max_attempts.get();

        if next >= max {
            return None;
        }

        Some(Self::new(next, next == max.saturating_sub(1)))
    }
}

impl Display for Attempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.number().fmt(f)
    }
}
