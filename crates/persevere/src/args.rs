// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use crate::Attempt;

/// Arguments for the [`on_retry`][crate::InvokerBuilder::on_retry] callback.
///
/// Describes the attempt that just failed and the pause that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnRetryArgs {
    pub(crate) attempt: Attempt,
    pub(crate) retry_delay: Duration,
}

impl OnRetryArgs {
    /// The attempt that did not succeed.
    #[must_use]
    pub fn attempt(&self) -> Attempt {
        self.attempt
    }

    /// The pause taken before the next attempt.
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }
}

/// Arguments for the [`retry_error_if`][crate::InvokerBuilder::retry_error_if] callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorArgs {
    pub(crate) attempt: Attempt,
}

impl ErrorArgs {
    /// The attempt that raised the error.
    #[must_use]
    pub fn attempt(&self) -> Attempt {
        self.attempt
    }
}
