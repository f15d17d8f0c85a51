// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use crate::callbacks::{OnRetry, RetryErrorIf, Validate};
use crate::invoker::InvokerShared;
use crate::telemetry::TelemetryHelper;
use crate::{AttemptOutcome, ErrorArgs, InvocationContext, NotSet, OnRetryArgs, ResilientInvoker, RetryPolicy, Set};

/// Builder for [`ResilientInvoker`].
///
/// Created by [`ResilientInvoker::builder`]. The builder uses the type-state pattern so
/// that an invoker cannot be built before the caller has decided how payloads are
/// validated: call either [`validate_with`][Self::validate_with] or
/// [`accept_all`][Self::accept_all] first.
///
/// ```compile_fail
/// # use persevere::{InvocationContext, ResilientInvoker};
/// let context = InvocationContext::new();
/// // no validity check configured, so `build` is not available
/// let invoker = ResilientInvoker::<u32, String>::builder("missing_check", &context).build();
/// ```
#[derive(Debug)]
pub struct InvokerBuilder<T, E, ValidateState = Set> {
    policy: RetryPolicy,
    validate: Validate<T>,
    retry_error_if: RetryErrorIf<E>,
    on_retry: Option<OnRetry<T, E>>,
    telemetry: TelemetryHelper,
    _state: PhantomData<fn() -> ValidateState>,
}

impl<T, E> InvokerBuilder<T, E, NotSet> {
    pub(crate) fn new(name: Cow<'static, str>, context: &InvocationContext) -> Self {
        Self {
            policy: RetryPolicy::default(),
            validate: Validate::accept_all(),
            retry_error_if: RetryErrorIf::always(),
            on_retry: None,
            telemetry: context.create_telemetry(name),
            _state: PhantomData,
        }
    }
}

impl<T, E, ValidateState> InvokerBuilder<T, E, ValidateState> {
    /// Replaces the whole retry policy.
    ///
    /// **Default**: [`RetryPolicy::default`], 8 attempts with 500ms between them.
    #[must_use]
    pub fn policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the total number of attempts, the first call included. Zero is raised to one.
    #[must_use]
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.policy = self.policy.with_max_attempts(max_attempts);
        self
    }

    /// Sets the fixed pause between attempts.
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.policy = self.policy.with_delay(delay);
        self
    }

    /// Sets the validity predicate applied to every resolved payload.
    ///
    /// Payloads for which the predicate returns `false` are treated as
    /// [`AttemptOutcome::InvalidResult`] and retried until attempts run out.
    #[must_use]
    pub fn validate_with(self, is_valid: impl Fn(&T) -> bool + Send + Sync + 'static) -> InvokerBuilder<T, E, Set> {
        InvokerBuilder {
            validate: Validate::new(is_valid),
            ..self.into_state()
        }
    }

    /// Accepts every resolved payload; only errors are retried.
    #[must_use]
    pub fn accept_all(self) -> InvokerBuilder<T, E, Set> {
        InvokerBuilder {
            validate: Validate::accept_all(),
            ..self.into_state()
        }
    }

    /// Decides which errors are worth another attempt.
    ///
    /// When the classifier returns `false` the invocation stops immediately and the
    /// error is returned as [`Outcome::ExhaustedError`][crate::Outcome::ExhaustedError].
    ///
    /// **Default**: every error is retried.
    #[must_use]
    pub fn retry_error_if(mut self, classify: impl Fn(&E, ErrorArgs) -> bool + Send + Sync + 'static) -> Self {
        self.retry_error_if = RetryErrorIf::new(classify);
        self
    }

    /// Restores the default of retrying every error.
    #[must_use]
    pub fn retry_all_errors(mut self) -> Self {
        self.retry_error_if = RetryErrorIf::always();
        self
    }

    /// Registers a callback invoked after a failed attempt and before the pause that
    /// follows it.
    ///
    /// The callback is purely observational; it cannot change the retry decision.
    /// It is not invoked after the final attempt.
    ///
    /// **Default**: none
    #[must_use]
    pub fn on_retry(mut self, on_retry: impl Fn(&AttemptOutcome<T, E>, OnRetryArgs) + Send + Sync + 'static) -> Self {
        self.on_retry = Some(OnRetry::new(on_retry));
        self
    }

    fn into_state<S>(self) -> InvokerBuilder<T, E, S> {
        InvokerBuilder {
            policy: self.policy,
            validate: self.validate,
            retry_error_if: self.retry_error_if,
            on_retry: self.on_retry,
            telemetry: self.telemetry,
            _state: PhantomData,
        }
    }
}

impl<T, E> InvokerBuilder<T, E, Set> {
    /// Builds the invoker.
    #[must_use]
    pub fn build(self) -> ResilientInvoker<T, E> {
        ResilientInvoker {
            shared: Arc::new(InvokerShared {
                policy: self.policy,
                validate: self.validate,
                retry_error_if: self.retry_error_if,
                on_retry: self.on_retry,
                telemetry: self.telemetry,
            }),
        }
    }
}
