// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use crate::callbacks::{OnRetry, RetryErrorIf, Validate};
use crate::telemetry::TelemetryHelper;
use crate::{Attempt, AttemptOutcome, ErrorArgs, InvocationContext, InvokerBuilder, NotSet, OnRetryArgs, Outcome, RetryPolicy};

/// Runs an async producer up to a bounded number of times until it yields a valid payload.
///
/// Each call of the producer is classified as a success, an invalid result (the payload
/// failed the validity predicate) or a transport error. The first success ends the
/// invocation right away. Anything else is retried after a fixed pause, until the
/// policy's attempt bound is reached; the last attempt is never followed by a pause.
///
/// The invoker holds its configuration behind an `Arc`, so clones are cheap and share
/// nothing mutable. Every call to [`invoke`][Self::invoke] starts from a fresh attempt
/// counter.
///
/// Configure it with [`ResilientInvoker::builder`]. See the [crate documentation][crate]
/// for examples.
#[derive(Debug)]
pub struct ResilientInvoker<T, E> {
    pub(crate) shared: Arc<InvokerShared<T, E>>,
}

#[derive(Debug)]
pub(crate) struct InvokerShared<T, E> {
    pub(crate) policy: RetryPolicy,
    pub(crate) validate: Validate<T>,
    pub(crate) retry_error_if: RetryErrorIf<E>,
    pub(crate) on_retry: Option<OnRetry<T, E>>,
    pub(crate) telemetry: TelemetryHelper,
}

impl<T, E> Clone for ResilientInvoker<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, E> ResilientInvoker<T, E> {
    /// Starts configuring an invoker.
    ///
    /// The `name` identifies the invocation in telemetry and should be `snake_case`.
    pub fn builder(name: impl Into<Cow<'static, str>>, context: &InvocationContext) -> InvokerBuilder<T, E, NotSet> {
        InvokerBuilder::new(name.into(), context)
    }

    /// The policy this invoker runs with.
    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        self.shared.policy
    }

    /// Calls `producer` until it yields a valid payload or attempts run out.
    ///
    /// Attempts are strictly sequential: attempt `n + 1` starts only after attempt `n`
    /// resolved and the pause elapsed. Dropping the returned future abandons the
    /// invocation; there is no other form of cancellation.
    pub async fn invoke<F, Fut>(&self, mut producer: F) -> Outcome<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = Attempt::first(self.shared.policy.max_attempts_non_zero());

        loop {
            let result = producer().await;

            match self.shared.evaluate_attempt(result, attempt) {
                ControlFlow::Continue(next) => {
                    let delay = self.shared.policy.delay();
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt = next;
                }
                ControlFlow::Break(outcome) => return outcome,
            }
        }
    }
}

impl<T, E> InvokerShared<T, E> {
    fn evaluate_attempt(&self, result: Result<T, E>, attempt: Attempt) -> ControlFlow<Outcome<T, E>, Attempt> {
        let outcome = AttemptOutcome::classify(result, |payload| self.validate.call(payload));

        if outcome.is_success() || !self.is_retryable(&outcome, attempt) {
            if !outcome.is_success() {
                self.emit_exhausted(attempt, &outcome);
            }
            return ControlFlow::Break(outcome.into());
        }

        let Some(next) = attempt.increment(self.policy.max_attempts_non_zero()) else {
            self.emit_exhausted(attempt, &outcome);
            return ControlFlow::Break(outcome.into());
        };

        let retry_delay = self.policy.delay();
        self.emit_retry(attempt, retry_delay, &outcome);

        if let Some(on_retry) = &self.on_retry {
            on_retry.call(&outcome, OnRetryArgs { attempt, retry_delay });
        }

        ControlFlow::Continue(next)
    }

    fn is_retryable(&self, outcome: &AttemptOutcome<T, E>, attempt: Attempt) -> bool {
        match outcome {
            AttemptOutcome::Success(_) => false,
            AttemptOutcome::InvalidResult(_) => true,
            AttemptOutcome::TransportError(error) => self.retry_error_if.call(error, ErrorArgs { attempt }),
        }
    }

    #[cfg_attr(
        not(any(feature = "logs", feature = "metrics", test)),
        expect(unused_variables, clippy::unused_self, reason = "unused when neither logs nor metrics are enabled")
    )]
    #[cfg_attr(
        all(feature = "metrics", not(any(feature = "logs", test))),
        expect(unused_variables, reason = "the delay is only logged")
    )]
    fn emit_retry(&self, attempt: Attempt, retry_delay: Duration, outcome: &AttemptOutcome<T, E>) {
        #[cfg(any(feature = "logs", test))]
        if self.telemetry.logs_enabled {
            tracing::event!(
                name: "persevere.retry",
                tracing::Level::WARN,
                pipeline.name = %self.telemetry.pipeline_name,
                invocation.name = %self.telemetry.invocation_name,
                attempt.index = attempt.index(),
                attempt.is_last = attempt.is_last(),
                attempt.outcome = outcome.kind(),
                retry.delay = retry_delay.as_secs_f32(),
                "retrying",
            );
        }

        #[cfg(any(feature = "metrics", test))]
        self.report_metrics(crate::telemetry::RETRY_EVENT, attempt, outcome);
    }

    #[cfg_attr(
        not(any(feature = "logs", feature = "metrics", test)),
        expect(unused_variables, clippy::unused_self, reason = "unused when neither logs nor metrics are enabled")
    )]
    fn emit_exhausted(&self, attempt: Attempt, outcome: &AttemptOutcome<T, E>) {
        #[cfg(any(feature = "logs", test))]
        if self.telemetry.logs_enabled {
            tracing::event!(
                name: "persevere.exhausted",
                tracing::Level::WARN,
                pipeline.name = %self.telemetry.pipeline_name,
                invocation.name = %self.telemetry.invocation_name,
                attempt.index = attempt.index(),
                attempt.is_last = attempt.is_last(),
                attempt.outcome = outcome.kind(),
                "attempts exhausted",
            );
        }

        #[cfg(any(feature = "metrics", test))]
        self.report_metrics(crate::telemetry::EXHAUSTED_EVENT, attempt, outcome);
    }

    #[cfg(any(feature = "metrics", test))]
    fn report_metrics(&self, event: &'static str, attempt: Attempt, outcome: &AttemptOutcome<T, E>) {
        use opentelemetry::KeyValue;

        use crate::telemetry::{ATTEMPT_INDEX, ATTEMPT_IS_LAST, ATTEMPT_OUTCOME, EVENT_NAME, INVOCATION_NAME, PIPELINE_NAME};

        if !self.telemetry.metrics_enabled() {
            return;
        }

        self.telemetry.report_metrics(&[
            KeyValue::new(PIPELINE_NAME, self.telemetry.pipeline_name.clone()),
            KeyValue::new(INVOCATION_NAME, self.telemetry.invocation_name.clone()),
            KeyValue::new(EVENT_NAME, event),
            KeyValue::new(ATTEMPT_INDEX, i64::from(attempt.index())),
            KeyValue::new(ATTEMPT_IS_LAST, attempt.is_last()),
            KeyValue::new(ATTEMPT_OUTCOME, outcome.kind()),
        ]);
    }
}
