// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Bounded retry for async calls whose results must also pass a validity check.
//!
//! Most retry helpers only look at errors. Some services, however, answer with a
//! perfectly well-formed payload that is still useless: a forecast of all zeroes
//! from a model that is warming up, an empty page from a replica that is catching up.
//! [`ResilientInvoker`] treats such payloads like failures: it calls an async producer,
//! checks the payload with a predicate, and tries again after a fixed pause until the
//! payload is valid or the attempt bound is reached.
//!
//! # Quick Start
//!
//! ```rust
//! # use std::time::Duration;
//! # use persevere::{InvocationContext, Outcome, ResilientInvoker};
//! # async fn fetch_forecast() -> Result<f64, std::io::Error> { Ok(42.0) }
//! # async fn demo() {
//! let context = InvocationContext::new().name("forecast");
//!
//! let invoker = ResilientInvoker::builder("predict", &context)
//!     .max_attempts(8)
//!     .delay(Duration::from_millis(500))
//!     .validate_with(|price: &f64| *price != 0.0)
//!     .build();
//!
//! match invoker.invoke(fetch_forecast).await {
//!     Outcome::Success(price) => println!("predicted price: {price}"),
//!     Outcome::ExhaustedInvalid(_) => println!("service kept answering with an empty forecast"),
//!     Outcome::ExhaustedError(error) => println!("service unreachable: {error}"),
//! }
//! # }
//! ```
//!
//! # Semantics
//!
//! - The producer is called at least once and at most `max_attempts` times.
//! - A valid payload ends the invocation immediately; no pause follows it.
//! - An invalid payload or an error is followed by a pause of exactly `delay`, unless it
//!   came from the last attempt.
//! - Errors are retried by default. Use [`InvokerBuilder::retry_error_if`] to stop early
//!   on errors that cannot improve, such as authorization failures.
//! - The terminal [`Outcome`] keeps the last invalid payload or the last error so callers
//!   can tell "the service answered, but uselessly" apart from "the service did not answer".
//!
//! Every invocation starts with a fresh attempt counter, and the invoker itself holds no
//! mutable state, so a single instance may serve concurrent invocations.
//!
//! # Features
//!
//! - `logs`: emits WARN `tracing` events named `persevere.retry` (message `retrying`) and
//!   `persevere.exhausted` (message `attempts exhausted`) when enabled through
//!   [`InvocationContext::enable_logs`].
//! - `metrics`: reports a `resilience.event` counter through `opentelemetry` when
//!   enabled through [`InvocationContext::enable_metrics`].
//! - `serde`: makes [`RetryPolicy`] (de)serializable as `{ "max_attempts", "delay_ms" }`.

mod args;
mod attempt;
mod builder;
mod callbacks;
mod context;
mod define_fn_wrapper;
mod invoker;
mod outcome;
mod policy;
mod telemetry;

pub use args::{ErrorArgs, OnRetryArgs};
pub use attempt::Attempt;
pub use builder::InvokerBuilder;
pub use context::InvocationContext;
pub(crate) use define_fn_wrapper::define_fn_wrapper;
pub use invoker::ResilientInvoker;
pub use outcome::{AttemptOutcome, Exhausted, Outcome};
pub use policy::{DEFAULT_DELAY, DEFAULT_MAX_ATTEMPTS, RetryPolicy};

/// Type-state marker: a required builder property has been configured.
#[derive(Debug)]
#[non_exhaustive]
pub struct Set;

/// Type-state marker: a required builder property has not been configured yet.
#[derive(Debug)]
#[non_exhaustive]
pub struct NotSet;
