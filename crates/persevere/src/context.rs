// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;

pub(crate) const DEFAULT_PIPELINE_NAME: &str = "default";

/// Shared settings for a group of invokers.
///
/// Pass one `InvocationContext` to every invoker that belongs to the same logical
/// feature so that their telemetry carries the same pipeline name. Logging and metrics
/// are both off until explicitly enabled; an invoker built from a default context has
/// no side effects other than calling its producer and sleeping between attempts.
///
/// # Examples
///
/// ```
/// use persevere::InvocationContext;
///
/// let context = InvocationContext::new().name("forecast");
/// assert_eq!(context.get_name(), "forecast");
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct InvocationContext {
    name: Cow<'static, str>,
    #[cfg(any(feature = "logs", test))]
    logs_enabled: bool,
    #[cfg(any(feature = "metrics", test))]
    meter: Option<opentelemetry::metrics::Meter>,
}

impl Default for InvocationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl InvocationContext {
    /// Creates a context named `default` with telemetry disabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: Cow::Borrowed(DEFAULT_PIPELINE_NAME),
            #[cfg(any(feature = "logs", test))]
            logs_enabled: false,
            #[cfg(any(feature = "metrics", test))]
            meter: None,
        }
    }

    /// Sets the pipeline name used to correlate telemetry. Prefer `snake_case`.
    #[must_use]
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Enables structured `tracing` events for retries and exhaustion.
    #[must_use]
    #[cfg(any(feature = "logs", test))]
    pub fn enable_logs(self) -> Self {
        Self {
            logs_enabled: true,
            ..self
        }
    }

    /// Enables the `resilience.event` counter using the given meter provider.
    #[must_use]
    #[cfg(any(feature = "metrics", test))]
    pub fn enable_metrics(self, provider: &dyn opentelemetry::metrics::MeterProvider) -> Self {
        Self {
            meter: Some(crate::telemetry::create_meter(provider)),
            ..self
        }
    }

    #[cfg_attr(
        not(any(feature = "metrics", feature = "logs", test)),
        expect(unused_variables, clippy::unused_self, reason = "names are only reported by logs or metrics")
    )]
    pub(crate) fn create_telemetry(&self, invocation_name: Cow<'static, str>) -> crate::telemetry::TelemetryHelper {
        crate::telemetry::TelemetryHelper {
            #[cfg(any(feature = "metrics", feature = "logs", test))]
            pipeline_name: self.name.clone(),
            #[cfg(any(feature = "metrics", feature = "logs", test))]
            invocation_name,
            #[cfg(any(feature = "metrics", test))]
            event_reporter: self.meter.as_ref().map(crate::telemetry::create_resilience_event_counter),
            #[cfg(any(feature = "logs", test))]
            logs_enabled: self.logs_enabled,
        }
    }
}
