// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#[cfg(any(feature = "metrics", feature = "logs", test))]
use std::borrow::Cow;

/// Event emitted before an inter-attempt pause.
#[cfg(any(feature = "metrics", test))]
pub(crate) const RETRY_EVENT: &str = "retry";

/// Event emitted when the last attempt did not succeed.
#[cfg(any(feature = "metrics", test))]
pub(crate) const EXHAUSTED_EVENT: &str = "exhausted";

#[cfg(any(feature = "metrics", test))]
pub(crate) const PIPELINE_NAME: &str = "resilience.pipeline.name";

#[cfg(any(feature = "metrics", test))]
pub(crate) const INVOCATION_NAME: &str = "resilience.invocation.name";

#[cfg(any(feature = "metrics", test))]
pub(crate) const EVENT_NAME: &str = "resilience.event.name";

#[cfg(any(feature = "metrics", test))]
pub(crate) const ATTEMPT_INDEX: &str = "resilience.attempt.index";

#[cfg(any(feature = "metrics", test))]
pub(crate) const ATTEMPT_IS_LAST: &str = "resilience.attempt.is_last";

#[cfg(any(feature = "metrics", test))]
pub(crate) const ATTEMPT_OUTCOME: &str = "resilience.attempt.outcome";

#[cfg(any(feature = "metrics", test))]
const METER_NAME: &str = "persevere";

#[cfg(any(feature = "metrics", test))]
const VERSION: &str = "v0.1.0";

#[cfg(any(feature = "metrics", test))]
const SCHEMA_URL: &str = "https://opentelemetry.io/schemas/1.47.0";

#[cfg(any(feature = "metrics", test))]
pub(crate) fn create_meter(meter_provider: &dyn opentelemetry::metrics::MeterProvider) -> opentelemetry::metrics::Meter {
    meter_provider.meter_with_scope(
        opentelemetry::InstrumentationScope::builder(METER_NAME)
            .with_version(VERSION)
            .with_schema_url(SCHEMA_URL)
            .build(),
    )
}

#[cfg(any(feature = "metrics", test))]
pub(crate) fn create_resilience_event_counter(meter: &opentelemetry::metrics::Meter) -> opentelemetry::metrics::Counter<u64> {
    meter
        .u64_counter("resilience.event")
        .with_description("Emitted upon the occurrence of a resilience event.")
        .with_unit("u64")
        .build()
}

/// Names and sinks used when reporting invocation events.
#[derive(Debug, Clone)]
pub(crate) struct TelemetryHelper {
    #[cfg(any(feature = "metrics", feature = "logs", test))]
    pub(crate) pipeline_name: Cow<'static, str>,
    #[cfg(any(feature = "metrics", feature = "logs", test))]
    pub(crate) invocation_name: Cow<'static, str>,
    #[cfg(any(feature = "metrics", test))]
    pub(crate) event_reporter: Option<opentelemetry::metrics::Counter<u64>>,
    #[cfg(any(feature = "logs", test))]
    pub(crate) logs_enabled: bool,
}

impl TelemetryHelper {
    #[cfg(any(feature = "metrics", test))]
    pub(crate) fn metrics_enabled(&self) -> bool {
        self.event_reporter.is_some()
    }

    #[cfg(any(feature = "metrics", test))]
    pub(crate) fn report_metrics(&self, attributes: &[opentelemetry::KeyValue]) {
        if let Some(reporter) = &self.event_reporter {
            reporter.add(1, attributes);
        }
    }
}
