// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use opentelemetry_sdk::metrics::{InMemoryMetricExporter, SdkMeterProvider};

/// A meter provider that keeps exported metrics in memory.
///
/// Pass [`provider`][Self::provider] to the code under test, then inspect what it
/// recorded through [`output`][Self::output].
#[derive(Debug, Clone)]
pub struct MetricCapture {
    exporter: InMemoryMetricExporter,
    provider: SdkMeterProvider,
}

impl MetricCapture {
    #[must_use]
    pub fn new() -> Self {
        let exporter = InMemoryMetricExporter::default();
        let provider = SdkMeterProvider::builder().with_periodic_exporter(exporter.clone()).build();
        Self { exporter, provider }
    }

    /// The provider to hand to the code under test.
    #[must_use]
    pub fn provider(&self) -> &SdkMeterProvider {
        &self.provider
    }

    /// Flushes the provider and returns the debug rendering of everything exported so far.
    ///
    /// # Panics
    ///
    /// Panics if flushing or reading the exporter fails.
    #[must_use]
    pub fn output(&self) -> String {
        self.provider.force_flush().expect("meter provider must flush");
        let metrics = self.exporter.get_finished_metrics().expect("in-memory exporter must be readable");
        format!("{metrics:?}")
    }

    /// Asserts that the exported metrics mention every one of `expected`.
    ///
    /// # Panics
    ///
    /// Panics if one of them is missing.
    pub fn assert_contains_all(&self, expected: &[&str]) {
        let output = self.output();
        for value in expected {
            assert!(output.contains(value), "metrics do not contain '{value}', got:\n{output}");
        }
    }
}

impl Default for MetricCapture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use opentelemetry::KeyValue;
    use opentelemetry::metrics::MeterProvider;

    use super::*;

    #[test]
    fn records_counter_with_attributes() {
        let capture = MetricCapture::new();
        let counter = capture.provider().meter("capture_test").u64_counter("test.events").build();

        counter.add(3, &[KeyValue::new("event.kind", "retry")]);

        capture.assert_contains_all(&["test.events", "capture_test", "retry"]);
    }
}
