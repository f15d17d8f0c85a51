// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! An unpublished crate with capture helpers for asserting on the telemetry emitted in tests.

mod log;
mod metrics;

pub use log::{LogCapture, LogCaptureWriter};
pub use metrics::MetricCapture;
