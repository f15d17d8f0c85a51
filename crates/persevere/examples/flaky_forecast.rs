// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Retries a forecast service that answers with empty forecasts while it warms up.
//!
//! Run with `cargo run -p persevere --example flaky_forecast --features logs`.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use persevere::{InvocationContext, Outcome, ResilientInvoker};

#[derive(Debug, Clone, Copy)]
struct Forecast {
    price: f64,
    sales: f64,
}

impl Forecast {
    #[expect(clippy::float_cmp, reason = "an exact zero marks an empty forecast")]
    fn is_valid(&self) -> bool {
        self.price != 0.0 || self.sales != 0.0
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt().init();

    let context = InvocationContext::new().name("flaky_forecast").enable_logs();
    let invoker = ResilientInvoker::builder("predict", &context)
        .delay(Duration::from_millis(200))
        .validate_with(Forecast::is_valid)
        .build();

    let warmup_calls = AtomicU32::new(0);

    let outcome = invoker
        .invoke(|| {
            let call = warmup_calls.fetch_add(1, Ordering::Relaxed);
            async move {
                match call {
                    0 => Err("service unavailable"),
                    1 | 2 => Ok(Forecast { price: 0.0, sales: 0.0 }),
                    _ => Ok(Forecast { price: 129.9, sales: 12.5 }),
                }
            }
        })
        .await;

    match outcome {
        Outcome::Success(forecast) => println!("forecast after {} calls: {forecast:?}", warmup_calls.into_inner()),
        Outcome::ExhaustedInvalid(forecast) => println!("only empty forecasts: {forecast:?}"),
        Outcome::ExhaustedError(error) => println!("service failed: {error}"),
    }
}
