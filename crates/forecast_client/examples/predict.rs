// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Signs in to a running forecasting service and asks for a minimal forecast.
//!
//! Run with `cargo run -p forecast_client --example predict -- <email> <password> [config.json]`.

use std::sync::Arc;

use forecast_client::controllers::{AuthController, PredictController, SubmitOutcome};
use forecast_client::{
    ClientConfig, CredentialGuard, ForecastClient, HyperTransport, InvocationContext, MemorySessionStore, MinimalFields,
    UserCredentials,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let mut args = std::env::args().skip(1);
    let (Some(email), Some(password)) = (args.next(), args.next()) else {
        eprintln!("usage: predict <email> <password> [config.json]");
        return Ok(());
    };

    let config = match args.next() {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };

    let store = Arc::new(MemorySessionStore::new());
    let client = Arc::new(ForecastClient::from_config(HyperTransport::new(), &config, Arc::clone(&store) as _));

    let auth = AuthController::new(Arc::clone(&client), Arc::clone(&store) as _);
    let signed_in = auth.login(&UserCredentials::new(email, password)).await;
    println!("{}", signed_in.notice());
    if !signed_in.is_success() {
        return Ok(());
    }

    let predict = PredictController::new(
        client,
        Arc::new(CredentialGuard::new(store)),
        config.retry(),
        &InvocationContext::new().name("predict_example").enable_logs(),
    );

    if let Err(notice) = predict.refresh_model_status().await {
        println!("{notice}");
        return Ok(());
    }

    let outcome = predict.submit(&MinimalFields::new("kettle", "north", "acme").into()).await;
    if let Some(notice) = outcome.notice() {
        println!("{notice}");
    }

    if let SubmitOutcome::Predicted { result, .. } = outcome {
        println!("predicted price: {:.2}", result.predicted_price);
        println!("predicted sales: {:.2}", result.predicted_sales);
        if let Some((low, high)) = result.confidence_interval {
            println!("confidence interval: {low:.2} .. {high:.2}");
        }
    }

    Ok(())
}
