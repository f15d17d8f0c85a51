// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Typed client and page controllers for a retail demand and price forecasting service.
//!
//! The crate has two layers:
//!
//! - [`ForecastClient`] maps each endpoint of the service to a typed async method. It
//!   attaches the bearer token of the current session, turns non-success statuses into
//!   [`ClientError::Status`], and never retries.
//! - The [`controllers`] drive the pages of the application: prediction with training,
//!   sign-in and registration, and prediction history. They report to the user through
//!   [`Notice`] values and redirect anonymous users through a [`SessionGuard`].
//!
//! Predictions are the one call that is retried. The service sometimes answers a
//! prediction with zero price and zero sales while its models warm up, so
//! [`PredictController`][controllers::PredictController] wraps the call in a
//! [`persevere::ResilientInvoker`] that treats such a forecast as a failed attempt.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! # #[cfg(feature = "hyper")]
//! # async fn demo() {
//! use std::sync::Arc;
//!
//! use forecast_client::controllers::{PredictController, SubmitOutcome};
//! use forecast_client::{
//!     ClientConfig, CredentialGuard, ForecastClient, HyperTransport, InvocationContext, MemorySessionStore,
//!     MinimalFields,
//! };
//!
//! let config = ClientConfig::default();
//! let store = Arc::new(MemorySessionStore::new());
//! let client = Arc::new(ForecastClient::from_config(HyperTransport::new(), &config, Arc::clone(&store) as _));
//!
//! let controller = PredictController::new(
//!     client,
//!     Arc::new(CredentialGuard::new(store)),
//!     config.retry(),
//!     &InvocationContext::new().enable_logs(),
//! );
//!
//! if let Err(notice) = controller.refresh_model_status().await {
//!     eprintln!("{notice}");
//! }
//! if let SubmitOutcome::Predicted { result, .. } =
//!     controller.submit(&MinimalFields::new("kettle", "north", "acme").into()).await
//! {
//!     println!("price {}, sales {}", result.predicted_price, result.predicted_sales);
//! }
//! # }
//! ```
//!
//! # Features
//!
//! - `hyper` (default): [`HyperTransport`], an HTTP/1.1 transport on `hyper-util`.
//! - `test-util`: the [`testing`] module with a scripted in-memory transport.

mod client;
mod config;
pub mod controllers;
mod credentials;
mod error;
mod model;
mod notice;
mod session;
mod transport;

#[cfg(any(feature = "test-util", test))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-util")))]
pub mod testing;

pub use client::ForecastClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use credentials::{CredentialProvider, FileSessionStore, MemorySessionStore, Session, SessionStore};
pub use error::{ClientError, ConfigError, StoreError, TransportError};
pub use model::{
    AuthResponse, FullFields, MinimalFields, ModelScore, ModelStatus, PredictionHistory, PredictionRequest, PredictionResult,
    TopProduct, TopProducts, TrainingResult, UserCredentials, UserStatistics,
};
pub use notice::{Notice, NoticeLevel, messages};
pub use persevere::{InvocationContext, RetryPolicy};
pub use session::{CredentialGuard, Navigation, Route, SessionGuard};
#[cfg(feature = "hyper")]
#[cfg_attr(docsrs, doc(cfg(feature = "hyper")))]
pub use transport::HyperTransport;
pub use transport::HttpTransport;
