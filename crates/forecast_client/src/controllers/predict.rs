// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use persevere::{InvocationContext, Outcome, ResilientInvoker, RetryPolicy};

use crate::notice::messages;
use crate::{
    ClientError, ForecastClient, HttpTransport, Navigation, Notice, PredictionRequest, PredictionResult, Route, SessionGuard,
    TrainingResult,
};

/// Result of [`PredictController::submit`].
#[derive(Debug)]
pub enum SubmitOutcome {
    /// No session; go to the given page instead.
    Redirect(Route),
    /// Another submission or training run is in flight; nothing was sent.
    Busy,
    /// The models are not trained yet; nothing was sent.
    ModelNotTrained(Notice),
    /// Required fields are blank; nothing was sent.
    Incomplete(Notice),
    /// A usable forecast arrived.
    Predicted {
        /// The forecast.
        result: PredictionResult,
        /// Success notice.
        notice: Notice,
    },
    /// Every attempt returned an empty forecast.
    InsufficientData {
        /// The empty forecast of the last attempt.
        last: PredictionResult,
        /// Error notice suggesting retraining.
        notice: Notice,
    },
    /// The last attempt failed.
    Failed {
        /// The error of the last attempt.
        error: ClientError,
        /// Error notice.
        notice: Notice,
    },
}

impl SubmitOutcome {
    /// The notice to show, if any.
    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        match self {
            Self::Redirect(_) | Self::Busy => None,
            Self::ModelNotTrained(notice) | Self::Incomplete(notice) => Some(notice),
            Self::Predicted { notice, .. } | Self::InsufficientData { notice, .. } | Self::Failed { notice, .. } => Some(notice),
        }
    }
}

/// Result of [`PredictController::train`].
#[derive(Debug)]
pub enum TrainOutcome {
    /// Another submission or training run is in flight; nothing was sent.
    Busy,
    /// The models were retrained.
    Trained {
        /// Scores of the retrained models.
        result: TrainingResult,
        /// Success notice.
        notice: Notice,
    },
    /// Training failed.
    Failed {
        /// The reported error.
        error: ClientError,
        /// Error notice.
        notice: Notice,
    },
}

/// Drives the prediction page.
///
/// Predictions go through a [`ResilientInvoker`] that treats a forecast with zero price
/// and zero sales as a failed attempt. Transport errors and error statuses are retried
/// the same way. Only one submission or training run is accepted at a time.
pub struct PredictController<T> {
    client: Arc<ForecastClient<T>>,
    guard: Arc<dyn SessionGuard>,
    invoker: ResilientInvoker<PredictionResult, ClientError>,
    model_trained: AtomicBool,
    busy: AtomicBool,
}

impl<T: std::fmt::Debug> std::fmt::Debug for PredictController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictController")
            .field("client", &self.client)
            .field("invoker", &self.invoker)
            .field("model_trained", &self.model_trained)
            .field("busy", &self.busy)
            .finish_non_exhaustive()
    }
}

impl<T: HttpTransport> PredictController<T> {
    /// Creates a controller. The model is assumed untrained until
    /// [`refresh_model_status`][Self::refresh_model_status] or [`train`][Self::train]
    /// says otherwise.
    pub fn new(client: Arc<ForecastClient<T>>, guard: Arc<dyn SessionGuard>, policy: RetryPolicy, context: &InvocationContext) -> Self {
        let invoker = ResilientInvoker::builder("predict", context)
            .policy(policy)
            .validate_with(|result: &PredictionResult| !result.is_degenerate())
            .build();

        Self {
            client,
            guard,
            invoker,
            model_trained: AtomicBool::new(false),
            busy: AtomicBool::new(false),
        }
    }

    /// The access check for the page.
    pub fn open(&self) -> Navigation {
        self.guard.require_authenticated()
    }

    /// The last known training state.
    #[must_use]
    pub fn is_model_trained(&self) -> bool {
        self.model_trained.load(Ordering::Acquire)
    }

    /// Whether a submission or training run is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Asks the service whether the models are trained and remembers the answer.
    ///
    /// # Errors
    ///
    /// Returns an error notice if the status could not be fetched; the remembered state
    /// is left unchanged.
    pub async fn refresh_model_status(&self) -> Result<bool, Notice> {
        match self.client.model_status().await {
            Ok(status) => {
                self.model_trained.store(status.models_trained, Ordering::Release);
                Ok(status.models_trained)
            }
            Err(error) => {
                tracing::warn!(%error, "model status check failed");
                Err(Notice::error(messages::MODEL_STATUS_FAILED))
            }
        }
    }

    /// Retrains the models.
    pub async fn train(&self) -> TrainOutcome {
        let Some(_busy) = BusyGuard::acquire(&self.busy) else {
            return TrainOutcome::Busy;
        };

        match self.client.train_models().await {
            Ok(result) => {
                self.model_trained.store(true, Ordering::Release);
                tracing::info!(
                    price_score = result.price_model.best_score,
                    sales_score = result.sales_model.best_score,
                    "models retrained"
                );
                TrainOutcome::Trained {
                    result,
                    notice: Notice::success(messages::TRAINING_SUCCEEDED),
                }
            }
            Err(error) => {
                tracing::warn!(%error, "model training failed");
                TrainOutcome::Failed {
                    error,
                    notice: Notice::error(messages::TRAINING_FAILED),
                }
            }
        }
    }

    /// Requests a forecast, retrying empty forecasts and failures.
    pub async fn submit(&self, request: &PredictionRequest) -> SubmitOutcome {
        if let Navigation::Redirect(route) = self.guard.require_authenticated() {
            return SubmitOutcome::Redirect(route);
        }

        let Some(_busy) = BusyGuard::acquire(&self.busy) else {
            return SubmitOutcome::Busy;
        };

        if !self.is_model_trained() {
            return SubmitOutcome::ModelNotTrained(Notice::error(messages::MODEL_NOT_TRAINED));
        }

        let missing = request.missing_fields();
        if !missing.is_empty() {
            return SubmitOutcome::Incomplete(Notice::error(format!("Required fields are missing: {}", missing.join(", "))));
        }

        match self.invoker.invoke(|| self.client.predict(request)).await {
            Outcome::Success(result) => SubmitOutcome::Predicted {
                result,
                notice: Notice::success(messages::PREDICTION_SUCCEEDED),
            },
            Outcome::ExhaustedInvalid(last) => {
                tracing::warn!(minimal = request.is_minimal(), "service kept returning empty forecasts");
                SubmitOutcome::InsufficientData {
                    last,
                    notice: Notice::error(messages::INSUFFICIENT_DATA),
                }
            }
            Outcome::ExhaustedError(error) => {
                tracing::warn!(%error, minimal = request.is_minimal(), "prediction failed");
                SubmitOutcome::Failed {
                    error,
                    notice: Notice::error(messages::PREDICTION_FAILED),
                }
            }
        }
    }
}

/// Holds the in-flight flag for as long as it lives.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use std::time::Duration;

    use http::{Method, StatusCode};
    use serde_json::json;

    use super::*;
    use crate::session::MockSessionGuard;
    use crate::testing::{FAKE_BASE_URL, FakeTransport};
    use crate::{MemorySessionStore, MinimalFields};

    fn controller(transport: FakeTransport, authenticated: bool) -> PredictController<FakeTransport> {
        let mut guard = MockSessionGuard::new();
        guard.expect_require_authenticated().return_const(if authenticated {
            Navigation::Continue
        } else {
            Navigation::Redirect(Route::Login)
        });

        let client = ForecastClient::new(transport, FAKE_BASE_URL, Arc::new(MemorySessionStore::new()));
        PredictController::new(
            Arc::new(client),
            Arc::new(guard),
            RetryPolicy::new(8, Duration::from_millis(500)),
            &InvocationContext::new(),
        )
    }

    fn trained(transport: FakeTransport) -> FakeTransport {
        transport.reply_json(Method::GET, "/status", StatusCode::OK, &json!({ "models_trained": true }))
    }

    fn request() -> PredictionRequest {
        MinimalFields::new("kettle", "north", "acme").into()
    }

    #[test]
    fn busy_guard_is_exclusive() {
        let flag = AtomicBool::new(false);
        let first = BusyGuard::acquire(&flag);
        assert!(first.is_some());
        assert!(BusyGuard::acquire(&flag).is_none());

        drop(first);
        assert!(BusyGuard::acquire(&flag).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn redirects_without_session() {
        let transport = FakeTransport::new();
        let controller = controller(transport.clone(), false);

        let outcome = controller.submit(&request()).await;

        assert!(matches!(outcome, SubmitOutcome::Redirect(Route::Login)));
        assert_eq!(controller.open(), Navigation::Redirect(Route::Login));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn refuses_before_training() {
        let transport = FakeTransport::new().reply_json(Method::GET, "/status", StatusCode::OK, &json!({ "models_trained": false }));
        let controller = controller(transport.clone(), true);

        assert_eq!(controller.refresh_model_status().await, Ok(false));
        let outcome = controller.submit(&request()).await;

        let SubmitOutcome::ModelNotTrained(notice) = outcome else {
            panic!("unexpected outcome: {outcome:?}");
        };
        assert_eq!(notice.message(), messages::MODEL_NOT_TRAINED);
        assert_eq!(transport.count(&Method::POST, "/predict/minimal"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn refuses_incomplete_request() {
        let controller = controller(trained(FakeTransport::new()), true);
        controller.refresh_model_status().await.unwrap();

        let outcome = controller.submit(&MinimalFields::new("kettle", "", "").into()).await;

        let SubmitOutcome::Incomplete(notice) = outcome else {
            panic!("unexpected outcome: {outcome:?}");
        };
        assert_eq!(notice.message(), "Required fields are missing: region, seller");
    }

    #[tokio::test(start_paused = true)]
    async fn empty_forecasts_become_insufficient_data() {
        let transport = trained(FakeTransport::new()).reply_json(
            Method::POST,
            "/predict/minimal",
            StatusCode::OK,
            &json!({ "predicted_price": 0.0, "predicted_sales": 0.0 }),
        );
        let controller = controller(transport.clone(), true);
        controller.refresh_model_status().await.unwrap();

        let outcome = controller.submit(&request()).await;

        let SubmitOutcome::InsufficientData { last, notice } = outcome else {
            panic!("unexpected outcome: {outcome:?}");
        };
        assert!(last.is_degenerate());
        assert_eq!(notice.message(), messages::INSUFFICIENT_DATA);
        assert_eq!(transport.count(&Method::POST, "/predict/minimal"), 8);
        assert!(!controller.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn errors_become_failure() {
        let transport = trained(FakeTransport::new()).reply_text(Method::POST, "/predict/minimal", StatusCode::BAD_GATEWAY, "");
        let controller = controller(transport.clone(), true);
        controller.refresh_model_status().await.unwrap();

        let outcome = controller.submit(&request()).await;

        let SubmitOutcome::Failed { error, notice } = outcome else {
            panic!("unexpected outcome: {outcome:?}");
        };
        assert_eq!(error.status(), Some(StatusCode::BAD_GATEWAY));
        assert_eq!(notice.message(), messages::PREDICTION_FAILED);
        assert_eq!(transport.count(&Method::POST, "/predict/minimal"), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn status_failure_keeps_state() {
        let controller = controller(FakeTransport::new().reply_error(Method::GET, "/status", "refused"), true);

        let notice = controller.refresh_model_status().await.unwrap_err();

        assert_eq!(notice.message(), messages::MODEL_STATUS_FAILED);
        assert!(!controller.is_model_trained());
    }

    #[tokio::test(start_paused = true)]
    async fn training_marks_model_trained() {
        let transport = FakeTransport::new().reply_json(Method::POST, "/train", StatusCode::OK, &json!({
            "price_model": { "best_iteration": 40, "best_score": 0.91 },
            "sales_model": { "best_iteration": 35, "best_score": 0.87 }
        }));
        let controller = controller(transport, true);

        let outcome = controller.train().await;

        let TrainOutcome::Trained { result, notice } = outcome else {
            panic!("unexpected outcome: {outcome:?}");
        };
        assert_eq!(result.price_model.best_iteration, 40);
        assert_eq!(notice.message(), messages::TRAINING_SUCCEEDED);
        assert!(controller.is_model_trained());
    }

    #[tokio::test(start_paused = true)]
    async fn training_failure_is_reported() {
        let controller = controller(
            FakeTransport::new().reply_text(Method::POST, "/train", StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            true,
        );

        let outcome = controller.train().await;

        assert!(matches!(outcome, TrainOutcome::Failed { ref notice, .. } if notice.message() == messages::TRAINING_FAILED));
        assert!(!controller.is_model_trained());
    }
}
