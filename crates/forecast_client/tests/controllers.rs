// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! End-to-end page flows over the scripted transport, with a real session store and guard.

use std::sync::Arc;
use std::time::Duration;

use forecast_client::controllers::{
    AuthController, HistoryView, OverviewView, PredictController, StatisticsController, SubmitOutcome, TrainOutcome,
};
use forecast_client::testing::{FAKE_BASE_URL, FakeTransport};
use forecast_client::{
    CredentialGuard, CredentialProvider, ForecastClient, InvocationContext, MemorySessionStore, MinimalFields, Navigation,
    PredictionRequest, RetryPolicy, Route, SessionStore, UserCredentials, messages,
};
use http::{Method, StatusCode};
use serde_json::json;
use tokio::time::Instant;

const DELAY: Duration = Duration::from_millis(500);

struct App {
    transport: FakeTransport,
    store: Arc<MemorySessionStore>,
    auth: AuthController<FakeTransport>,
    predict: PredictController<FakeTransport>,
    statistics: StatisticsController<FakeTransport>,
}

impl App {
    fn new(transport: FakeTransport) -> Self {
        let store = Arc::new(MemorySessionStore::new());
        let client = Arc::new(ForecastClient::new(transport.clone(), FAKE_BASE_URL, Arc::clone(&store) as _));
        let guard = Arc::new(CredentialGuard::new(Arc::clone(&store) as _));

        Self {
            auth: AuthController::new(Arc::clone(&client), Arc::clone(&store) as _),
            predict: PredictController::new(
                Arc::clone(&client),
                Arc::clone(&guard) as _,
                RetryPolicy::new(8, DELAY),
                &InvocationContext::new().name("forecast").enable_logs(),
            ),
            statistics: StatisticsController::new(client, guard),
            transport,
            store,
        }
    }

    async fn sign_in(&self) {
        let outcome = self.auth.login(&UserCredentials::new("buyer@example.com", "secret-password")).await;
        assert_eq!(outcome.navigation(), Navigation::Redirect(Route::Predict));
    }

    async fn ready(&self) {
        self.sign_in().await;
        assert_eq!(self.predict.refresh_model_status().await, Ok(true));
    }

    fn predictions(&self) -> usize {
        self.transport.count(&Method::POST, "/predict/minimal")
    }
}

fn scripted() -> FakeTransport {
    FakeTransport::new()
        .reply_json(
            Method::POST,
            "/auth/login",
            StatusCode::OK,
            &json!({
                "user_id": "u1",
                "email": "buyer@example.com",
                "role": "user",
                "access_token": "access",
                "refresh_token": "refresh",
                "expires_at": 1_900_000_000
            }),
        )
        .reply_json(Method::GET, "/status", StatusCode::OK, &json!({ "models_trained": true }))
}

fn empty_forecast() -> serde_json::Value {
    json!({ "predicted_price": 0.0, "predicted_sales": 0.0 })
}

fn usable_forecast() -> serde_json::Value {
    json!({ "predicted_price": 42.0, "predicted_sales": 7.0 })
}

fn assert_elapsed(start: Instant, expected: Duration) {
    let elapsed = start.elapsed();
    assert!(
        elapsed >= expected && elapsed < expected + Duration::from_millis(10),
        "expected about {expected:?}, got {elapsed:?}"
    );
}

fn request() -> PredictionRequest {
    MinimalFields::new("kettle", "north", "acme").into()
}

#[tokio::test(start_paused = true)]
async fn empty_forecasts_are_retried_until_usable() {
    let transport = scripted()
        .reply_json(Method::POST, "/predict/minimal", StatusCode::OK, &empty_forecast())
        .reply_json(Method::POST, "/predict/minimal", StatusCode::OK, &empty_forecast())
        .reply_json(Method::POST, "/predict/minimal", StatusCode::OK, &usable_forecast());
    let app = App::new(transport);
    app.ready().await;

    let start = Instant::now();
    let outcome = app.predict.submit(&request()).await;

    assert!(matches!(outcome, SubmitOutcome::Predicted { ref result, .. } if result.predicted_sales > 6.0));
    assert_eq!(app.predictions(), 3);
    assert_elapsed(start, 2 * DELAY);
    assert_eq!(
        app.transport.requests().last().and_then(|request| request.authorization().map(str::to_string)),
        Some("Bearer access".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn persistent_empty_forecast_asks_for_retraining() {
    let transport = scripted().reply_json(Method::POST, "/predict/minimal", StatusCode::OK, &empty_forecast());
    let app = App::new(transport);
    app.ready().await;

    let start = Instant::now();
    let outcome = app.predict.submit(&request()).await;

    assert_eq!(outcome.notice().map(|notice| notice.message()), Some(messages::INSUFFICIENT_DATA));
    assert!(matches!(outcome, SubmitOutcome::InsufficientData { .. }));
    assert_eq!(app.predictions(), 8);
    assert_elapsed(start, 7 * DELAY);
}

#[tokio::test(start_paused = true)]
async fn last_error_wins_over_earlier_empty_forecast() {
    let transport = scripted()
        .reply_json(Method::POST, "/predict/minimal", StatusCode::OK, &empty_forecast())
        .reply_error(Method::POST, "/predict/minimal", "connection refused");
    let app = App::new(transport);
    app.ready().await;

    let outcome = app.predict.submit(&request()).await;

    assert_eq!(outcome.notice().map(|notice| notice.message()), Some(messages::PREDICTION_FAILED));
    assert!(matches!(outcome, SubmitOutcome::Failed { .. }));
    assert_eq!(app.predictions(), 8);
}

#[tokio::test(start_paused = true)]
async fn second_submission_while_busy_is_refused() {
    let transport = scripted()
        .reply_json(Method::POST, "/predict/minimal", StatusCode::OK, &empty_forecast())
        .reply_json(Method::POST, "/predict/minimal", StatusCode::OK, &usable_forecast());
    let app = App::new(transport);
    app.ready().await;

    let first_request = request();
    let second_request = request();
    let (first, second) = tokio::join!(app.predict.submit(&first_request), app.predict.submit(&second_request));

    assert!(matches!(first, SubmitOutcome::Predicted { .. }));
    assert!(matches!(second, SubmitOutcome::Busy));
    assert!(!app.predict.is_busy());
    assert_eq!(app.predictions(), 2);
}

#[tokio::test(start_paused = true)]
async fn training_unlocks_predictions() {
    let transport = scripted()
        .reply_json(Method::GET, "/status", StatusCode::OK, &json!({ "models_trained": false }))
        .reply_json(
            Method::POST,
            "/train",
            StatusCode::OK,
            &json!({
                "price_model": { "best_iteration": 120, "best_score": 0.91 },
                "sales_model": { "best_iteration": 80, "best_score": 0.87 }
            }),
        )
        .reply_json(Method::POST, "/predict/minimal", StatusCode::OK, &usable_forecast());
    let app = App::new(transport);
    app.sign_in().await;

    assert_eq!(app.predict.refresh_model_status().await, Ok(true));
    assert_eq!(app.predict.refresh_model_status().await, Ok(false));
    assert!(matches!(app.predict.submit(&request()).await, SubmitOutcome::ModelNotTrained(_)));
    assert_eq!(app.predictions(), 0);

    assert!(matches!(app.predict.train().await, TrainOutcome::Trained { .. }));
    assert!(app.predict.is_model_trained());
    assert!(matches!(app.predict.submit(&request()).await, SubmitOutcome::Predicted { .. }));
}

#[tokio::test(start_paused = true)]
async fn logout_closes_protected_pages() {
    let transport = scripted().reply_json(Method::POST, "/predict/minimal", StatusCode::OK, &usable_forecast());
    let app = App::new(transport);
    app.ready().await;
    assert_eq!(app.predict.open(), Navigation::Continue);

    let outcome = app.auth.logout();

    assert_eq!(outcome.navigation(), Navigation::Redirect(Route::Login));
    assert_eq!(app.store.load(), None);
    assert_eq!(app.predict.open(), Navigation::Redirect(Route::Login));
    assert!(matches!(app.predict.submit(&request()).await, SubmitOutcome::Redirect(Route::Login)));
    assert_eq!(app.statistics.load_history().await, HistoryView::Redirect(Route::Login));
    assert_eq!(app.statistics.top_products().await, OverviewView::Redirect(Route::Login));
    assert_eq!(app.predictions(), 0);
    assert_eq!(app.transport.count(&Method::GET, "/statistics/top-products"), 0);
}

#[tokio::test]
async fn history_after_sign_in() {
    let transport = scripted().reply_json(
        Method::GET,
        "/statistics/user",
        StatusCode::OK,
        &json!({
            "user_id": "u1",
            "predictions": [{
                "id": "p1",
                "user_id": "u1",
                "created_at": "2026-03-01T10:00:00Z",
                "request": { "product_name": "kettle", "brand": "acme", "price": 40.0 },
                "result": { "predicted_price": 42.0, "predicted_sales": 7.0 }
            }]
        }),
    );
    let app = App::new(transport);
    app.sign_in().await;

    let view = app.statistics.load_history().await;

    assert!(matches!(
        view,
        HistoryView::Loaded(ref statistics) if !statistics.predictions[0].minimal && statistics.predictions[0].request["brand"] == "acme"
    ));
    assert_eq!(
        app.transport.requests().last().and_then(|request| request.authorization().map(str::to_string)),
        Some("Bearer access".to_string())
    );
}

#[tokio::test]
async fn invalid_login_keeps_user_anonymous() {
    let transport = FakeTransport::new().reply_text(Method::POST, "/auth/login", StatusCode::UNAUTHORIZED, "");
    let app = App::new(transport);

    let outcome = app.auth.login(&UserCredentials::new("buyer@example.com", "wrong-password")).await;

    assert_eq!(outcome.notice().message(), messages::INVALID_CREDENTIALS);
    assert!(!app.store.is_authenticated());
    assert_eq!(app.predict.open(), Navigation::Redirect(Route::Login));
}

#[tokio::test]
async fn root_leads_to_overview_after_sign_in() {
    let transport = scripted().reply_json(
        Method::GET,
        "/statistics/top-products",
        StatusCode::OK,
        &json!({
            "top_demand_growth": [{
                "id": "t1",
                "name": "kettle",
                "brand": "acme",
                "category": "kitchen",
                "current_price": 40.0,
                "predicted_price": 44.0,
                "demand_growth_percentage": 12.5
            }],
            "top_price_increase": []
        }),
    );
    let app = App::new(transport);
    let guard = CredentialGuard::new(Arc::clone(&app.store) as _);
    assert_eq!(guard.landing(), Route::Login);
    assert_eq!(guard.check(Route::Home), Navigation::Redirect(Route::Login));

    app.sign_in().await;

    assert_eq!(guard.landing(), Route::Home);
    assert_eq!(guard.check(Route::Home), Navigation::Continue);
    let view = app.statistics.top_products().await;
    assert!(matches!(
        view,
        OverviewView::Loaded(ref products) if products.top_demand_growth.len() == 1 && products.top_price_increase.is_empty()
    ));
}
