// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use bytes::Bytes;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{Method, Request};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{
    AuthResponse, ClientConfig, ClientError, CredentialProvider, HttpTransport, ModelStatus, PredictionRequest, PredictionResult,
    TopProducts, TrainingResult, UserCredentials, UserStatistics,
};

const APPLICATION_JSON: &str = "application/json";

/// Typed access to the forecasting API.
///
/// Every request asks the [`CredentialProvider`] for a token and, when one is available,
/// sends it as `Authorization: Bearer <token>`. Responses outside the `2xx` range become
/// [`ClientError::Status`].
///
/// The client does not retry. Wrap calls in a [`persevere::ResilientInvoker`] where retries
/// are wanted, as [`PredictController`][crate::controllers::PredictController] does for
/// predictions.
pub struct ForecastClient<T> {
    transport: T,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl<T: std::fmt::Debug> std::fmt::Debug for ForecastClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastClient")
            .field("transport", &self.transport)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl<T: HttpTransport> ForecastClient<T> {
    /// Creates a client for the API at `base_url`.
    ///
    /// A trailing slash on `base_url` is ignored.
    pub fn new(transport: T, base_url: impl Into<String>, credentials: Arc<dyn CredentialProvider>) -> Self {
        let mut base_url = base_url.into();
        let trimmed_len = base_url.trim_end_matches('/').len();
        base_url.truncate(trimmed_len);

        Self {
            transport,
            base_url,
            credentials,
        }
    }

    /// Creates a client for the API described by `config`.
    pub fn from_config(transport: T, config: &ClientConfig, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self::new(transport, config.base_url(), credentials)
    }

    /// The API base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether the forecasting models are trained.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails or the response is not a status.
    pub async fn model_status(&self) -> Result<ModelStatus, ClientError> {
        self.execute(Method::GET, "/status", None::<&()>).await
    }

    /// Retrains both forecasting models and returns their scores.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if training fails or the response is malformed.
    pub async fn train_models(&self) -> Result<TrainingResult, ClientError> {
        self.execute(Method::POST, "/train", None::<&()>).await
    }

    /// Requests a forecast, using the endpoint that matches the request shape.
    ///
    /// A degenerate result is returned as is; deciding whether it is usable is up to
    /// the caller.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails or the response is malformed.
    pub async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, ClientError> {
        self.execute(Method::POST, request.path(), Some(request)).await
    }

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Status`] with `409 Conflict` if the email is taken.
    pub async fn register(&self, credentials: &UserCredentials) -> Result<AuthResponse, ClientError> {
        self.execute(Method::POST, "/auth/register", Some(credentials)).await
    }

    /// Signs in.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Status`] with `401 Unauthorized` for a wrong email or password.
    pub async fn login(&self, credentials: &UserCredentials) -> Result<AuthResponse, ClientError> {
        self.execute(Method::POST, "/auth/login", Some(credentials)).await
    }

    /// The prediction history of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails or the response is malformed.
    pub async fn user_statistics(&self) -> Result<UserStatistics, ClientError> {
        self.execute(Method::GET, "/statistics/user", None::<&()>).await
    }

    /// Products with the highest predicted demand growth and price increase.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails or the response is malformed.
    pub async fn top_products(&self) -> Result<TopProducts, ClientError> {
        self.execute(Method::GET, "/statistics/top-products", None::<&()>).await
    }

    async fn execute<B, R>(&self, method: Method, path: &str, body: Option<&B>) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.build_request(method.clone(), path, body)?;

        tracing::debug!(method = %method, path, "sending forecast request");
        let response = self.transport.send(request).await?;
        let status = response.status();
        tracing::debug!(method = %method, path, status = status.as_u16(), "forecast response received");

        if !status.is_success() {
            return Err(ClientError::Status {
                status,
                body: String::from_utf8_lossy(response.body()).into_owned(),
            });
        }

        serde_json::from_slice(response.body()).map_err(ClientError::Decode)
    }

    fn build_request<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Request<Bytes>, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let mut builder = Request::builder()
            .method(method)
            .uri(format!("{}{path}", self.base_url))
            .header(ACCEPT, APPLICATION_JSON);

        if let Some(token) = self.credentials.access_token() {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let body = match body {
            Some(body) => {
                builder = builder.header(CONTENT_TYPE, APPLICATION_JSON);
                Bytes::from(serde_json::to_vec(body).map_err(ClientError::Encode)?)
            }
            None => Bytes::new(),
        };

        Ok(builder.body(body)?)
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use http::StatusCode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::credentials::MockCredentialProvider;
    use crate::testing::{FAKE_BASE_URL, FakeTransport};
    use crate::{MemorySessionStore, MinimalFields};

    fn client_with_token(transport: FakeTransport, token: Option<&str>) -> ForecastClient<FakeTransport> {
        let mut credentials = MockCredentialProvider::new();
        credentials
            .expect_access_token()
            .return_const(token.map(str::to_string));
        ForecastClient::new(transport, FAKE_BASE_URL, Arc::new(credentials))
    }

    #[tokio::test]
    async fn bearer_header_when_token_present() {
        let transport = FakeTransport::new().reply_json(Method::GET, "/status", StatusCode::OK, &json!({ "models_trained": true }));
        let client = client_with_token(transport.clone(), Some("abc"));

        let status = client.model_status().await.unwrap();

        assert!(status.models_trained);
        let request = &transport.requests()[0];
        assert_eq!(request.authorization(), Some("Bearer abc"));
        assert_eq!(request.headers.get(ACCEPT).unwrap(), "application/json");
        assert!(request.headers.get(CONTENT_TYPE).is_none());
    }

    #[tokio::test]
    async fn no_header_without_token() {
        let transport = FakeTransport::new().reply_json(Method::GET, "/status", StatusCode::OK, &json!({ "models_trained": false }));
        let client = client_with_token(transport.clone(), None);

        let _status = client.model_status().await.unwrap();

        assert_eq!(transport.requests()[0].authorization(), None);
    }

    #[tokio::test]
    async fn json_body_has_content_type() {
        let transport = FakeTransport::new().reply_json(
            Method::POST,
            "/predict/minimal",
            StatusCode::OK,
            &json!({ "predicted_price": 10.0, "predicted_sales": 2.0 }),
        );
        let client = ForecastClient::new(transport.clone(), FAKE_BASE_URL, Arc::new(MemorySessionStore::new()));

        let request = PredictionRequest::Minimal(MinimalFields::new("kettle", "north", "acme"));
        let result = client.predict(&request).await.unwrap();

        assert_eq!(result, PredictionResult::new(10.0, 2.0));
        let recorded = &transport.requests()[0];
        assert_eq!(recorded.headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(
            recorded.json(),
            json!({ "product_name": "kettle", "region": "north", "seller": "acme" })
        );
    }

    #[tokio::test]
    async fn trailing_slash_is_ignored() {
        let transport = FakeTransport::new().reply_json(Method::POST, "/train", StatusCode::OK, &json!({
            "price_model": { "best_iteration": 10, "best_score": 0.5 },
            "sales_model": { "best_iteration": 12, "best_score": 0.7 }
        }));
        let client = ForecastClient::new(transport.clone(), format!("{FAKE_BASE_URL}/"), Arc::new(MemorySessionStore::new()));

        let trained = client.train_models().await.unwrap();

        assert_eq!(client.base_url(), FAKE_BASE_URL);
        assert_eq!(trained.sales_model.best_iteration, 12);
        assert_eq!(transport.count(&Method::POST, "/train"), 1);
    }

    #[tokio::test]
    async fn non_success_becomes_status_error() {
        let transport = FakeTransport::new().reply_text(Method::GET, "/statistics/user", StatusCode::UNAUTHORIZED, "token expired");
        let client = client_with_token(transport, Some("stale"));

        let error = client.user_statistics().await.unwrap_err();

        assert!(error.is_unauthorized());
        assert!(matches!(error, ClientError::Status { ref body, .. } if body == "token expired"));
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let transport = FakeTransport::new().reply_text(Method::GET, "/statistics/top-products", StatusCode::OK, "<html>");
        let client = client_with_token(transport, None);

        let error = client.top_products().await.unwrap_err();

        assert!(matches!(error, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn transport_failure_is_surfaced() {
        let transport = FakeTransport::new().reply_error(Method::GET, "/status", "connection refused");
        let client = client_with_token(transport, None);

        let error = client.model_status().await.unwrap_err();

        assert!(matches!(error, ClientError::Transport(_)));
    }

    #[tokio::test]
    async fn invalid_base_url_is_request_error() {
        let client = client_with_token(FakeTransport::new(), None);
        let client = ForecastClient::new(client.transport, "http://bad host", client.credentials);

        let error = client.model_status().await.unwrap_err();

        assert!(matches!(error, ClientError::Request(_)));
    }
}
