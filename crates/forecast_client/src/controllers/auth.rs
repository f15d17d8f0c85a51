// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use crate::notice::messages;
use crate::{
    AuthResponse, ClientError, ForecastClient, HttpTransport, Navigation, Notice, Route, Session, SessionStore, UserCredentials,
};

/// The shortest password the service accepts.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Result of a sign-in, registration or sign-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    notice: Notice,
    navigation: Navigation,
}

impl AuthOutcome {
    fn new(notice: Notice, navigation: Navigation) -> Self {
        Self { notice, navigation }
    }

    fn rejected(message: &'static str) -> Self {
        Self::new(Notice::error(message), Navigation::Continue)
    }

    /// The notice to show.
    #[must_use]
    pub fn notice(&self) -> &Notice {
        &self.notice
    }

    /// Where to go next. Failed attempts stay on the current page.
    pub fn navigation(&self) -> Navigation {
        self.navigation
    }

    /// Whether the action completed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.notice.is_error()
    }
}

/// Drives the sign-in and registration pages and sign-out.
///
/// A successful sign-in or registration saves the session to the [`SessionStore`] and
/// leads to the prediction page. Sign-out clears the store and leads to sign-in.
pub struct AuthController<T> {
    client: Arc<ForecastClient<T>>,
    store: Arc<dyn SessionStore>,
}

impl<T: std::fmt::Debug> std::fmt::Debug for AuthController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthController").field("client", &self.client).finish_non_exhaustive()
    }
}

impl<T: HttpTransport> AuthController<T> {
    /// Creates a controller that persists sessions in `store`.
    pub fn new(client: Arc<ForecastClient<T>>, store: Arc<dyn SessionStore>) -> Self {
        Self { client, store }
    }

    /// Signs in. A `401` from the service is reported as invalid credentials.
    pub async fn login(&self, credentials: &UserCredentials) -> AuthOutcome {
        match self.client.login(credentials).await {
            Ok(response) => self.start_session(response, messages::LOGIN_SUCCEEDED, messages::LOGIN_FAILED),
            Err(error) if error.is_unauthorized() => AuthOutcome::rejected(messages::INVALID_CREDENTIALS),
            Err(error) => {
                log_failure("login", &error);
                AuthOutcome::rejected(messages::LOGIN_FAILED)
            }
        }
    }

    /// Creates an account after checking the password locally. A `409` from the service
    /// is reported as an existing user.
    pub async fn register(&self, credentials: &UserCredentials, confirm_password: &str) -> AuthOutcome {
        if credentials.password != confirm_password {
            return AuthOutcome::rejected(messages::PASSWORDS_DO_NOT_MATCH);
        }

        if credentials.password.chars().count() < MIN_PASSWORD_LEN {
            return AuthOutcome::rejected(messages::PASSWORD_TOO_SHORT);
        }

        match self.client.register(credentials).await {
            Ok(response) => self.start_session(response, messages::REGISTER_SUCCEEDED, messages::REGISTER_FAILED),
            Err(error) if error.is_conflict() => AuthOutcome::rejected(messages::USER_EXISTS),
            Err(error) => {
                log_failure("register", &error);
                AuthOutcome::rejected(messages::REGISTER_FAILED)
            }
        }
    }

    /// Forgets the session.
    pub fn logout(&self) -> AuthOutcome {
        match self.store.clear() {
            Ok(()) => AuthOutcome::new(Notice::success(messages::LOGOUT_SUCCEEDED), Navigation::Redirect(Route::Login)),
            Err(error) => {
                tracing::warn!(%error, "failed to clear session");
                AuthOutcome::new(Notice::error(error.to_string()), Navigation::Continue)
            }
        }
    }

    fn start_session(&self, response: AuthResponse, success: &'static str, failure: &'static str) -> AuthOutcome {
        let session = Session::from(response);
        let user_id = session.user_id.clone();
        match self.store.save(session) {
            Ok(()) => {
                tracing::info!(user_id = %user_id, "session started");
                AuthOutcome::new(Notice::success(success), Navigation::Redirect(Route::Predict))
            }
            Err(error) => {
                tracing::warn!(%error, "failed to save session");
                AuthOutcome::rejected(failure)
            }
        }
    }
}

fn log_failure(action: &'static str, error: &ClientError) {
    tracing::warn!(action, %error, "authentication request failed");
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};
    use serde_json::json;

    use super::*;
    use crate::testing::{FAKE_BASE_URL, FakeTransport};
    use crate::{CredentialProvider, MemorySessionStore};

    fn auth_response() -> serde_json::Value {
        json!({
            "user_id": "u42",
            "email": "buyer@example.com",
            "role": "user",
            "access_token": "access",
            "refresh_token": "refresh",
            "expires_at": 1_900_000_000
        })
    }

    fn controller(transport: FakeTransport) -> (AuthController<FakeTransport>, Arc<MemorySessionStore>) {
        let store = Arc::new(MemorySessionStore::new());
        let client = ForecastClient::new(transport, FAKE_BASE_URL, Arc::clone(&store) as _);
        (AuthController::new(Arc::new(client), Arc::clone(&store) as _), store)
    }

    fn credentials() -> UserCredentials {
        UserCredentials::new("buyer@example.com", "secret-password")
    }

    #[tokio::test]
    async fn login_saves_session_and_redirects() {
        let (controller, store) =
            controller(FakeTransport::new().reply_json(Method::POST, "/auth/login", StatusCode::OK, &auth_response()));

        let outcome = controller.login(&credentials()).await;

        assert!(outcome.is_success());
        assert_eq!(outcome.notice().message(), messages::LOGIN_SUCCEEDED);
        assert_eq!(outcome.navigation(), Navigation::Redirect(Route::Predict));
        assert_eq!(store.load().map(|session| session.user_id), Some("u42".to_string()));
    }

    #[tokio::test]
    async fn login_unauthorized_is_invalid_credentials() {
        let (controller, store) =
            controller(FakeTransport::new().reply_text(Method::POST, "/auth/login", StatusCode::UNAUTHORIZED, ""));

        let outcome = controller.login(&credentials()).await;

        assert_eq!(outcome.notice().message(), messages::INVALID_CREDENTIALS);
        assert_eq!(outcome.navigation(), Navigation::Continue);
        assert_eq!(store.load(), None);
    }

    #[tokio::test]
    async fn login_other_failure_is_generic() {
        let (controller, _) = controller(FakeTransport::new().reply_error(Method::POST, "/auth/login", "refused"));

        let outcome = controller.login(&credentials()).await;

        assert_eq!(outcome.notice().message(), messages::LOGIN_FAILED);
    }

    #[tokio::test]
    async fn register_checks_confirmation_first() {
        let transport = FakeTransport::new();
        let (controller, _) = controller(transport.clone());

        let outcome = controller.register(&credentials(), "different").await;

        assert_eq!(outcome.notice().message(), messages::PASSWORDS_DO_NOT_MATCH);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn register_rejects_short_password() {
        let (controller, _) = controller(FakeTransport::new());

        let outcome = controller.register(&UserCredentials::new("a@b.c", "12345"), "12345").await;

        assert_eq!(outcome.notice().message(), messages::PASSWORD_TOO_SHORT);
    }

    #[tokio::test]
    async fn register_conflict_is_existing_user() {
        let (controller, _) =
            controller(FakeTransport::new().reply_text(Method::POST, "/auth/register", StatusCode::CONFLICT, ""));

        let outcome = controller.register(&credentials(), "secret-password").await;

        assert_eq!(outcome.notice().message(), messages::USER_EXISTS);
        assert!(!outcome.is_success());
    }

    #[tokio::test]
    async fn register_success_starts_session() {
        let transport = FakeTransport::new().reply_json(Method::POST, "/auth/register", StatusCode::CREATED, &auth_response());
        let (controller, store) = controller(transport.clone());

        let outcome = controller.register(&credentials(), "secret-password").await;

        assert_eq!(outcome.notice().message(), messages::REGISTER_SUCCEEDED);
        assert_eq!(store.access_token().as_deref(), Some("access"));
        assert_eq!(
            transport.requests()[0].json(),
            json!({ "email": "buyer@example.com", "password": "secret-password" })
        );
    }

    #[tokio::test]
    async fn logout_clears_session() {
        let (controller, store) =
            controller(FakeTransport::new().reply_json(Method::POST, "/auth/login", StatusCode::OK, &auth_response()));
        let _outcome = controller.login(&credentials()).await;
        assert!(store.is_authenticated());

        let outcome = controller.logout();

        assert_eq!(outcome.notice().message(), messages::LOGOUT_SUCCEEDED);
        assert_eq!(outcome.navigation(), Navigation::Redirect(Route::Login));
        assert!(!store.is_authenticated());
    }
}
