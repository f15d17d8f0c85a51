// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Display;
use std::sync::Arc;

use crate::CredentialProvider;

/// Pages of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Market overview with top products.
    Home,
    /// Prediction form.
    Predict,
    /// Prediction history of the signed-in user.
    Statistics,
    /// Sign-in form.
    Login,
    /// Registration form.
    Register,
}

impl Route {
    /// The page path.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Predict => "/predict",
            Self::Statistics => "/statistics",
            Self::Login => "/login",
            Self::Register => "/register",
        }
    }

    /// Whether the page is only reachable with a session.
    #[must_use]
    pub fn requires_session(self) -> bool {
        matches!(self, Self::Home | Self::Predict | Self::Statistics)
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// What a page should do after an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Navigation {
    /// Stay and render.
    Continue,
    /// Leave for another page.
    Redirect(Route),
}

/// Decides whether a page that needs a session may proceed.
#[cfg_attr(test, mockall::automock)]
pub trait SessionGuard: Send + Sync {
    /// [`Navigation::Continue`] with a session, otherwise a redirect to sign-in.
    fn require_authenticated(&self) -> Navigation;
}

/// A [`SessionGuard`] that checks whether a [`CredentialProvider`] has a token.
#[derive(Clone)]
pub struct CredentialGuard {
    credentials: Arc<dyn CredentialProvider>,
}

impl CredentialGuard {
    /// Creates a guard over `credentials`.
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialProvider>) -> Self {
        Self { credentials }
    }

    /// Where the application root leads: the market overview with a session, sign-in
    /// without.
    #[must_use]
    pub fn landing(&self) -> Route {
        if self.credentials.is_authenticated() {
            Route::Home
        } else {
            Route::Login
        }
    }

    /// The access check for `route`.
    pub fn check(&self, route: Route) -> Navigation {
        if route.requires_session() {
            self.require_authenticated()
        } else {
            Navigation::Continue
        }
    }
}

impl std::fmt::Debug for CredentialGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialGuard")
            .field("authenticated", &self.credentials.is_authenticated())
            .finish()
    }
}

impl SessionGuard for CredentialGuard {
    fn require_authenticated(&self) -> Navigation {
        if self.credentials.is_authenticated() {
            Navigation::Continue
        } else {
            Navigation::Redirect(Route::Login)
        }
    }
}
