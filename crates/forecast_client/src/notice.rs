// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::fmt::Display;

/// Whether a notice reports a completed action or a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    /// The action completed.
    Success,
    /// The action failed or was refused.
    Error,
}

/// A short message for the user, the boundary between controllers and whatever renders
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    level: NoticeLevel,
    message: Cow<'static, str>,
}

impl Notice {
    /// A success notice.
    #[must_use]
    pub fn success(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    /// An error notice.
    #[must_use]
    pub fn error(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// The notice level.
    #[must_use]
    pub fn level(&self) -> NoticeLevel {
        self.level
    }

    /// Whether this is an error notice.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }

    /// The message text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Message texts shown by the controllers.
pub mod messages {
    /// A valid forecast was received.
    pub const PREDICTION_SUCCEEDED: &str = "Prediction received";
    /// Every attempt returned an empty forecast.
    pub const INSUFFICIENT_DATA: &str = "Prediction impossible with current data, model retraining required";
    /// The last attempt failed with an error.
    pub const PREDICTION_FAILED: &str = "Failed to get prediction";
    /// A prediction was requested before the models were trained.
    pub const MODEL_NOT_TRAINED: &str = "Please train the model first";
    /// The model status request failed.
    pub const MODEL_STATUS_FAILED: &str = "Failed to check model status";
    /// Training completed.
    pub const TRAINING_SUCCEEDED: &str = "Model retrained successfully";
    /// Training failed.
    pub const TRAINING_FAILED: &str = "Failed to train the model";
    /// Sign-in completed.
    pub const LOGIN_SUCCEEDED: &str = "Signed in successfully";
    /// The service rejected the email or password.
    pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
    /// Sign-in failed for another reason.
    pub const LOGIN_FAILED: &str = "Failed to sign in";
    /// Registration completed.
    pub const REGISTER_SUCCEEDED: &str = "Registration successful";
    /// The email is already registered.
    pub const USER_EXISTS: &str = "A user with this email already exists";
    /// Registration failed for another reason.
    pub const REGISTER_FAILED: &str = "Failed to register";
    /// Password and confirmation differ.
    pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match";
    /// The password is shorter than the service accepts.
    pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";
    /// The session was cleared.
    pub const LOGOUT_SUCCEEDED: &str = "Signed out successfully";
    /// The prediction history could not be loaded.
    pub const STATISTICS_FAILED: &str = "Failed to load statistics";
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_level() {
        let ok = Notice::success(messages::LOGIN_SUCCEEDED);
        assert_eq!(ok.level(), NoticeLevel::Success);
        assert!(!ok.is_error());

        let failed = Notice::error(format!("missing: {}", "seller"));
        assert!(failed.is_error());
        assert_eq!(failed.to_string(), "missing: seller");
        assert_eq!(failed.message(), "missing: seller");
    }

    #[test]
    fn prediction_messages_are_distinct() {
        assert_ne!(messages::INSUFFICIENT_DATA, messages::PREDICTION_FAILED);
    }
}
