// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::path::Path;

use http::Uri;
use persevere::RetryPolicy;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Where the forecasting API listens unless configured otherwise.
pub const DEFAULT_BASE_URL: &str = "http://localhost:6785/api/v1";

/// Settings for a [`ForecastClient`][crate::ForecastClient] and the prediction retry loop.
///
/// | Field | JSON key | Default |
/// |-------|----------|---------|
/// | `base_url` | `base_url` | `http://localhost:6785/api/v1` |
/// | `retry` | `retry` | `{ "max_attempts": 8, "delay_ms": 500 }` |
///
/// Missing keys take their defaults, so `{}` is a valid configuration.
///
/// # Examples
///
/// ```
/// use forecast_client::ClientConfig;
///
/// let config = ClientConfig::from_json_str(r#"{ "retry": { "max_attempts": 3 } }"#).unwrap();
/// assert_eq!(config.base_url(), "http://localhost:6785/api/v1");
/// assert_eq!(config.retry().max_attempts(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    base_url: String,
    retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `base_url` is not an absolute `http` or
    /// `https` URL.
    pub fn new(base_url: impl Into<String>, retry: RetryPolicy) -> Result<Self, ConfigError> {
        Self {
            base_url: base_url.into(),
            retry,
        }
        .validated()
    }

    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or unknown keys and
    /// [`ConfigError::Invalid`] for an unusable base URL.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str::<Self>(json)?.validated()
    }

    /// Reads, parses and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the same errors
    /// as [`from_json_str`][Self::from_json_str].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json_str(&json)
    }

    /// The API base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The retry policy used for predictions.
    #[must_use]
    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        let trimmed_len = self.base_url.trim_end_matches('/').len();
        self.base_url.truncate(trimmed_len);

        let uri: Uri = self
            .base_url
            .parse()
            .map_err(|error| ConfigError::Invalid(format!("base_url `{}`: {error}", self.base_url)))?;

        match uri.scheme_str() {
            Some("http" | "https") if uri.authority().is_some() => Ok(self),
            _ => Err(ConfigError::Invalid(format!(
                "base_url `{}` must be an absolute http or https URL",
                self.base_url
            ))),
        }
    }
}
