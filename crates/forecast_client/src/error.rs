// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::error::Error as StdError;
use std::path::PathBuf;

use http::StatusCode;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// The request never produced an HTTP response.
///
/// Raised by [`HttpTransport`][crate::HttpTransport] implementations when the
/// connection could not be established, broke mid-flight, or the response body could
/// not be read.
#[derive(Debug, thiserror::Error)]
#[error("transport failure: {message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl TransportError {
    /// Creates an error with a message only.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error that wraps the underlying cause.
    #[must_use]
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// The human-readable description of the failure.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors returned by [`ForecastClient`][crate::ForecastClient].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ClientError {
    /// No response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The service answered with a non-success status code.
    #[error("service responded with {status}: {body}")]
    Status {
        /// The response status.
        status: StatusCode,
        /// The response body, decoded lossily as UTF-8.
        body: String,
    },

    /// The request body could not be serialized.
    #[error("failed to encode request body")]
    Encode(#[source] serde_json::Error),

    /// The response body did not match the expected shape.
    #[error("failed to decode response body")]
    Decode(#[source] serde_json::Error),

    /// The HTTP request could not be assembled, usually because of an invalid base URL.
    #[error("failed to build request")]
    Request(#[from] http::Error),
}

impl ClientError {
    /// The response status, when the service answered at all.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the service rejected the caller's credentials.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Whether the service reported a conflict with existing state.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(StatusCode::CONFLICT)
    }
}

/// Errors raised while persisting a session.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// Reading or writing the session file failed.
    #[error("session file {path}: {source}")]
    Io {
        /// The session file location.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The session file does not contain a valid session.
    #[error("session file is not valid JSON")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while loading a [`ClientConfig`][crate::ClientConfig].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration from {path}")]
    Io {
        /// The configuration file location.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid JSON or has unexpected fields.
    #[error("failed to parse configuration")]
    Parse(#[from] serde_json::Error),

    /// A value is well-formed but unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
