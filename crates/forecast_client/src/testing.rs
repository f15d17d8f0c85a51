// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-memory transport for exercising the client and controllers without a network.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Method, Request, Response, StatusCode};
use parking_lot::Mutex;
use serde::Serialize;

use crate::{HttpTransport, TransportError};

/// Base URL understood by [`FakeTransport`]; request paths are recorded relative to it.
pub const FAKE_BASE_URL: &str = "http://forecast.test/api/v1";

const FAKE_BASE_PATH: &str = "/api/v1";

/// A scripted [`HttpTransport`].
///
/// Replies are queued per method and path. Each request takes the next queued reply;
/// the last reply of a route is repeated for every further request. Requests to routes
/// with no reply get `404 Not Found`.
///
/// Clones share the same script and request log.
///
/// # Examples
///
/// ```
/// use forecast_client::testing::FakeTransport;
/// use http::{Method, StatusCode};
///
/// let transport = FakeTransport::new()
///     .reply_json(Method::GET, "/status", StatusCode::OK, &serde_json::json!({ "models_trained": true }));
/// assert!(transport.requests().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<FakeState>>,
}

#[derive(Debug, Default)]
struct FakeState {
    routes: HashMap<(Method, String), VecDeque<FakeReply>>,
    requests: Vec<RecordedRequest>,
}

#[derive(Debug, Clone)]
enum FakeReply {
    Response { status: StatusCode, body: Bytes },
    Error(String),
}

/// A request observed by [`FakeTransport`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// The request method.
    pub method: Method,
    /// The path relative to [`FAKE_BASE_URL`].
    pub path: String,
    /// All request headers.
    pub headers: HeaderMap,
    /// The raw request body.
    pub body: Bytes,
}

impl RecordedRequest {
    /// The `Authorization` header, if present and valid UTF-8.
    #[must_use]
    pub fn authorization(&self) -> Option<&str> {
        self.headers
            .get(http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
    }

    /// The body parsed as JSON, or `Null` when it is empty or not JSON.
    #[must_use]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap_or_default()
    }
}

impl FakeTransport {
    /// Creates a transport with no scripted replies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a JSON reply.
    ///
    /// # Panics
    ///
    /// Panics if `body` cannot be serialized.
    #[must_use]
    pub fn reply_json(self, method: Method, path: &str, status: StatusCode, body: &impl Serialize) -> Self {
        let body = serde_json::to_vec(body).expect("reply body must serialize");
        self.push(method, path, FakeReply::Response {
            status,
            body: Bytes::from(body),
        })
    }

    /// Queues a reply with a plain-text body.
    #[must_use]
    pub fn reply_text(self, method: Method, path: &str, status: StatusCode, body: &str) -> Self {
        self.push(method, path, FakeReply::Response {
            status,
            body: Bytes::copy_from_slice(body.as_bytes()),
        })
    }

    /// Queues a transport failure.
    #[must_use]
    pub fn reply_error(self, method: Method, path: &str, message: &str) -> Self {
        self.push(method, path, FakeReply::Error(message.to_string()))
    }

    /// Every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }

    /// How many requests hit `method` and `path`.
    #[must_use]
    pub fn count(&self, method: &Method, path: &str) -> usize {
        self.state
            .lock()
            .requests
            .iter()
            .filter(|request| request.method == method && request.path == path)
            .count()
    }

    fn push(self, method: Method, path: &str, reply: FakeReply) -> Self {
        self.state
            .lock()
            .routes
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    fn next_reply(&self, recorded: RecordedRequest) -> Option<FakeReply> {
        let mut state = self.state.lock();
        let key = (recorded.method.clone(), recorded.path.clone());
        state.requests.push(recorded);

        let queue = state.routes.get_mut(&key)?;
        if queue.len() > 1 { queue.pop_front() } else { queue.front().cloned() }
    }
}

impl HttpTransport for FakeTransport {
    async fn send(&self, request: Request<Bytes>) -> Result<Response<Bytes>, TransportError> {
        let (parts, body) = request.into_parts();
        let path = parts.uri.path();
        let path = path.strip_prefix(FAKE_BASE_PATH).unwrap_or(path).to_string();

        let recorded = RecordedRequest {
            method: parts.method,
            path,
            headers: parts.headers,
            body,
        };

        match self.next_reply(recorded) {
            Some(FakeReply::Response { status, body }) => Ok(response(status, body)),
            Some(FakeReply::Error(message)) => Err(TransportError::new(message)),
            None => Ok(response(StatusCode::NOT_FOUND, Bytes::new())),
        }
    }
}

fn response(status: StatusCode, body: Bytes) -> Response<Bytes> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
}
