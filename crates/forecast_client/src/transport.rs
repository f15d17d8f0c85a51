// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use bytes::Bytes;
use http::{Request, Response};

use crate::TransportError;

/// Sends a fully buffered HTTP request and returns the fully buffered response.
///
/// This is the seam between [`ForecastClient`][crate::ForecastClient] and the network.
/// Implementations only move bytes; status handling, JSON and authentication headers are
/// the client's job. Any response, including `4xx` and `5xx`, is `Ok`.
pub trait HttpTransport: Send + Sync {
    /// Sends `request`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response could be obtained.
    fn send(&self, request: Request<Bytes>) -> impl Future<Output = Result<Response<Bytes>, TransportError>> + Send;
}

#[cfg(feature = "hyper")]
pub use hyper_transport::HyperTransport;

#[cfg(feature = "hyper")]
mod hyper_transport {
    use bytes::Bytes;
    use http::{Request, Response};
    use http_body_util::{BodyExt, Full};
    use hyper_util::client::legacy::Client;
    use hyper_util::client::legacy::connect::HttpConnector;
    use hyper_util::rt::TokioExecutor;

    use super::HttpTransport;
    use crate::TransportError;

    /// HTTP/1.1 transport backed by a pooled `hyper` client.
    ///
    /// Requires a Tokio runtime. Cloning is cheap and shares the connection pool.
    #[derive(Debug, Clone)]
    pub struct HyperTransport {
        client: Client<HttpConnector, Full<Bytes>>,
    }

    impl HyperTransport {
        /// Creates a transport with a fresh connection pool.
        #[must_use]
        pub fn new() -> Self {
            Self {
                client: Client::builder(TokioExecutor::new()).build_http(),
            }
        }
    }

    impl Default for HyperTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl HttpTransport for HyperTransport {
        async fn send(&self, request: Request<Bytes>) -> Result<Response<Bytes>, TransportError> {
            let response = self
                .client
                .request(request.map(Full::new))
                .await
                .map_err(|error| TransportError::with_source("request failed", error))?;

            let (parts, body) = response.into_parts();
            let body = body
                .collect()
                .await
                .map_err(|error| TransportError::with_source("failed to read response body", error))?
                .to_bytes();

            Ok(Response::from_parts(parts, body))
        }
    }

}
