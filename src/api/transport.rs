//! HTTP transport abstraction.
//!
//! The client builds an [`ApiRequest`] per operation and hands it to a
//! [`Transport`]. The default [`HttpTransport`] sends it with `reqwest`; tests
//! substitute an in-memory implementation.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use tracing::trace;

use super::error::{ApiError, Result};

/// Outbound header set, ordered by name.
pub type Headers = BTreeMap<String, String>;

/// A fully-built outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// The HTTP method.
    pub method: Method,
    /// The absolute URL, including any query string.
    pub url: String,
    /// Headers to attach verbatim.
    pub headers: Headers,
    /// Serialized JSON body, if any.
    pub body: Option<Vec<u8>>,
}

/// A response as received from the remote side.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ApiResponse {
    /// Create a response from its parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// The response status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The raw response body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The response body as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Generic failure classification: anything outside 2xx.
    pub fn is_error(&self) -> bool {
        !self.status.is_success()
    }
}

/// Executes requests against the remote service.
///
/// Implementations must return only [`ApiError::Request`] on failure; status
/// classification and decoding belong to the client.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and wait for the complete response.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        (**self).send(request).await
    }
}

/// Transport backed by a reusable `reqwest` client.
///
/// No timeout is configured beyond reqwest's defaults.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build the transport.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Request`] if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("ytrack/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an already-configured `reqwest` client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let headers = to_header_map(&request.headers)?;

        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        trace!(status = status.as_u16(), len = body.len(), "response received");

        Ok(ApiResponse::new(status, headers, body.to_vec()))
    }
}

/// Convert the stored header set, rejecting values HTTP cannot carry.
fn to_header_map(headers: &Headers) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(ApiError::request)?;
        let value = HeaderValue::from_str(value).map_err(ApiError::request)?;
        map.insert(name, value);
    }
    Ok(map)
}
