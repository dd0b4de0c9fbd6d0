//! Tracker API client implementation.
//!
//! This module provides the main client for the Tracker REST API v2. Every
//! operation is exactly one request/response round trip: no retries, no
//! caching, no pagination beyond what the caller passes in.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};

use super::auth::Credentials;
use super::error::{ApiError, Result};
use super::logger::{RequestEvent, RequestLogger, TracingLogger};
use super::transport::{ApiRequest, ApiResponse, Headers, HttpTransport, Transport};
use super::types::{
    CreateIssueOptions, FindIssuesOptions, Issue, ListOptions, Ticket, TicketComments, User,
};

/// The fixed API host.
pub const BASE_URL: &str = "https://api.tracker.yandex.net";

/// The Tracker API client.
///
/// Holds the outbound header set and a reusable transport, both fixed at
/// construction. Logging and debug mode are also set at construction through
/// the consuming `with_*` methods, so a shared client has no mutable state.
pub struct TrackerClient<T = HttpTransport> {
    /// The transport requests are sent over.
    transport: T,
    /// Headers attached to every request.
    headers: Headers,
    /// Where request diagnostics go when `debug` is set.
    logger: Arc<dyn RequestLogger>,
    debug: bool,
}

impl TrackerClient<HttpTransport> {
    /// Create a client over the default HTTP transport.
    ///
    /// No network I/O happens here and the credentials are not validated. A
    /// non-empty `cloud_org_id` is sent as `X-Cloud-Org-ID`; otherwise
    /// `org_id` is sent as `X-Org-Id`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Request`] if the HTTP client cannot be built.
    pub fn new(token: &str, org_id: &str, cloud_org_id: &str) -> Result<Self> {
        let transport = HttpTransport::new()?;
        Ok(Self::with_transport(
            &Credentials::new(token, org_id, cloud_org_id),
            transport,
        ))
    }
}

impl<T: Transport> TrackerClient<T> {
    /// Create a client over an explicit transport.
    pub fn with_transport(credentials: &Credentials, transport: T) -> Self {
        Self {
            transport,
            headers: credentials.headers(),
            logger: Arc::new(TracingLogger),
            debug: false,
        }
    }

    /// Send request diagnostics to `logger` instead of `tracing`.
    pub fn with_logger(mut self, logger: Arc<dyn RequestLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Enable or disable per-request diagnostics.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// The headers attached to every request.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Whether debug diagnostics are enabled.
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Get a ticket by key.
    ///
    /// Calls `GET /v2/issues/{key}`. Any status other than 200 is an error.
    #[instrument(skip(self), fields(ticket_key = %key))]
    pub async fn get_ticket(&self, key: &str) -> Result<Ticket> {
        debug!("Fetching ticket");
        let request = self.new_request(Method::GET, &issue_path(key), None);
        self.send_expect_ok(request).await
    }

    /// Patch ticket fields.
    ///
    /// Calls `PATCH /v2/issues/{key}` with `changes` as the JSON body, exactly
    /// as given. Any status other than 200 is an error.
    #[instrument(skip(self, changes), fields(ticket_key = %key, field_count = changes.len()))]
    pub async fn patch_ticket(
        &self,
        key: &str,
        changes: &BTreeMap<String, String>,
    ) -> Result<Ticket> {
        debug!("Patching ticket");
        let body = encode(changes)?;
        let request = self.new_request(Method::PATCH, &issue_path(key), Some(body));
        self.send_expect_ok(request).await
    }

    /// Get the comments on a ticket.
    ///
    /// Calls `GET /v2/issues/{key}/comments`. Any status other than 200 is an
    /// error.
    #[instrument(skip(self), fields(ticket_key = %key))]
    pub async fn get_ticket_comments(&self, key: &str) -> Result<TicketComments> {
        debug!("Fetching ticket comments");
        let path = format!("{}/comments", issue_path(key));
        let request = self.new_request(Method::GET, &path, None);
        let comments: TicketComments = self.send_expect_ok(request).await?;
        debug!("Fetched {} comments", comments.len());
        Ok(comments)
    }

    /// Get the authenticated user.
    ///
    /// Calls `GET /v2/myself`.
    #[instrument(skip(self))]
    pub async fn myself(&self) -> Result<User> {
        let request = self.new_request(Method::GET, "/v2/myself", None);
        let (user, _) = self.execute(request).await?;
        Ok(user)
    }

    /// Create an issue.
    ///
    /// Calls `POST /v2/issues/` and returns the created issue together with the
    /// raw response.
    #[instrument(skip(self, opts), fields(queue = %opts.queue))]
    pub async fn create_issue(&self, opts: &CreateIssueOptions) -> Result<(Issue, ApiResponse)> {
        debug!("Creating issue");
        let body = encode(opts)?;
        let request = self.new_request(Method::POST, "/v2/issues/", Some(body));
        let (issue, response): (Issue, _) = self.execute(request).await?;
        debug!("Created issue: {}", issue.key);
        Ok((issue, response))
    }

    /// Search for issues.
    ///
    /// Calls `POST /v2/issues/_search` with `opts` as the body and `list_opts`
    /// as `perPage`/`page` query parameters. Only the requested page is
    /// fetched.
    #[instrument(skip(self, opts, list_opts))]
    pub async fn find_issues(
        &self,
        opts: &FindIssuesOptions,
        list_opts: Option<&ListOptions>,
    ) -> Result<(Vec<Issue>, ApiResponse)> {
        let mut path = "/v2/issues/_search".to_string();
        if let Some(query) = list_opts.map(ListOptions::to_query) {
            if !query.is_empty() {
                path.push('?');
                path.push_str(&query);
            }
        }

        let body = encode(opts)?;
        let request = self.new_request(Method::POST, &path, Some(body));
        let (issues, response): (Vec<Issue>, _) = self.execute(request).await?;
        debug!("Found {} issues", issues.len());
        Ok((issues, response))
    }

    /// Get an issue by key.
    ///
    /// Calls `GET /v2/issues/{key}` and returns the issue together with the
    /// raw response.
    #[instrument(skip(self), fields(issue_key = %key))]
    pub async fn get_issue(&self, key: &str) -> Result<(Issue, ApiResponse)> {
        let request = self.new_request(Method::GET, &issue_path(key), None);
        self.execute(request).await
    }

    /// Build a request to `BASE_URL + path` carrying the stored headers.
    pub fn new_request(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> ApiRequest {
        ApiRequest {
            method,
            url: format!("{}{}", BASE_URL, path),
            headers: self.headers.clone(),
            body,
        }
    }

    /// Send a request, rejecting any non-2xx status, and decode the body.
    ///
    /// Rejections carry the outbound headers for diagnosis.
    pub async fn execute<R: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<(R, ApiResponse)> {
        let response = self.send(request).await?;
        if response.is_error() {
            return Err(ApiError::UnexpectedStatus {
                status: response.status(),
                body: response.text(),
                headers: Some(self.headers.clone()),
            });
        }

        let value = serde_json::from_slice(response.body())?;
        Ok((value, response))
    }

    /// Send a request, rejecting anything but 200, and decode the body.
    async fn send_expect_ok<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R> {
        let response = self.send(request).await?;
        if response.status() != StatusCode::OK {
            return Err(ApiError::UnexpectedStatus {
                status: response.status(),
                body: response.text(),
                headers: None,
            });
        }

        Ok(serde_json::from_slice(response.body())?)
    }

    /// Hand the request to the transport, reporting to the logger in debug mode.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        if !self.debug {
            return self.transport.send(request).await;
        }

        let method = request.method.clone();
        let url = request.url.clone();
        self.logger.log(&RequestEvent::Sending {
            method: method.clone(),
            url: url.clone(),
            header_names: request.headers.keys().cloned().collect(),
            body: request
                .body
                .as_ref()
                .map(|b| String::from_utf8_lossy(b).into_owned()),
        });

        match self.transport.send(request).await {
            Ok(response) => {
                self.logger.log(&RequestEvent::Received {
                    method,
                    url,
                    status: response.status(),
                    body: response.text(),
                });
                Ok(response)
            }
            Err(e) => {
                self.logger.log(&RequestEvent::Failed {
                    method,
                    url,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }
}

impl<T> fmt::Debug for TrackerClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header_names: Vec<&str> = self.headers.keys().map(String::as_str).collect();
        f.debug_struct("TrackerClient")
            .field("headers", &header_names)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

/// Path of a single issue, with the key percent-encoded as one segment.
fn issue_path(key: &str) -> String {
    format!("/v2/issues/{}", urlencoding::encode(key))
}

/// Serialize a request body. Failure means no request can be sent.
fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Vec<u8>> {
    serde_json::to_vec(body).map_err(ApiError::request)
}
