//! API error types for the Tracker client.

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

use super::transport::Headers;

/// Boxed cause carried by transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur when interacting with the Tracker API.
///
/// Every failure is scoped to the single call that produced it. Nothing is
/// retried.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connection, TLS, invalid
    /// header value, body encoding).
    #[error("request: {0}")]
    Request(#[source] BoxError),

    /// A response arrived but was rejected by the success check.
    #[error(
        "wrong status code: {}, message={}{}",
        .status.as_u16(),
        .body,
        DisplayHeaders(.headers.as_ref())
    )]
    UnexpectedStatus {
        /// The response status code.
        status: StatusCode,
        /// The raw response body.
        body: String,
        /// The outbound headers, attached on the generic (issue) path only.
        headers: Option<Headers>,
    },

    /// The response body did not parse into the expected shape.
    #[error("json decode: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Wrap any error as a transport failure.
    pub fn request(err: impl Into<BoxError>) -> Self {
        ApiError::Request(err.into())
    }

    /// The status code of a rejected response, if this is one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The raw body of a rejected response, if this is one.
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::UnexpectedStatus { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Check whether the remote side answered 404.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Check whether the remote side rejected the credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN)
        )
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Request(Box::new(err))
    }
}

/// Formats the optional header set with the token masked.
struct DisplayHeaders<'a>(Option<&'a Headers>);

impl fmt::Display for DisplayHeaders<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(headers) = self.0 else {
            return Ok(());
        };
        write!(f, ", headers={{")?;
        for (i, (name, value)) in headers.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if name.eq_ignore_ascii_case("authorization") {
                write!(f, "{}: <redacted>", name)?;
            } else {
                write!(f, "{}: {}", name, value)?;
            }
        }
        write!(f, "}}")
    }
}
