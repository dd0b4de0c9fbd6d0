//! Request logging sinks.
//!
//! When debug mode is enabled on a [`TrackerClient`](super::TrackerClient),
//! every request and its outcome are reported to a [`RequestLogger`]. The
//! default sink forwards to `tracing`.

use std::fmt;

use reqwest::{Method, StatusCode};

/// A single observation made while executing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestEvent {
    /// A request is about to be sent.
    Sending {
        method: Method,
        url: String,
        /// Header names only. Values may hold credentials.
        header_names: Vec<String>,
        body: Option<String>,
    },
    /// A response was received.
    Received {
        method: Method,
        url: String,
        status: StatusCode,
        body: String,
    },
    /// The transport failed before a response arrived.
    Failed {
        method: Method,
        url: String,
        error: String,
    },
}

impl fmt::Display for RequestEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestEvent::Sending { method, url, .. } => write!(f, "--> {} {}", method, url),
            RequestEvent::Received {
                method,
                url,
                status,
                ..
            } => write!(f, "<-- {} {} {}", status.as_u16(), method, url),
            RequestEvent::Failed { method, url, error } => {
                write!(f, "<-- FAILED {} {}: {}", method, url, error)
            }
        }
    }
}

/// A sink for request diagnostics.
pub trait RequestLogger: Send + Sync {
    /// Record one event.
    fn log(&self, event: &RequestEvent);
}

/// Forwards request events to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl RequestLogger for TracingLogger {
    fn log(&self, event: &RequestEvent) {
        match event {
            RequestEvent::Sending {
                header_names, body, ..
            } => {
                tracing::debug!(
                    headers = ?header_names,
                    body = body.as_deref().unwrap_or(""),
                    "{}",
                    event
                );
            }
            RequestEvent::Received { body, .. } => {
                tracing::debug!(body = %body, "{}", event);
            }
            RequestEvent::Failed { .. } => {
                tracing::debug!("{}", event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_display() {
        let sending = RequestEvent::Sending {
            method: Method::GET,
            url: "https://api.tracker.yandex.net/v2/myself".to_string(),
            header_names: vec!["Authorization".to_string()],
            body: None,
        };
        assert_eq!(
            sending.to_string(),
            "--> GET https://api.tracker.yandex.net/v2/myself"
        );

        let received = RequestEvent::Received {
            method: Method::PATCH,
            url: "https://api.tracker.yandex.net/v2/issues/TEST-1".to_string(),
            status: StatusCode::OK,
            body: "{}".to_string(),
        };
        assert_eq!(
            received.to_string(),
            "<-- 200 PATCH https://api.tracker.yandex.net/v2/issues/TEST-1"
        );
    }

    #[test]
    fn test_failed_event_display() {
        let failed = RequestEvent::Failed {
            method: Method::GET,
            url: "https://api.tracker.yandex.net/v2/myself".to_string(),
            error: "request: connection refused".to_string(),
        };
        assert!(failed.to_string().contains("FAILED"));
        assert!(failed.to_string().ends_with("connection refused"));
    }
}
