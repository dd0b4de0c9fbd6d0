//! Tracker API client and types.
//!
//! This module provides the interface for communicating with the Yandex
//! Tracker REST API v2.

pub mod auth;
mod client;
pub mod error;
mod logger;
mod transport;
pub mod types;

pub use auth::{Credentials, Organization};
pub use client::{TrackerClient, BASE_URL};
pub use error::ApiError;
pub use logger::{RequestEvent, RequestLogger, TracingLogger};
pub use transport::{ApiRequest, ApiResponse, Headers, HttpTransport, Transport};
pub use types::{
    Comment, CreateIssueOptions, FindIssuesOptions, Issue, ListOptions, Reference, Ticket,
    TicketComments, User,
};
