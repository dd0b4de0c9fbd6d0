//! Centralized error types for the ytrack binary.
//!
//! This module aggregates configuration, API and keyring errors with
//! user-friendly messages. All error types use `thiserror`.

use thiserror::Error;

use crate::api::auth::KeyringError;
use crate::api::ApiError;
use crate::config::ConfigError;

/// The main application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// API-related errors.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Token storage errors.
    #[error("{0}")]
    Keyring(#[from] KeyringError),

    /// IO errors (stdout, browser launch, etc.).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid command-line input.
    #[error("{0}")]
    Usage(String),
}

impl AppError {
    /// Create a usage error.
    pub fn usage(msg: impl Into<String>) -> Self {
        AppError::Usage(msg.into())
    }

    /// Get a user-friendly message for display.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => match e {
                ConfigError::NoConfigDir => {
                    "Could not find configuration directory. Please check your system settings."
                        .to_string()
                }
                ConfigError::ProfileNotFound(name) => format!("Profile '{}' not found.", name),
                ConfigError::NoProfile => "No profile selected.".to_string(),
                other => format!("Configuration error: {}", other),
            },
            AppError::Api(e) => match e {
                ApiError::Request(_) => {
                    "Connection failed. Please check your internet connection.".to_string()
                }
                ApiError::UnexpectedStatus { status, body, .. } => {
                    if e.is_unauthorized() {
                        "Authentication failed. Please check your token and organization ID."
                            .to_string()
                    } else if e.is_not_found() {
                        "The requested issue was not found.".to_string()
                    } else {
                        format!("Tracker returned HTTP {}: {}", status.as_u16(), body)
                    }
                }
                ApiError::Decode(_) => {
                    "Unexpected response from Tracker. Please try again.".to_string()
                }
            },
            AppError::Keyring(_) => {
                "Could not access secure storage. Run 'ytrack auth login' again.".to_string()
            }
            AppError::Io(_) => "An IO operation failed.".to_string(),
            AppError::Usage(msg) => msg.clone(),
        }
    }

    /// Get a suggested action for the user.
    pub fn suggested_action(&self) -> Option<&'static str> {
        match self {
            AppError::Config(ConfigError::NoProfile)
            | AppError::Config(ConfigError::ProfileNotFound(_)) => {
                Some("Run 'ytrack profile add <name> --org-id <id>' to create a profile.")
            }
            AppError::Api(e) if e.is_unauthorized() => {
                Some("Get a new OAuth token at https://oauth.yandex.ru and run 'ytrack auth login'.")
            }
            AppError::Keyring(_) => Some("Alternatively set the YTRACK_TOKEN environment variable."),
            _ => None,
        }
    }
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;
