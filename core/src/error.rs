//! Error types for the Strava client.
//!
//! # Design
//! Callers get exactly two kinds of failure. `Command` means the call could
//! not be made: the arguments failed local validation, or the transport
//! failed. `InvalidResponse` means the API answered with an `error` field (or
//! with a payload that could not be mapped); its message is also appended to
//! the client's error log.

use thiserror::Error;

use crate::http::TransportError;

/// Errors returned by `StravaClient` operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    #[error("command failed: {0}")]
    Command(#[from] CommandError),

    /// The API reported an error, or the payload was unusable.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    pub fn is_command(&self) -> bool {
        matches!(self, ClientError::Command(_))
    }

    pub fn is_invalid_response(&self) -> bool {
        matches!(self, ClientError::InvalidResponse(_))
    }
}

/// Reasons a call could not be made.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("{operation}: search string must not be blank")]
    BlankQuery { operation: &'static str },

    #[error("{operation}: at least one of {expected} is required")]
    MissingFilter {
        operation: &'static str,
        expected: &'static str,
    },

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),
}

/// Errors raised while loading `ClientConfig` from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{name} must be a whole number of seconds, got '{value}'")]
    InvalidTimeout { name: &'static str, value: String },

    #[error("{name} must not be empty")]
    EmptyBaseUrl { name: &'static str },
}
