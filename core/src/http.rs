//! Request description and the transport seam.
//!
//! # Design
//! The engine describes each call as an `ApiRequest` (path plus typed query
//! values) and hands it to a `Transport`, which performs the GET and returns
//! the parsed JSON body. Query values keep their types until the transport
//! renders them for the wire, so a stub transport in tests can assert on
//! `QueryValue::Bool(true)` rather than on `"true"`.
//!
//! The engine never looks at HTTP status codes. A transport that receives a
//! 404 with a JSON body returns that body like any other.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use thiserror::Error;

/// HTTP method for a request. The v1 API is read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
}

/// A single query parameter value, typed as the caller supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Int(u64),
    Bool(bool),
    Date(NaiveDate),
    Text(String),
}

impl QueryValue {
    /// Render the value the way the API expects it in a query string.
    pub fn to_wire_string(&self) -> String {
        match self {
            QueryValue::Int(n) => n.to_string(),
            QueryValue::Bool(b) => b.to_string(),
            QueryValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            QueryValue::Text(s) => s.clone(),
        }
    }
}

impl From<u64> for QueryValue {
    fn from(value: u64) -> Self {
        QueryValue::Int(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl From<NaiveDate> for QueryValue {
    fn from(value: NaiveDate) -> Self {
        QueryValue::Date(value)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Text(value.to_string())
    }
}

/// Wire query parameters keyed by their camelCase API names.
pub type QueryParams = BTreeMap<String, QueryValue>;

/// A GET request described as plain data.
///
/// `path` is relative to the API base (`/clubs/23`); the transport owns the
/// base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: QueryParams,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            query: QueryParams::new(),
        }
    }

    pub fn with_query(mut self, key: &str, value: impl Into<QueryValue>) -> Self {
        self.query.insert(key.to_string(), value.into());
        self
    }

    /// Insert `value` under `key` only when the caller supplied it.
    pub fn with_optional_query<V: Into<QueryValue>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with_query(key, value),
            None => self,
        }
    }
}

/// A failure inside the transport: connection, I/O, or an unparsable body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    retryable: bool,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }

    pub fn non_retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Hint for the transport's own retry policy. The engine never retries.
    pub const fn retryable(&self) -> bool {
        self.retryable
    }
}

/// The capability the engine dispatches through: `GET path?query -> JSON`.
pub trait Transport {
    fn get(&self, request: &ApiRequest) -> Result<serde_json::Value, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, request: &ApiRequest) -> Result<serde_json::Value, TransportError> {
        (**self).get(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn get(&self, request: &ApiRequest) -> Result<serde_json::Value, TransportError> {
        (**self).get(request)
    }
}
