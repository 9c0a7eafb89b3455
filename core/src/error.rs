//! Error types for the ArangoDB client.
//!
//! # Design
//! Four failure kinds never collapse into one another:
//! - `Transport`: no HTTP response was received at all.
//! - `Api`: the server answered with a non-2xx status. The body is decoded
//!   into an [`ApiError`], or one is synthesized from the status when the
//!   body is not an error object.
//! - `Decode`: a response arrived but its body did not have the expected
//!   shape.
//! - `InvalidArgument` / `Serialization` / `Config`: caller-side problems
//!   detected before anything is sent.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Server error numbers that callers commonly branch on.
pub mod codes {
    pub const FORBIDDEN: i32 = 11;
    pub const HTTP_UNAUTHORIZED: i32 = 401;
    pub const CORRUPTED_JSON: i32 = 600;
    pub const DOCUMENT_NOT_FOUND: i32 = 1202;
    pub const DATA_SOURCE_NOT_FOUND: i32 = 1203;
    pub const DUPLICATE_NAME: i32 = 1207;
    pub const ILLEGAL_NAME: i32 = 1208;
    pub const UNIQUE_CONSTRAINT_VIOLATED: i32 = 1210;
    pub const DATABASE_NOT_FOUND: i32 = 1228;
    pub const DATABASE_NAME_INVALID: i32 = 1229;
    pub const USE_SYSTEM_DATABASE: i32 = 1230;
    pub const QUERY_PARSE: i32 = 1501;
    pub const CURSOR_NOT_FOUND: i32 = 1600;
    pub const GRAPH_NOT_FOUND: i32 = 1924;
    pub const GRAPH_DUPLICATE: i32 = 1925;
    pub const VERTEX_COLLECTION_NOT_USED: i32 = 1947;
}

/// Structured failure reported by the server.
///
/// Field names follow the server's error body
/// (`{ error, errorNum, errorMessage, code }`); `code` is the HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("server error {error_num} (HTTP {code}): {error_message}")]
pub struct ApiError {
    pub error: bool,
    pub error_num: i32,
    pub error_message: String,
    pub code: u16,
}

impl ApiError {
    /// Builds the error reported for a failed response whose body carried
    /// no usable error object. `error_num` is 0 in that case.
    pub fn synthesized(status: u16, message: impl Into<String>) -> Self {
        Self {
            error: true,
            error_num: 0,
            error_message: message.into(),
            code: status,
        }
    }

    pub fn is_synthesized(&self) -> bool {
        self.error_num == 0
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self.error_num,
            codes::DOCUMENT_NOT_FOUND | codes::DATA_SOURCE_NOT_FOUND | codes::DATABASE_NOT_FOUND
        ) || self.code == 404
    }

    pub fn is_duplicate_name(&self) -> bool {
        self.error_num == codes::DUPLICATE_NAME
    }

    pub fn is_illegal_name(&self) -> bool {
        self.error_num == codes::ILLEGAL_NAME
    }
}

/// Failure below HTTP: the request never produced a response.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("could not connect: {0}")]
    Connect(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("could not read response body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_body() || err.is_decode() {
            TransportError::Body(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

/// Errors returned by every resource client operation.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No HTTP response was received.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The server rejected the request.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The response body could not be decoded into the expected type.
    #[error("could not decode response (HTTP {status}): {message}")]
    Decode { status: u16, message: String },

    /// The request payload could not be serialized.
    #[error("could not serialize request: {0}")]
    Serialization(String),

    /// A required identifying parameter was missing or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ClientError::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Server error number, when the failure came from the server.
    pub fn error_num(&self) -> Option<i32> {
        self.api_error().map(|err| err.error_num)
    }

    /// HTTP status of the response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api(err) => Some(err.code),
            ClientError::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
