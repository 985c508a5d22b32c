//! Error handling for the account client
//!
//! This module covers:
//! 1. Domain-specific error types (token decoding, storage, transport)
//! 2. The request error surfaced to callers of the API client
//! 3. The unified application error used by the binary
//! 4. Structured error logging with request context

use std::path::PathBuf;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::field_errors::FieldErrors;

// ============================================================================
// 1. DOMAIN-SPECIFIC ERROR TYPES
// ============================================================================

/// The access token could not be turned into a claim.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("token must have 3 dot-separated segments, found {0}")]
    SegmentCount(usize),
    #[error("token payload could not be decoded: {0}")]
    Payload(#[from] jsonwebtoken::errors::Error),
    #[error("token payload does not identify a user")]
    MissingIdentity,
}

/// Durable refresh token slot errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read refresh token from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write refresh token to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to remove refresh token at {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Storing a freshly exchanged token pair failed.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A request never produced a usable HTTP response.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    /// A status outside 2xx/4xx/5xx; the body is kept for the caller
    #[error("unexpected response status {status}")]
    UnexpectedStatus { status: StatusCode, body: ErrorBody },
    #[error("transport error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

// ============================================================================
// 2. REQUEST ERRORS
// ============================================================================

/// Body of a failed response.
///
/// Kept as JSON so callers can pull out field errors or a `detail` message.
/// Bodies that are not JSON are wrapped as a JSON string.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorBody(Value);

impl ErrorBody {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self(Value::Null);
        }
        let value = serde_json::from_slice(bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()));
        Self(value)
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn field_errors(&self) -> FieldErrors {
        FieldErrors::from_json(&self.0)
    }

    /// The `detail` message some endpoints return instead of field errors
    pub fn detail(&self) -> Option<&str> {
        self.0.get("detail").and_then(Value::as_str)
    }
}

impl From<Value> for ErrorBody {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Error returned by every backend call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The session could not be recovered: the user has to sign in again.
    #[error("session is no longer valid (status {status})")]
    SessionInvalid { status: StatusCode, body: ErrorBody },

    /// 4xx other than an authorization failure; body carries field errors.
    #[error("request rejected with status {status}")]
    Validation { status: StatusCode, body: ErrorBody },

    #[error("server failed with status {status}")]
    Server { status: StatusCode, body: ErrorBody },

    #[error("request failed after {attempts} attempt(s): {source}")]
    Transient {
        attempts: u32,
        #[source]
        source: TransportError,
    },

    #[error("unexpected response body: {0}")]
    InvalidResponse(#[source] serde_json::Error),

    #[error("request body could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::SessionInvalid { status, .. }
            | ApiError::Validation { status, .. }
            | ApiError::Server { status, .. }
            | ApiError::Transient {
                source: TransportError::UnexpectedStatus { status, .. },
                ..
            } => Some(*status),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&ErrorBody> {
        match self {
            ApiError::SessionInvalid { body, .. }
            | ApiError::Validation { body, .. }
            | ApiError::Server { body, .. }
            | ApiError::Transient {
                source: TransportError::UnexpectedStatus { body, .. },
                ..
            } => Some(body),
            _ => None,
        }
    }

    /// Field errors to show next to form inputs; empty unless the backend
    /// rejected the request as invalid.
    pub fn field_errors(&self) -> FieldErrors {
        match self {
            ApiError::Validation { body, .. } => body.field_errors(),
            _ => FieldErrors::default(),
        }
    }

    pub fn is_session_invalid(&self) -> bool {
        matches!(self, ApiError::SessionInvalid { .. })
    }

    /// Message for the user, independent of the form fields
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation { body, .. } => body
                .detail()
                .unwrap_or("The request was rejected, please check your input")
                .to_string(),
            ApiError::SessionInvalid { .. } => "Please sign in to continue".to_string(),
            _ => "Something went wrong".to_string(),
        }
    }

    /// Log the error at a level matching its class.
    pub fn log(&self, request_id: &str) {
        match self {
            ApiError::Validation { status, .. } => {
                tracing::info!(
                    request_id = request_id,
                    status = status.as_u16(),
                    "Request rejected by backend"
                );
            }
            ApiError::SessionInvalid { status, .. } => {
                tracing::warn!(
                    request_id = request_id,
                    status = status.as_u16(),
                    "Session invalid, sign in required"
                );
            }
            ApiError::Server { status, .. } => {
                tracing::error!(
                    request_id = request_id,
                    status = status.as_u16(),
                    "Backend server error"
                );
            }
            ApiError::Transient { attempts, source } => {
                tracing::error!(
                    request_id = request_id,
                    attempts = attempts,
                    error = %source,
                    "Request failed after retries"
                );
            }
            ApiError::InvalidResponse(e) | ApiError::Encode(e) => {
                tracing::error!(request_id = request_id, error = %e, "Malformed payload");
            }
            ApiError::Session(e) => {
                tracing::error!(request_id = request_id, error = %e, "Failed to store session");
            }
        }
    }
}

// ============================================================================
// 3. UNIFIED APPLICATION ERROR TYPE
// ============================================================================

/// Central error type for the binary
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to build http client: {0}")]
    Transport(#[from] TransportError),
    #[error("please sign in first")]
    SignInRequired,
    #[error("{0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_body_parses_json() {
        let body = ErrorBody::from_bytes(br#"{"detail": "Not found."}"#);
        assert_eq!(body.detail(), Some("Not found."));
    }

    #[test]
    fn test_error_body_wraps_plain_text() {
        let body = ErrorBody::from_bytes(b"Bad Gateway");
        assert_eq!(body.as_json(), &json!("Bad Gateway"));
        assert!(body.detail().is_none());
    }

    #[test]
    fn test_error_body_empty_is_null() {
        let body = ErrorBody::from_bytes(b"");
        assert_eq!(body.as_json(), &Value::Null);
        assert!(body.field_errors().is_empty());
    }

    #[test]
    fn test_validation_error_exposes_field_errors() {
        let err = ApiError::Validation {
            status: StatusCode::BAD_REQUEST,
            body: json!({"username": ["This field is required."]}).into(),
        };
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(
            err.field_errors().get("username"),
            ["This field is required.".to_string()]
        );
    }

    #[test]
    fn test_server_error_hides_field_errors() {
        let err = ApiError::Server {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: json!({"username": ["ignored"]}).into(),
        };
        assert!(err.field_errors().is_empty());
        assert_eq!(err.user_message(), "Something went wrong");
    }

    #[test]
    fn test_user_messages() {
        let invalid = ApiError::SessionInvalid {
            status: StatusCode::UNAUTHORIZED,
            body: ErrorBody::from_bytes(b""),
        };
        assert!(invalid.is_session_invalid());
        assert_eq!(invalid.user_message(), "Please sign in to continue");

        let rejected = ApiError::Validation {
            status: StatusCode::BAD_REQUEST,
            body: json!({"detail": "Message is too long"}).into(),
        };
        assert_eq!(rejected.user_message(), "Message is too long");

        let transient = ApiError::Transient {
            attempts: 7,
            source: TransportError::Timeout,
        };
        assert_eq!(transient.user_message(), "Something went wrong");
        assert!(transient.body().is_none());
    }
}
