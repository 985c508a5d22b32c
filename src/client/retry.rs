/// Retry policy for authenticated requests
///
/// Failed attempts are classified first; the orchestration (refresh, wait,
/// replay) lives in the API client and only ever acts on the class.

use std::time::Duration;

use reqwest::StatusCode;

use crate::auth::Session;
use crate::client::transport::RawResponse;
use crate::configuration::{RetrySettings, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY_MS};
use crate::error::{ApiError, ErrorBody, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per call, the first one included
    pub max_attempts: u32,
    /// Fixed wait before replaying a transient failure
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            delay: settings.delay(),
        }
    }
}

impl RetryPolicy {
    /// Whether another attempt may follow attempt number `attempt` (1-based)
    pub fn allows_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

/// Outcome of a failed attempt
#[derive(Debug, Clone)]
pub enum AttemptFailure {
    Status { status: StatusCode, body: ErrorBody },
    Transport(TransportError),
}

impl From<RawResponse> for AttemptFailure {
    fn from(response: RawResponse) -> Self {
        AttemptFailure::Status {
            status: response.status,
            body: ErrorBody::from_bytes(&response.body),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// 401 while signed in: refresh the session, then replay
    AuthorizationExpired,
    /// 401 while anonymous: nothing to refresh
    SessionInvalid,
    /// Any other 4xx
    Validation,
    /// 5xx
    Server,
    /// No usable response: replay after the fixed delay
    Transient,
}

impl FailureClass {
    pub fn is_retryable(self) -> bool {
        matches!(self, FailureClass::AuthorizationExpired | FailureClass::Transient)
    }
}

/// Classify a failed attempt against the session it was sent with
pub fn classify(failure: &AttemptFailure, session: &Session) -> FailureClass {
    match failure {
        AttemptFailure::Status { status, .. } if *status == StatusCode::UNAUTHORIZED => {
            if session.is_anonymous() {
                FailureClass::SessionInvalid
            } else {
                FailureClass::AuthorizationExpired
            }
        }
        AttemptFailure::Status { status, .. } if status.is_client_error() => FailureClass::Validation,
        AttemptFailure::Status { status, .. } if status.is_server_error() => FailureClass::Server,
        AttemptFailure::Status { .. } | AttemptFailure::Transport(_) => FailureClass::Transient,
    }
}

impl AttemptFailure {
    /// The error surfaced to the caller once no more attempts will be made
    pub fn into_error(self, class: FailureClass, attempts: u32) -> ApiError {
        match self {
            AttemptFailure::Status { status, body } => match class {
                FailureClass::AuthorizationExpired | FailureClass::SessionInvalid => {
                    ApiError::SessionInvalid { status, body }
                }
                FailureClass::Validation => ApiError::Validation { status, body },
                FailureClass::Server => ApiError::Server { status, body },
                FailureClass::Transient => ApiError::Transient {
                    attempts,
                    source: TransportError::UnexpectedStatus { status, body },
                },
            },
            AttemptFailure::Transport(source) => ApiError::Transient { attempts, source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn identified() -> Session {
        let access = encode(
            &Header::default(),
            &json!({"userId": "1", "username": "alice"}),
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        Session::from_tokens(&access, "refresh").unwrap()
    }

    fn status(code: u16) -> AttemptFailure {
        AttemptFailure::Status {
            status: StatusCode::from_u16(code).unwrap(),
            body: ErrorBody::from_bytes(b""),
        }
    }

    #[test]
    fn test_unauthorized_depends_on_identity() {
        assert_eq!(
            classify(&status(401), &identified()),
            FailureClass::AuthorizationExpired
        );
        assert_eq!(
            classify(&status(401), &Session::anonymous()),
            FailureClass::SessionInvalid
        );
    }

    #[test]
    fn test_client_and_server_errors_are_final() {
        for code in [400, 403, 404, 409, 422, 429] {
            let class = classify(&status(code), &identified());
            assert_eq!(class, FailureClass::Validation, "status {}", code);
            assert!(!class.is_retryable());
        }
        for code in [500, 502, 503, 504] {
            let class = classify(&status(code), &identified());
            assert_eq!(class, FailureClass::Server, "status {}", code);
            assert!(!class.is_retryable());
        }
    }

    #[test]
    fn test_everything_else_is_transient() {
        let session = Session::anonymous();
        assert_eq!(
            classify(&AttemptFailure::Transport(TransportError::Timeout), &session),
            FailureClass::Transient
        );
        assert_eq!(
            classify(
                &AttemptFailure::Transport(TransportError::Connect("refused".into())),
                &session
            ),
            FailureClass::Transient
        );
        assert_eq!(classify(&status(304), &session), FailureClass::Transient);
    }

    #[test]
    fn test_attempt_budget() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 7);
        assert_eq!(policy.delay, Duration::from_millis(1000));
        assert!(policy.allows_retry(6));
        assert!(!policy.allows_retry(7));
    }

    #[test]
    fn test_policy_from_settings_keeps_one_attempt() {
        let settings = RetrySettings {
            max_attempts: 0,
            delay_ms: 5,
        };
        let policy = RetryPolicy::from(&settings);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.delay, Duration::from_millis(5));
    }

    #[test]
    fn test_into_error_keeps_status_and_body() {
        let failure = AttemptFailure::Status {
            status: StatusCode::BAD_REQUEST,
            body: json!({"text": ["This field may not be blank."]}).into(),
        };
        match failure.into_error(FailureClass::Validation, 1) {
            ApiError::Validation { status, body } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(body.as_json(), &json!({"text": ["This field may not be blank."]}));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_into_error_for_unexpected_status_keeps_body() {
        let failure = AttemptFailure::from(RawResponse::new(
            StatusCode::NOT_MODIFIED,
            br#"{"detail": "cached"}"#.to_vec(),
        ));
        let error = failure.into_error(FailureClass::Transient, 7);

        assert!(matches!(
            &error,
            ApiError::Transient {
                attempts: 7,
                source: TransportError::UnexpectedStatus { .. }
            }
        ));
        assert_eq!(error.status(), Some(StatusCode::NOT_MODIFIED));
        assert_eq!(error.body().and_then(ErrorBody::detail), Some("cached"));
    }

    #[test]
    fn test_into_error_for_exhausted_transient() {
        let error = AttemptFailure::Transport(TransportError::Timeout)
            .into_error(FailureClass::Transient, 7);
        assert!(matches!(
            error,
            ApiError::Transient { attempts: 7, source: TransportError::Timeout }
        ));
    }
}
