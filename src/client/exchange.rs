/// Token exchange
///
/// Sign-in, sign-up and session refresh all post a JSON body and get a token
/// pair back. They are sent once, without a bearer token and without the
/// retry policy.

use serde::Deserialize;
use serde_json::Value;

use crate::client::transport::{ApiRequest, Transport};
use crate::error::{ApiError, ErrorBody, TransportError};

/// Token exchange response
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    /// Absent when the backend does not rotate refresh tokens
    #[serde(default)]
    pub refresh: String,
}

/// Post `body` to `url` and parse the token pair from a 2xx response
///
/// # Errors
/// - `Validation` for any 4xx (including 401: bad credentials or a stale
///   refresh token)
/// - `Server` for 5xx
/// - `Transient` when no usable response came back
/// - `InvalidResponse` when a 2xx body is not a token pair
pub async fn exchange_token_pair(
    transport: &dyn Transport,
    url: String,
    body: Value,
) -> Result<TokenPair, ApiError> {
    let response = transport
        .execute(ApiRequest::post_json(url, body))
        .await
        .map_err(|source| ApiError::Transient {
            attempts: 1,
            source,
        })?;

    if response.status.is_success() {
        return response.json();
    }

    let status = response.status;
    let body = ErrorBody::from_bytes(&response.body);
    Err(if status.is_client_error() {
        ApiError::Validation { status, body }
    } else if status.is_server_error() {
        ApiError::Server { status, body }
    } else {
        ApiError::Transient {
            attempts: 1,
            source: TransportError::UnexpectedStatus { status, body },
        }
    })
}
