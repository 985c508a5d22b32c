/// Authenticated Request Client
///
/// Every backend call goes through `ApiClient::send`, which attaches the
/// current access token and replays the request when:
/// - the backend answers 401 while the user is signed in (after a refresh)
/// - no usable response came back (after a fixed delay)
///
/// Other failures are returned to the caller on the first attempt.

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::auth::{SessionRefresher, TokenStore};
use crate::client::join_url;
use crate::client::retry::{classify, AttemptFailure, FailureClass, RetryPolicy};
use crate::client::transport::{ApiRequest, RawResponse, Transport};
use crate::error::ApiError;

pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    store: Arc<TokenStore>,
    refresher: Arc<SessionRefresher>,
    policy: RetryPolicy,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        transport: Arc<dyn Transport>,
        store: Arc<TokenStore>,
        refresher: Arc<SessionRefresher>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            base_url: base_url.to_string(),
            transport,
            store,
            refresher,
            policy,
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(Method::GET, path, None).await?.json()
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body).map_err(ApiError::Encode)?;
        self.send(Method::POST, path, Some(body)).await?.json()
    }

    /// POST for writes whose response may be empty; `None` when it is
    pub async fn post_write<B, T>(&self, path: &str, body: &B) -> Result<Option<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body).map_err(ApiError::Encode)?;
        self.send(Method::POST, path, Some(body))
            .await?
            .json_if_present()
    }

    /// Send a request under the retry policy and return the 2xx response
    ///
    /// # Errors
    /// - `SessionInvalid`: 401 while anonymous, or the refresh failed
    /// - `Validation`: other 4xx, body intact
    /// - `Server`: 5xx
    /// - `Transient`: no usable response within the attempt budget
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<RawResponse, ApiError> {
        let request_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!(
            "api_request",
            request_id = %request_id,
            method = %method,
            path = %path,
        );

        let url = join_url(&self.base_url, path);
        let request = ApiRequest::new(method, url).with_body(body);

        self.send_with_retry(request)
            .instrument(span)
            .await
            .map_err(|e| {
                e.log(&request_id);
                e
            })
    }

    async fn send_with_retry(&self, request: ApiRequest) -> Result<RawResponse, ApiError> {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let session = self.store.session();
            let outgoing = request.clone().with_bearer(session.bearer());

            let failure = match self.transport.execute(outgoing).await {
                Ok(response) if response.status.is_success() => {
                    tracing::debug!(
                        attempt = attempt,
                        status = response.status.as_u16(),
                        "Request succeeded"
                    );
                    return Ok(response);
                }
                Ok(response) => AttemptFailure::from(response),
                Err(e) => AttemptFailure::Transport(e),
            };

            let class = classify(&failure, &session);
            tracing::debug!(attempt = attempt, class = ?class, "Attempt failed");

            if !class.is_retryable() || !self.policy.allows_retry(attempt) {
                return Err(failure.into_error(class, attempt));
            }

            match class {
                FailureClass::AuthorizationExpired => {
                    let outcome = self
                        .refresher
                        .refresh_if_stale(session.access_token())
                        .await;
                    if !outcome.is_authenticated() {
                        tracing::info!(outcome = ?outcome, "Session could not be refreshed");
                        return Err(failure.into_error(FailureClass::SessionInvalid, attempt));
                    }
                }
                _ => tokio::time::sleep(self.policy.delay).await,
            }
        }
    }
}
