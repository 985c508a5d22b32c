/// Session Refresh Flow
///
/// Exchanges the persisted refresh token for a new token pair:
/// - no persisted token: clear the session, no network call
/// - exchange succeeds: store the new pair
/// - anything fails: clear the session
///
/// The returned future resolves exactly once on every branch. Refreshes are
/// serialized, and a refresh requested because of a rejected access token is
/// skipped when the session already moved on.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::Mutex;

use crate::auth::token_store::TokenStore;
use crate::client::exchange::exchange_token_pair;
use crate::client::Transport;
use crate::client::join_url;

pub const REFRESH_PATH: &str = "/auth/token/refresh";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new token pair is in the store
    Refreshed,
    /// Nothing was persisted; the session is anonymous
    NoRefreshToken,
    /// The exchange failed; the session was cleared
    Rejected,
}

impl RefreshOutcome {
    pub fn is_authenticated(self) -> bool {
        self == RefreshOutcome::Refreshed
    }
}

pub struct SessionRefresher {
    store: Arc<TokenStore>,
    transport: Arc<dyn Transport>,
    refresh_url: String,
    in_flight: Mutex<()>,
}

impl SessionRefresher {
    pub fn new(store: Arc<TokenStore>, transport: Arc<dyn Transport>, base_url: &str) -> Self {
        Self {
            store,
            transport,
            refresh_url: join_url(base_url, REFRESH_PATH),
            in_flight: Mutex::new(()),
        }
    }

    /// Refresh unconditionally (application start)
    pub async fn refresh(&self) -> RefreshOutcome {
        let _guard = self.in_flight.lock().await;
        self.exchange().await
    }

    /// Refresh after the backend rejected `rejected_access_token`
    ///
    /// If another caller already replaced or cleared that token while this
    /// one waited, no exchange is made and the current session decides the
    /// outcome.
    pub async fn refresh_if_stale(&self, rejected_access_token: &str) -> RefreshOutcome {
        let _guard = self.in_flight.lock().await;

        let current = self.store.session();
        if current.access_token() != rejected_access_token {
            tracing::debug!("Session changed while waiting, skipping refresh");
            return if current.is_anonymous() {
                RefreshOutcome::Rejected
            } else {
                RefreshOutcome::Refreshed
            };
        }

        self.exchange().await
    }

    // The store logs a failed removal; the outcome is the same either way.
    fn discard_session(&self) {
        let _ = self.store.clear_session();
    }

    async fn exchange(&self) -> RefreshOutcome {
        let refresh = match self.store.stored_refresh_token() {
            Ok(Some(token)) => token,
            Ok(None) => {
                tracing::debug!("No persisted refresh token");
                self.discard_session();
                return RefreshOutcome::NoRefreshToken;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted refresh token");
                self.discard_session();
                return RefreshOutcome::NoRefreshToken;
            }
        };

        let pair = match exchange_token_pair(
            self.transport.as_ref(),
            self.refresh_url.clone(),
            json!({ "refresh": refresh }),
        )
        .await
        {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed, clearing session");
                self.discard_session();
                return RefreshOutcome::Rejected;
            }
        };

        match self.store.set_session(&pair.access, &pair.refresh) {
            Ok(_) => {
                tracing::debug!("Session refreshed");
                RefreshOutcome::Refreshed
            }
            Err(e) => {
                tracing::warn!(error = %e, "Refreshed tokens could not be stored, clearing session");
                self.discard_session();
                RefreshOutcome::Rejected
            }
        }
    }
}
