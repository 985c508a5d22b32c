/// Account operations that change who is signed in
///
/// Sign-in and sign-up exchange credentials for a token pair and store it;
/// sign-out forgets the session.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::auth::session::Session;
use crate::auth::token_store::TokenStore;
use crate::client::exchange::exchange_token_pair;
use crate::client::join_url;
use crate::client::Transport;
use crate::error::{ApiError, StorageError};

pub const SIGN_IN_PATH: &str = "/auth/token";
pub const SIGN_UP_PATH: &str = "/account/signup";

/// Registration form
#[derive(Debug, Clone, Default, Serialize)]
pub struct SignUpForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
    pub agreement: bool,
}

#[derive(Clone)]
pub struct AccountService {
    store: Arc<TokenStore>,
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl AccountService {
    pub fn new(store: Arc<TokenStore>, transport: Arc<dyn Transport>, base_url: &str) -> Self {
        Self {
            store,
            transport,
            base_url: base_url.to_string(),
        }
    }

    /// POST /auth/token
    ///
    /// # Errors
    /// - `Validation`: credentials rejected
    /// - `Session`: the returned access token could not be decoded or stored
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<Session, ApiError> {
        let pair = exchange_token_pair(
            self.transport.as_ref(),
            join_url(&self.base_url, SIGN_IN_PATH),
            json!({ "username": username, "password": password }),
        )
        .await
        .map_err(|e| {
            tracing::warn!(username = %username, error = %e, "Sign in failed");
            e
        })?;

        Ok(self.store.set_session(&pair.access, &pair.refresh)?)
    }

    /// POST /account/signup; a successful registration signs the user in
    ///
    /// # Errors
    /// - `Validation`: field errors for the form
    /// - `Session`: the returned access token could not be decoded or stored
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<Session, ApiError> {
        let body = serde_json::to_value(form).map_err(ApiError::Encode)?;
        let pair = exchange_token_pair(
            self.transport.as_ref(),
            join_url(&self.base_url, SIGN_UP_PATH),
            body,
        )
        .await
        .map_err(|e| {
            tracing::warn!(username = %form.username, error = %e, "Sign up failed");
            e
        })?;

        tracing::info!(username = %form.username, "Account created");
        Ok(self.store.set_session(&pair.access, &pair.refresh)?)
    }

    /// # Errors
    /// Returns error if the persisted refresh token could not be removed;
    /// the in-memory session is anonymous either way
    pub fn sign_out(&self) -> Result<(), StorageError> {
        self.store.clear_session()
    }

    pub fn session(&self) -> Session {
        self.store.session()
    }
}
