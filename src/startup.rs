use std::sync::Arc;

use crate::auth::{
    AccountService, FileStorage, RefreshOutcome, RefreshTokenStorage, SessionRefresher, TokenStore,
};
use crate::client::{ApiClient, HttpTransport, RetryPolicy, Transport};
use crate::configuration::Settings;
use crate::error::AppError;
use crate::services::{PostService, ReverseService, UserService};

/// Everything one running client needs, wired around a single session
pub struct Application {
    pub store: Arc<TokenStore>,
    pub refresher: Arc<SessionRefresher>,
    pub api: Arc<ApiClient>,
    pub accounts: AccountService,
    pub users: UserService,
    pub posts: PostService,
    pub reverse: ReverseService,
}

impl Application {
    /// Build the production application: reqwest transport, file storage
    ///
    /// # Errors
    /// Returns error if the http client cannot be built
    pub fn build(settings: &Settings) -> Result<Self, AppError> {
        let transport = Arc::new(HttpTransport::new(settings.api.request_timeout())?);
        let storage = Arc::new(FileStorage::new(&settings.storage.directory));
        Ok(Self::with_parts(settings, transport, storage))
    }

    pub fn with_parts(
        settings: &Settings,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn RefreshTokenStorage>,
    ) -> Self {
        let base_url = settings.api.base_url.as_str();
        let store = Arc::new(TokenStore::new(storage));
        let refresher = Arc::new(SessionRefresher::new(
            store.clone(),
            transport.clone(),
            base_url,
        ));
        let api = Arc::new(ApiClient::new(
            base_url,
            transport.clone(),
            store.clone(),
            refresher.clone(),
            RetryPolicy::from(&settings.retry),
        ));

        Self {
            accounts: AccountService::new(store.clone(), transport, base_url),
            users: UserService::new(api.clone()),
            posts: PostService::new(api.clone()),
            reverse: ReverseService::new(api.clone()),
            store,
            refresher,
            api,
        }
    }

    /// Restore the session from the persisted refresh token, if any.
    /// Resolves once the session is settled either way.
    pub async fn bootstrap(&self) -> RefreshOutcome {
        let outcome = self.refresher.refresh().await;
        tracing::info!(outcome = ?outcome, "Session bootstrap complete");
        outcome
    }
}
