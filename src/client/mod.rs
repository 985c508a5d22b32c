/// HTTP client module
///
/// The transport seam, the retry policy, token exchange requests and the
/// authenticated API client built on top of them.

mod api_client;
pub mod exchange;
pub mod retry;
mod transport;

pub use api_client::ApiClient;
pub use exchange::{exchange_token_pair, TokenPair};
pub use retry::{classify, AttemptFailure, FailureClass, RetryPolicy};
pub use transport::{ApiRequest, HttpTransport, RawResponse, Transport};

/// Join the configured base URL and a resource path with exactly one slash
pub fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
