/// Authentication module
///
/// Handles access token decoding, the session store and its persisted
/// refresh token, the silent refresh flow, and sign-in/sign-up/sign-out.

mod account;
mod claims;
mod jwt;
mod refresh;
mod session;
mod storage;
mod token_store;

pub use account::{AccountService, SignUpForm, SIGN_IN_PATH, SIGN_UP_PATH};
pub use claims::Claim;
pub use jwt::decode_access_token;
pub use refresh::{RefreshOutcome, SessionRefresher, REFRESH_PATH};
pub use session::Session;
pub use storage::{FileStorage, MemoryStorage, RefreshTokenStorage, REFRESH_TOKEN_KEY};
pub use token_store::TokenStore;
