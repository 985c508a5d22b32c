//! Client-side session and request plumbing for the account service.
//!
//! The crate keeps the signed-in user's token pair, refreshes it silently when
//! the backend reports an expired access token, and exposes typed services for
//! the account, profile, feed and reverse endpoints.

pub mod auth;
pub mod client;
pub mod configuration;
pub mod error;
pub mod field_errors;
pub mod services;
pub mod startup;
pub mod telemetry;

pub use auth::{Claim, RefreshOutcome, Session, TokenStore};
pub use client::{ApiClient, HttpTransport, RetryPolicy, Transport};
pub use error::{ApiError, AppError};
pub use startup::Application;
