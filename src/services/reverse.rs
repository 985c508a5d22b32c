use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::ApiError;

pub const REVERSE_PATH: &str = "/reverse";

/// Request and response share the same shape
#[derive(Debug, Serialize, Deserialize)]
struct ReverseMessage {
    message: String,
}

/// Demo endpoint: the backend returns the message reversed
#[derive(Clone)]
pub struct ReverseService {
    client: Arc<ApiClient>,
}

impl ReverseService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn reverse(&self, message: &str) -> Result<String, ApiError> {
        let request = ReverseMessage {
            message: message.to_string(),
        };
        let response: ReverseMessage = self.client.post(REVERSE_PATH, &request).await?;
        Ok(response.message)
    }
}
