use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::ApiError;

pub const POSTS_PATH: &str = "/posts";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub id: Option<u64>,
    pub text: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Serialize)]
struct NewPost<'a> {
    text: &'a str,
}

#[derive(Clone)]
pub struct PostService {
    client: Arc<ApiClient>,
}

impl PostService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn all_posts(&self) -> Result<Vec<Post>, ApiError> {
        self.client.get(POSTS_PATH).await
    }

    /// Returns the stored post when the backend echoes it back
    pub async fn add_post(&self, text: &str) -> Result<Option<Post>, ApiError> {
        self.client.post_write(POSTS_PATH, &NewPost { text }).await
    }
}
