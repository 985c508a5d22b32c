/// Access token claims
///
/// The identity fields the backend embeds in an access token payload.
/// Only used to show who is signed in; the backend authorizes every request
/// on its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Identity decoded from an access token
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Claim {
    /// User id; numeric ids are accepted and kept as their decimal string
    #[serde(rename = "userId", deserialize_with = "string_or_number")]
    pub user_id: String,
    pub username: String,
    /// Expiration time (Unix timestamp), when the token carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl Claim {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            exp: None,
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Check if token has expired; tokens without `exp` never do
    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp();
        self.exp.is_some_and(|exp| exp < now)
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(id) => id,
        Id::Number(id) => id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_creation() {
        let claim = Claim::new("42", "alice");

        assert_eq!(claim.user_id, "42");
        assert_eq!(claim.username, "alice");
        assert!(claim.expires_at().is_none());
        assert!(!claim.is_expired());
    }

    #[test]
    fn test_numeric_user_id() {
        let claim: Claim =
            serde_json::from_str(r#"{"userId": 7, "username": "bob"}"#).unwrap();

        assert_eq!(claim.user_id, "7");
        assert_eq!(claim.username, "bob");
    }

    #[test]
    fn test_expiry() {
        let mut claim = Claim::new("1", "carol");
        claim.exp = Some(Utc::now().timestamp() - 60);
        assert!(claim.is_expired());

        claim.exp = Some(Utc::now().timestamp() + 3600);
        assert!(!claim.is_expired());
        assert_eq!(claim.expires_at().map(|t| t.timestamp()), claim.exp);
    }

    #[test]
    fn test_missing_username_is_rejected() {
        let result = serde_json::from_str::<Claim>(r#"{"userId": "1"}"#);
        assert!(result.is_err());
    }
}
