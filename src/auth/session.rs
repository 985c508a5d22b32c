/// Session state
///
/// The signed-in user's token pair together with the identity decoded from
/// the access token. A session is either anonymous or built from a token
/// pair, so the access token is non-empty exactly when the identity is set.

use crate::auth::claims::Claim;
use crate::auth::jwt::decode_access_token;
use crate::error::DecodeError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Claim,
    access_token: String,
    refresh_token: String,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Build a session from a token exchange response
    ///
    /// # Errors
    /// Returns error if the access token cannot be decoded
    pub fn from_tokens(access: &str, refresh: &str) -> Result<Self, DecodeError> {
        let user = decode_access_token(access)?;
        Ok(Self {
            user,
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
        })
    }

    pub fn user(&self) -> &Claim {
        &self.user
    }

    pub fn user_id(&self) -> &str {
        &self.user.user_id
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Refresh token received with the access token; empty when the last
    /// exchange did not rotate it
    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub fn is_anonymous(&self) -> bool {
        self.user.username.is_empty()
    }

    /// Token to send as the bearer credential, if any
    pub fn bearer(&self) -> Option<&str> {
        (!self.access_token.is_empty()).then_some(self.access_token.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn access_token(user_id: &str, username: &str) -> String {
        encode(
            &Header::default(),
            &json!({"userId": user_id, "username": username}),
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_anonymous_session() {
        let session = Session::anonymous();

        assert!(session.is_anonymous());
        assert!(session.bearer().is_none());
        assert_eq!(session.user_id(), "");
        assert_eq!(session.refresh_token(), "");
    }

    #[test]
    fn test_session_from_tokens() {
        let access = access_token("5", "dave");
        let session = Session::from_tokens(&access, "refresh-1").unwrap();

        assert!(!session.is_anonymous());
        assert_eq!(session.user_id(), "5");
        assert_eq!(session.username(), "dave");
        assert_eq!(session.bearer(), Some(access.as_str()));
        assert_eq!(session.refresh_token(), "refresh-1");
        assert_eq!(session.user(), &decode_access_token(&access).unwrap());
    }

    #[test]
    fn test_session_from_malformed_token() {
        assert!(Session::from_tokens("garbage", "refresh-1").is_err());
    }
}
