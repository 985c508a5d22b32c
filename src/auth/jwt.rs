/// Access token decoding
///
/// Reads the claims out of an access token without verifying the signature.
/// The client has no key to verify with and does not need one: decoded
/// values only feed what the client displays.

use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::auth::claims::Claim;
use crate::error::DecodeError;

/// Decode the payload of an access token
///
/// # Errors
/// Returns error if the token does not have three segments, the payload is
/// not base64url-encoded JSON, or `userId`/`username` are missing or empty
pub fn decode_access_token(token: &str) -> Result<Claim, DecodeError> {
    let segments = token.split('.').count();
    if segments != 3 {
        return Err(DecodeError::SegmentCount(segments));
    }

    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let claim = decode::<Claim>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)?;

    if claim.user_id.is_empty() || claim.username.is_empty() {
        return Err(DecodeError::MissingIdentity);
    }

    Ok(claim)
}
