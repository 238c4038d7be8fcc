//! Session-token signing and verification.
//!
//! Tokens are HS256 JWTs naming the owning user. They encode no expiry: a
//! token stays valid exactly as long as it remains in its owner's session
//! list, so revocation (logout) is the sole invalidation mechanism.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Claims embedded in a session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// The user id this token authenticates.
    pub sub: Uuid,
    /// Issue time, seconds since epoch. Informational only.
    pub iat: i64,
    /// Unique token id. Without it, two logins in the same second would mint
    /// byte-identical tokens and single-session logout would revoke both.
    pub jti: Uuid,
}

/// Signing and verification keys, built once from the configured secret and
/// dependency-injected into the app state.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtKeys {
    pub fn from_secret(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // No expiry claim on purpose; see module docs.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Mints a token naming `user_id`. The caller is responsible for
    /// appending it to the user's session list and persisting the user.
    pub fn sign(&self, user_id: Uuid) -> Result<String, AppError> {
        let claims = Claims {
            sub: user_id,
            iat: chrono::Utc::now().timestamp(),
            jti: Uuid::new_v4(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("failed to sign token: {}", e)))
    }

    /// Verifies the signature and returns the embedded user id. This alone
    /// does not authenticate a request: the token must also still be present
    /// in that user's session list.
    pub fn verify(&self, token: &str) -> Result<Uuid, AppError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims.sub)
    }
}
