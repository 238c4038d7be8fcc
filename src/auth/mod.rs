//! Authentication: credential checks, session-token issuance and revocation.
//!
//! A session is one entry in the user's `tokens` list. Logins append, logouts
//! remove, and a token authenticates only while its exact string is still in
//! the list, so every session op persists the user record it mutates.

pub mod extractors;
pub mod password;
pub mod token;

use chrono::Utc;
use serde::{Deserialize, Serialize};

pub use extractors::AuthedUser;
pub use password::{hash_password, verify_password};
pub use token::JwtKeys;

use crate::error::AppError;
use crate::models::{User, UserProfile};
use crate::store::UserStore;

/// Login payload.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Body of a successful registration: the new profile plus its first token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserProfile,
    pub token: String,
}

/// Body of a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Looks a user up by email and checks the password against the stored hash.
///
/// Both "no such email" and "wrong password" fail with the same generic
/// `InvalidCredentials`, so the endpoint cannot be used to enumerate users.
pub async fn authenticate(
    users: &dyn UserStore,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let email = email.trim().to_lowercase();
    let user = users
        .find_by_email(&email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }
    Ok(user)
}

/// Mints a new session token, appends it to the user's session list, and
/// persists the user. Each call adds a session; prior tokens stay valid.
pub async fn issue_token(
    jwt: &JwtKeys,
    users: &dyn UserStore,
    user: &mut User,
) -> Result<String, AppError> {
    let token = jwt.sign(user.id)?;
    user.tokens.push(token.clone());
    user.updated_at = Utc::now();
    users.update(user).await?;
    Ok(token)
}

/// Removes exactly the presented token (single-session logout).
pub async fn revoke_token(
    users: &dyn UserStore,
    user: &mut User,
    raw_token: &str,
) -> Result<(), AppError> {
    user.tokens.retain(|t| t != raw_token);
    user.updated_at = Utc::now();
    users.update(user).await
}

/// Empties the session list (logout everywhere).
pub async fn revoke_all_tokens(users: &dyn UserStore, user: &mut User) -> Result<(), AppError> {
    user.tokens.clear();
    user.updated_at = Utc::now();
    users.update(user).await
}
