//! The `AuthedUser` extractor: bearer-token resolution as a request guard.
//!
//! Any handler that takes an `AuthedUser` argument requires a valid session.
//! Resolution is: parse the `Authorization: Bearer` header, verify the token
//! signature, load the embedded user, and confirm the exact token string is
//! still in that user's session list. Every failure mode is a 401; the
//! extractor never distinguishes them for the client.

use actix_web::dev::Payload;
use actix_web::{http::header, web, Error as ActixError, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;

use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

/// The authenticated caller: the loaded user record plus the raw token that
/// authenticated this request (needed for single-session logout).
#[derive(Debug)]
pub struct AuthedUser {
    pub user: User,
    pub token: String,
}

impl FromRequest for AuthedUser {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let bearer = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::to_owned);

        Box::pin(async move {
            let state = state
                .ok_or_else(|| AppError::Internal("application state not configured".into()))?;
            let token =
                bearer.ok_or_else(|| AppError::Unauthorized("please authenticate".into()))?;
            let user = resolve_token(&state, &token).await?;
            Ok(AuthedUser { user, token })
        })
    }
}

/// Resolves a raw token to its user. Pure lookup, no side effects.
async fn resolve_token(state: &AppState, token: &str) -> Result<User, AppError> {
    let user_id = state.jwt.verify(token)?;
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("please authenticate".into()))?;

    // A signed token for a real user is still worthless once revoked.
    if !user.tokens.iter().any(|t| t == token) {
        return Err(AppError::Unauthorized("please authenticate".into()));
    }
    Ok(user)
}
