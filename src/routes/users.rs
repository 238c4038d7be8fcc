//! User lifecycle handlers: registration, sessions, profile, avatar.

use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::{self, AuthResponse, AuthedUser, LoginRequest, TokenResponse};
use crate::error::AppError;
use crate::models::user::{validate_age, validate_email, validate_name, validate_password};
use crate::models::{RegisterInput, User, UserPatch};
use crate::notify::{spawn_cancellation, spawn_welcome};
use crate::state::AppState;

/// Largest accepted avatar upload, in bytes.
const MAX_AVATAR_BYTES: usize = 1_000_000;

/// Register a new user.
///
/// Validates all fields (reporting every violation at once), hashes the
/// password, persists the user, issues the first session token, and fires a
/// best-effort welcome email.
#[post("")]
pub async fn register(
    state: web::Data<AppState>,
    input: web::Json<RegisterInput>,
) -> Result<impl Responder, AppError> {
    let valid = input.into_inner().validated()?;

    if state.users.find_by_email(&valid.email).await?.is_some() {
        return Err(AppError::Validation("email already in use".into()));
    }

    let password_hash = auth::hash_password(&valid.password)?;
    let mut user = User::new(valid.name, valid.email, password_hash, valid.age);
    state.users.insert(&user).await?;
    let token = auth::issue_token(&state.jwt, state.users.as_ref(), &mut user).await?;

    spawn_welcome(state.notifier.clone(), user.email.clone(), user.name.clone());

    Ok(HttpResponse::Created().json(AuthResponse {
        user: user.profile(),
        token,
    }))
}

/// Log in. Every login creates an additional session token; prior sessions
/// stay valid.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    input: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let mut user = auth::authenticate(state.users.as_ref(), &input.email, &input.password).await?;
    let token = auth::issue_token(&state.jwt, state.users.as_ref(), &mut user).await?;
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// Log out the presenting session only.
#[post("/logout")]
pub async fn logout(
    state: web::Data<AppState>,
    caller: AuthedUser,
) -> Result<impl Responder, AppError> {
    let AuthedUser { mut user, token } = caller;
    auth::revoke_token(state.users.as_ref(), &mut user, &token).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Log out everywhere: clears the whole session list.
#[post("/logoutAll")]
pub async fn logout_all(
    state: web::Data<AppState>,
    caller: AuthedUser,
) -> Result<impl Responder, AppError> {
    let AuthedUser { mut user, .. } = caller;
    auth::revoke_all_tokens(state.users.as_ref(), &mut user).await?;
    Ok(HttpResponse::Ok().finish())
}

/// The authenticated caller's own profile, never anyone else's.
#[get("/me")]
pub async fn me(caller: AuthedUser) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(caller.user.profile()))
}

/// Patch the caller's profile. The allow-list is {name, email, password,
/// age}; anything else fails deserialization with a 400. A changed password
/// goes through the same validation and hashing as at registration.
#[patch("/me")]
pub async fn update_me(
    state: web::Data<AppState>,
    caller: AuthedUser,
    patch: web::Json<UserPatch>,
) -> Result<impl Responder, AppError> {
    let mut user = caller.user;
    let patch = patch.into_inner();

    if patch.is_empty() {
        return Ok(HttpResponse::Ok().json(user.profile()));
    }

    let mut violations = Vec::new();

    if let Some(name) = &patch.name {
        match validate_name(name) {
            Ok(name) => user.name = name,
            Err(e) => violations.push(e),
        }
    }
    if let Some(email) = &patch.email {
        match validate_email(email) {
            Ok(email) => {
                if email != user.email {
                    if state.users.find_by_email(&email).await?.is_some() {
                        violations.push("email already in use".into());
                    } else {
                        user.email = email;
                    }
                }
            }
            Err(e) => violations.push(e),
        }
    }
    if let Some(password) = &patch.password {
        match validate_password(password) {
            // Explicit re-hash: a changed password is never stored raw.
            Ok(password) => user.password_hash = auth::hash_password(&password)?,
            Err(e) => violations.push(e),
        }
    }
    if let Some(age) = patch.age {
        match validate_age(age) {
            Ok(age) => user.age = age,
            Err(e) => violations.push(e),
        }
    }

    if !violations.is_empty() {
        return Err(AppError::Validation(violations.join("; ")));
    }

    user.updated_at = Utc::now();
    state.users.update(&user).await?;
    Ok(HttpResponse::Ok().json(user.profile()))
}

/// Delete the caller's account. The caller's tasks are deleted first, then
/// the user record (explicit cascade, not atomic), and a best-effort
/// cancellation email is fired.
#[delete("/me")]
pub async fn delete_me(
    state: web::Data<AppState>,
    caller: AuthedUser,
) -> Result<impl Responder, AppError> {
    let user = caller.user;

    let removed = state.tasks.delete_all_for_owner(user.id).await?;
    log::info!("cascade-deleted {} task(s) for user {}", removed, user.id);
    state.users.delete(user.id).await?;

    spawn_cancellation(state.notifier.clone(), user.email.clone(), user.name.clone());

    Ok(HttpResponse::Ok().json(user.profile()))
}

/// Attach an avatar image to the caller's profile. The body is the raw image
/// bytes; only JPEG and PNG up to 1 MB are accepted.
#[post("/me/avatar")]
pub async fn upload_avatar(
    state: web::Data<AppState>,
    caller: AuthedUser,
    bytes: web::Bytes,
) -> Result<impl Responder, AppError> {
    validate_avatar(&bytes)?;

    let mut user = caller.user;
    user.avatar = Some(bytes.to_vec());
    user.updated_at = Utc::now();
    state.users.update(&user).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Remove the caller's avatar.
#[delete("/me/avatar")]
pub async fn delete_avatar(
    state: web::Data<AppState>,
    caller: AuthedUser,
) -> Result<impl Responder, AppError> {
    let mut user = caller.user;
    user.avatar = None;
    user.updated_at = Utc::now();
    state.users.update(&user).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Serve a user's avatar bytes. Public: avatars are referenced by URL from
/// profile JSON.
#[get("/{id}/avatar")]
pub async fn get_avatar(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let user = state
        .users
        .find_by_id(user_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("avatar not found".into()))?;

    match user.avatar {
        Some(bytes) => Ok(HttpResponse::Ok()
            .content_type(avatar_content_type(&bytes))
            .body(bytes)),
        None => Err(AppError::NotFound("avatar not found".into())),
    }
}

/// Content type matching the stored bytes; uploads only admit these two
/// formats.
fn avatar_content_type(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else {
        "image/png"
    }
}

fn validate_avatar(bytes: &[u8]) -> Result<(), AppError> {
    if bytes.is_empty() {
        return Err(AppError::Validation("avatar image is required".into()));
    }
    if bytes.len() > MAX_AVATAR_BYTES {
        return Err(AppError::Validation("avatar must be at most 1MB".into()));
    }

    let jpeg = bytes.starts_with(&[0xFF, 0xD8, 0xFF]);
    let png = bytes.starts_with(&[0x89, b'P', b'N', b'G']);
    if !jpeg && !png {
        return Err(AppError::Validation("avatar must be a JPEG or PNG image".into()));
    }
    Ok(())
}
