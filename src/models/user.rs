//! User records and their validation rules.
//!
//! `User` deliberately does not implement `Serialize`: the only externally
//! visible representation is [`UserProfile`], which carries neither the
//! password hash nor the session-token list and exposes the avatar as a
//! derived URL rather than raw bytes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;

/// Minimum plaintext password length, after trimming.
pub const MIN_PASSWORD_LEN: usize = 7;

/// A user record as stored. One user owns zero-to-many tasks by id; deleting
/// a user requires deleting those tasks first (explicit cascade, no foreign
/// key enforces it).
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub age: i32,
    /// Active session tokens, oldest first. A token authenticates only while
    /// it is present here.
    pub tokens: Vec<String>,
    pub avatar: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String, age: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            age,
            tokens: Vec::new(),
            avatar: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile::from(self)
    }
}

/// The public JSON representation of a user.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub age: i32,
    /// Present only when the user has an avatar; a URL, never the bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            age: user.age,
            avatar: user
                .avatar
                .as_ref()
                .map(|_| format!("/users/{}/avatar", user.id)),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Registration payload. Unknown fields are ignored here; only patches are
/// strict allow-lists.
#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub age: Option<i32>,
}

/// A registration payload with every field checked and normalized.
#[derive(Debug)]
pub struct ValidRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub age: i32,
}

impl RegisterInput {
    /// Validates all fields, collecting every violation into one error.
    pub fn validated(self) -> Result<ValidRegistration, AppError> {
        let mut violations = Vec::new();

        let name = validate_name(&self.name).map_err(|e| violations.push(e)).ok();
        let email = validate_email(&self.email)
            .map_err(|e| violations.push(e))
            .ok();
        let password = validate_password(&self.password)
            .map_err(|e| violations.push(e))
            .ok();
        let age = validate_age(self.age.unwrap_or(0))
            .map_err(|e| violations.push(e))
            .ok();

        if violations.is_empty() {
            Ok(ValidRegistration {
                name: name.unwrap(),
                email: email.unwrap(),
                password: password.unwrap(),
                age: age.unwrap(),
            })
        } else {
            Err(AppError::Validation(violations.join("; ")))
        }
    }
}

/// Profile patch. The allow-list is {name, email, password, age}; any other
/// key fails JSON deserialization and surfaces as a 400.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub age: Option<i32>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none() && self.age.is_none()
    }
}

pub fn validate_name(name: &str) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("name is required".into());
    }
    Ok(name.to_string())
}

/// Trims, lowercases, and checks the email format.
pub fn validate_email(email: &str) -> Result<String, String> {
    let email = email.trim().to_lowercase();
    if !validator::validate_email(&email) {
        return Err("email is invalid".into());
    }
    Ok(email)
}

/// Checks the password policy and returns the trimmed plaintext, which still
/// must be hashed before storage.
pub fn validate_password(password: &str) -> Result<String, String> {
    let password = password.trim();
    if password.len() < MIN_PASSWORD_LEN {
        return Err(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        ));
    }
    if password.to_lowercase().contains("password") {
        return Err("password must not contain \"password\"".into());
    }
    Ok(password.to_string())
}

pub fn validate_age(age: i32) -> Result<i32, String> {
    if age < 0 {
        return Err("age must be a non-negative number".into());
    }
    Ok(age)
}
