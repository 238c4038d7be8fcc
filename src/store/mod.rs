//! Storage seams for users and tasks.
//!
//! Stores are explicit, dependency-injected clients constructed once at
//! process start and handed to the components that need them. The binary
//! wires up the Postgres implementations; the integration tests use the
//! in-memory ones.
//!
//! Owner scoping is part of every task-store signature, not something callers
//! layer on afterwards: there is no way to fetch, list, update, or delete a
//! task through this interface without naming the owner, and implementations
//! must apply that predicate before any user-supplied filter.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Task, TaskFilter, User};

pub use memory::{MemoryTaskStore, MemoryUserStore};
pub use postgres::{PgTaskStore, PgUserStore};

/// Persistence for user records. Owns email uniqueness.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: &User) -> Result<(), AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Persists the full record, including profile fields, the session-token
    /// list, and the avatar.
    async fn update(&self, user: &User) -> Result<(), AppError>;

    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}

/// Persistence for task records. Every accessor is owner-scoped.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert(&self, task: &Task) -> Result<(), AppError>;

    /// `None` both when no such task exists and when it belongs to a
    /// different owner; callers cannot tell the cases apart.
    async fn find_for_owner(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, AppError>;

    /// Lists the owner's tasks with the user-supplied filter/sort/pagination
    /// applied on top of the mandatory ownership predicate.
    async fn list_for_owner(&self, owner: Uuid, filter: &TaskFilter)
        -> Result<Vec<Task>, AppError>;

    async fn update(&self, task: &Task) -> Result<(), AppError>;

    /// Returns whether a row was deleted; `false` carries the same ambiguity
    /// as `find_for_owner` returning `None`.
    async fn delete_for_owner(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError>;

    /// Cascade step of account deletion. Returns the number of tasks removed.
    async fn delete_all_for_owner(&self, owner: Uuid) -> Result<u64, AppError>;
}
