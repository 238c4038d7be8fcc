//! Postgres-backed stores.
//!
//! Task listing composes its SQL dynamically, but the `owner_id = $1`
//! predicate is part of the base query string before anything user-supplied
//! is appended, and sort columns come from a fixed enum, never from raw
//! input. Session-token lists are a `TEXT[]` column, avatars `BYTEA`.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Task, TaskFilter, User};
use crate::store::{TaskStore, UserStore};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, age, tokens, avatar, created_at, updated_at";
const TASK_COLUMNS: &str = "id, description, completed, owner_id, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, age, tokens, avatar, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.age)
        .bind(&user.tokens)
        .bind(&user.avatar)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE users
             SET name = $1, email = $2, password_hash = $3, age = $4, tokens = $5,
                 avatar = $6, updated_at = $7
             WHERE id = $8",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.age)
        .bind(&user.tokens)
        .bind(&user.avatar)
        .bind(user.updated_at)
        .bind(user.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn insert(&self, task: &Task) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO tasks (id, description, completed, owner_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(task.id)
        .bind(&task.description)
        .bind(task.completed)
        .bind(task.owner_id)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_for_owner(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = $1 AND id = $2"
        ))
        .bind(owner)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    #[allow(unused_assignments)]
    async fn list_for_owner(
        &self,
        owner: Uuid,
        filter: &TaskFilter,
    ) -> Result<Vec<Task>, AppError> {
        // Ownership predicate first; everything user-supplied appends to it.
        let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = $1");
        let mut param = 2;

        if filter.completed.is_some() {
            sql.push_str(&format!(" AND completed = ${param}"));
            param += 1;
        }
        if let Some((field, dir)) = filter.sort {
            sql.push_str(&format!(" ORDER BY {} {}", field.column(), dir.keyword()));
        }
        if filter.limit.is_some() {
            sql.push_str(&format!(" LIMIT ${param}"));
            param += 1;
        }
        if filter.skip.is_some() {
            sql.push_str(&format!(" OFFSET ${param}"));
        }

        let mut query = sqlx::query_as::<_, Task>(&sql).bind(owner);
        if let Some(completed) = filter.completed {
            query = query.bind(completed);
        }
        if let Some(limit) = filter.limit {
            query = query.bind(limit);
        }
        if let Some(skip) = filter.skip {
            query = query.bind(skip);
        }

        let tasks = query.fetch_all(&self.pool).await?;
        Ok(tasks)
    }

    async fn update(&self, task: &Task) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE tasks SET description = $1, completed = $2, updated_at = $3
             WHERE owner_id = $4 AND id = $5",
        )
        .bind(&task.description)
        .bind(task.completed)
        .bind(task.updated_at)
        .bind(task.owner_id)
        .bind(task.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_for_owner(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE owner_id = $1 AND id = $2")
            .bind(owner)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_for_owner(&self, owner: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE owner_id = $1")
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
