//! In-memory stores with the same observable semantics as the Postgres ones.
//!
//! Used by the integration tests; "store-native order" here is insertion
//! order.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::task::{SortDir, SortField};
use crate::models::{Task, TaskFilter, User};
use crate::store::{TaskStore, UserStore};

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: &User) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        // Same outcome as the Postgres unique index on email.
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Validation("email already in use".into()));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn update(&self, user: &User) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        if let Some(existing) = users.iter_mut().find(|u| u.id == user.id) {
            *existing = user.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        users.retain(|u| u.id != id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<Vec<Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert(&self, task: &Task) -> Result<(), AppError> {
        self.tasks.write().await.push(task.clone());
        Ok(())
    }

    async fn find_for_owner(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, AppError> {
        let tasks = self.tasks.read().await;
        Ok(tasks
            .iter()
            .find(|t| t.owner_id == owner && t.id == id)
            .cloned())
    }

    async fn list_for_owner(
        &self,
        owner: Uuid,
        filter: &TaskFilter,
    ) -> Result<Vec<Task>, AppError> {
        let tasks = self.tasks.read().await;
        // Ownership first, then the optional completed filter.
        let mut out: Vec<Task> = tasks
            .iter()
            .filter(|t| t.owner_id == owner)
            .filter(|t| filter.completed.map_or(true, |c| t.completed == c))
            .cloned()
            .collect();

        if let Some((field, dir)) = filter.sort {
            match field {
                SortField::Description => out.sort_by(|a, b| a.description.cmp(&b.description)),
                SortField::Completed => out.sort_by(|a, b| a.completed.cmp(&b.completed)),
                SortField::CreatedAt => out.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
                SortField::UpdatedAt => out.sort_by(|a, b| a.updated_at.cmp(&b.updated_at)),
            }
            if dir == SortDir::Desc {
                out.reverse();
            }
        }

        let skip = filter.skip.unwrap_or(0).max(0) as usize;
        let limit = filter.limit.map_or(usize::MAX, |l| l.max(0) as usize);
        Ok(out.into_iter().skip(skip).take(limit).collect())
    }

    async fn update(&self, task: &Task) -> Result<(), AppError> {
        let mut tasks = self.tasks.write().await;
        if let Some(existing) = tasks
            .iter_mut()
            .find(|t| t.owner_id == task.owner_id && t.id == task.id)
        {
            *existing = task.clone();
        }
        Ok(())
    }

    async fn delete_for_owner(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| !(t.owner_id == owner && t.id == id));
        Ok(tasks.len() < before)
    }

    async fn delete_all_for_owner(&self, owner: Uuid) -> Result<u64, AppError> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| t.owner_id != owner);
        Ok((before - tasks.len()) as u64)
    }
}
