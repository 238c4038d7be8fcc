//! Task records plus the input and query types for the task endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;

/// A task as stored and as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub description: String,
    pub completed: bool,
    /// Always the id of the user who created the task.
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(description: String, completed: bool, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            description,
            completed,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Creation payload. Unknown fields (including any supplied `owner`) are
/// ignored; the owner is always the authenticated caller.
#[derive(Debug, Deserialize)]
pub struct TaskCreate {
    #[serde(default)]
    pub description: String,
    pub completed: Option<bool>,
}

impl TaskCreate {
    pub fn validated(self) -> Result<(String, bool), AppError> {
        let description = validate_description(&self.description)
            .map_err(AppError::Validation)?;
        Ok((description, self.completed.unwrap_or(false)))
    }
}

/// Update payload. The allow-list is {description, completed}; any other key
/// fails JSON deserialization and surfaces as a 400.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskPatch {
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.completed.is_none()
    }
}

pub fn validate_description(description: &str) -> Result<String, String> {
    let description = description.trim();
    if description.is_empty() {
        return Err("description is required".into());
    }
    Ok(description.to_string())
}

/// Raw query parameters of `GET /tasks`.
///
/// `sort_by` carries the wire format `field:dir` (e.g. `createdAt:desc`) and
/// is parsed into a [`SortField`]/[`SortDir`] pair by [`TaskListQuery::filter`].
#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    pub completed: Option<bool>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

impl TaskListQuery {
    pub fn filter(&self) -> Result<TaskFilter, AppError> {
        let sort = match &self.sort_by {
            Some(raw) => Some(parse_sort(raw).map_err(AppError::Validation)?),
            None => None,
        };
        if self.limit.map_or(false, |l| l < 0) {
            return Err(AppError::Validation("limit must not be negative".into()));
        }
        if self.skip.map_or(false, |s| s < 0) {
            return Err(AppError::Validation("skip must not be negative".into()));
        }
        Ok(TaskFilter {
            completed: self.completed,
            sort,
            limit: self.limit,
            skip: self.skip,
        })
    }
}

/// The user-supplied part of a task listing. Owner scoping is not represented
/// here: stores take the owner as a separate, mandatory argument.
#[derive(Debug, Default, Clone)]
pub struct TaskFilter {
    pub completed: Option<bool>,
    pub sort: Option<(SortField, SortDir)>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Description,
    Completed,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Column name for SQL ordering. Static strings only; never derived from
    /// raw input.
    pub fn column(self) -> &'static str {
        match self {
            SortField::Description => "description",
            SortField::Completed => "completed",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn keyword(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

/// Parses the `sortBy=field:dir` wire format. The field must be one of
/// {description, completed, createdAt, updatedAt}; the direction is
/// descending for `desc` and ascending otherwise.
pub fn parse_sort(raw: &str) -> Result<(SortField, SortDir), String> {
    let (field, dir) = match raw.split_once(':') {
        Some((field, dir)) => (field, dir),
        None => (raw, "asc"),
    };

    let field = match field {
        "description" => SortField::Description,
        "completed" => SortField::Completed,
        "createdAt" => SortField::CreatedAt,
        "updatedAt" => SortField::UpdatedAt,
        other => return Err(format!("cannot sort by \"{}\"", other)),
    };

    let dir = if dir == "desc" {
        SortDir::Desc
    } else {
        SortDir::Asc
    };

    Ok((field, dir))
}
