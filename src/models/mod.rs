pub mod task;
pub mod user;

pub use task::{Task, TaskCreate, TaskFilter, TaskListQuery, TaskPatch};
pub use user::{RegisterInput, User, UserPatch, UserProfile};
