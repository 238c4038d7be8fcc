//! The `taskdeck` library crate.
//!
//! A task-management REST API: users register, authenticate across multiple
//! devices with revocable tokens, manage their profile and avatar, and work
//! with their own tasks through filtered, sorted, paginated queries.
//! Authorization is strictly per-owner.
//!
//! The binary (`main.rs`) builds an [`state::AppState`] from Postgres-backed
//! stores and runs the server; the integration tests build the same app
//! against in-memory stores.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod routes;
pub mod state;
pub mod store;

pub use error::AppError;
pub use state::AppState;
