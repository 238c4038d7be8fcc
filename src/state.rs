//! Shared application state: the dependency-injected collaborators.
//!
//! Constructed once at process start (or per test) and handed to actix via
//! `web::Data`. Handlers reach the stores, the mailer, and the JWT keys only
//! through this struct; nothing reads the environment on the request path.

use std::sync::Arc;

use crate::auth::JwtKeys;
use crate::notify::Notifier;
use crate::store::{TaskStore, UserStore};

pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub notifier: Arc<dyn Notifier>,
    pub jwt: JwtKeys,
}
