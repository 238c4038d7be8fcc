#![allow(dead_code)]

//! Shared fixtures: two users with one active session each, three tasks
//! (two for user one, one for user two), all reachable through the same
//! `AppState` the handlers see.

use std::sync::Arc;

use actix_web::web;
use uuid::Uuid;

use taskdeck::auth::JwtKeys;
use taskdeck::models::{Task, User};
use taskdeck::notify::NoopNotifier;
use taskdeck::state::AppState;
use taskdeck::store::{MemoryTaskStore, MemoryUserStore, TaskStore, UserStore};

pub const JWT_SECRET: &str = "test-secret";
pub const USER_ONE_PASSWORD: &str = "userone@123";
pub const USER_TWO_PASSWORD: &str = "usertwo@123";

// Low bcrypt cost for fixture seeding only; the handlers keep the default.
const FIXTURE_BCRYPT_COST: u32 = 4;

pub struct TestContext {
    pub state: web::Data<AppState>,
    pub users: Arc<MemoryUserStore>,
    pub tasks: Arc<MemoryTaskStore>,
    pub user_one_id: Uuid,
    pub user_two_id: Uuid,
    pub token_one: String,
    pub token_two: String,
    pub task_one_id: Uuid,
    pub task_two_id: Uuid,
    pub task_three_id: Uuid,
}

pub async fn setup() -> TestContext {
    let users = Arc::new(MemoryUserStore::new());
    let tasks = Arc::new(MemoryTaskStore::new());
    let jwt = JwtKeys::from_secret(JWT_SECRET);

    let (user_one, token_one) = seeded_user(&jwt, "Test User One", "userone@test.com", USER_ONE_PASSWORD);
    let (user_two, token_two) = seeded_user(&jwt, "Test User Two", "usertwo@test.com", USER_TWO_PASSWORD);
    users.insert(&user_one).await.unwrap();
    users.insert(&user_two).await.unwrap();

    let task_one = Task::new("First Task".into(), false, user_one.id);
    let task_two = Task::new("Second Task".into(), true, user_one.id);
    let task_three = Task::new("Third Task".into(), true, user_two.id);
    tasks.insert(&task_one).await.unwrap();
    tasks.insert(&task_two).await.unwrap();
    tasks.insert(&task_three).await.unwrap();

    let state = web::Data::new(AppState {
        users: users.clone(),
        tasks: tasks.clone(),
        notifier: Arc::new(NoopNotifier),
        jwt,
    });

    TestContext {
        state,
        users,
        tasks,
        user_one_id: user_one.id,
        user_two_id: user_two.id,
        token_one,
        token_two,
        task_one_id: task_one.id,
        task_two_id: task_two.id,
        task_three_id: task_three.id,
    }
}

fn seeded_user(jwt: &JwtKeys, name: &str, email: &str, password: &str) -> (User, String) {
    let hash = bcrypt::hash(password, FIXTURE_BCRYPT_COST).unwrap();
    let mut user = User::new(name.into(), email.into(), hash, 0);
    let token = jwt.sign(user.id).unwrap();
    user.tokens.push(token.clone());
    (user, token)
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
