//! Route registration and request-body error mapping.

pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

use crate::error::AppError;

/// Registers every endpoint plus the JSON/query extractors' error handlers.
/// Shared between the binary and the integration tests.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        // Raw-bytes payloads (avatar uploads) may exceed the 256KB default;
        // the handler enforces the real 1MB limit with a 400.
        .app_data(web::PayloadConfig::new(2 * 1024 * 1024))
        .service(health::health)
        .service(
            web::scope("/users")
                .service(users::register)
                .service(users::login)
                .service(users::logout)
                .service(users::logout_all)
                .service(users::me)
                .service(users::update_me)
                .service(users::delete_me)
                // `/me/avatar` must register before the `/{id}/avatar` catch-all.
                .service(users::upload_avatar)
                .service(users::delete_avatar)
                .service(users::get_avatar),
        )
        .service(
            web::scope("/tasks")
                .service(tasks::list_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}

/// Bad JSON bodies (including unknown patch fields) become 400 validation
/// errors with the same JSON shape as every other error.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::Validation(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::Validation(err.to_string()).into())
}
