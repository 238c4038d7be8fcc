use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use sqlx::PgPool;

use taskdeck::auth::JwtKeys;
use taskdeck::config::Config;
use taskdeck::notify::{NoopNotifier, Notifier, SendGridNotifier};
use taskdeck::routes;
use taskdeck::state::AppState;
use taskdeck::store::{PgTaskStore, PgUserStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let pool = PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");
    log::info!("connected to database");

    let notifier: Arc<dyn Notifier> = match &config.sendgrid_api_key {
        Some(key) => Arc::new(SendGridNotifier::new(key.clone(), config.mail_from.clone())),
        None => {
            log::warn!("SENDGRID_API_KEY not set; lifecycle emails disabled");
            Arc::new(NoopNotifier)
        }
    };

    let state = web::Data::new(AppState {
        users: Arc::new(PgUserStore::new(pool.clone())),
        tasks: Arc::new(PgTaskStore::new(pool)),
        notifier,
        jwt: JwtKeys::from_secret(&config.jwt_secret),
    });

    let addr = config.server_addr();
    log::info!("starting server at http://{}:{}", addr.0, addr.1);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind(addr)?
    .run()
    .await
}
