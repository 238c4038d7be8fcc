use std::env;

/// Process configuration, read once at startup.
///
/// Required: `DATABASE_URL`, `JWT_SECRET`. Everything else has a default or
/// is optional. `SENDGRID_API_KEY` being absent disables outbound email
/// (notifications become no-ops).
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub jwt_secret: String,
    pub sendgrid_api_key: Option<String>,
    pub mail_from: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            sendgrid_api_key: env::var("SENDGRID_API_KEY").ok(),
            mail_from: env::var("MAIL_FROM").unwrap_or_else(|_| "noreply@taskdeck.dev".to_string()),
        }
    }

    pub fn server_addr(&self) -> (String, u16) {
        (self.server_host.clone(), self.server_port)
    }
}
