//! Lifecycle email notifications.
//!
//! Notifications are strictly best-effort: handlers hand them to
//! [`spawn_welcome`]/[`spawn_cancellation`], which run them on a detached
//! task. Delivery failures are logged and never surface to the request that
//! triggered them.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

/// Outbound notification seam. Implementations must not return errors; they
/// own their own failure reporting.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_welcome(&self, email: &str, name: &str);
    async fn send_cancellation(&self, email: &str, name: &str);
}

/// Fires the welcome email without awaiting it.
pub fn spawn_welcome(notifier: Arc<dyn Notifier>, email: String, name: String) {
    actix_web::rt::spawn(async move {
        notifier.send_welcome(&email, &name).await;
    });
}

/// Fires the cancellation email without awaiting it.
pub fn spawn_cancellation(notifier: Arc<dyn Notifier>, email: String, name: String) {
    actix_web::rt::spawn(async move {
        notifier.send_cancellation(&email, &name).await;
    });
}

/// SendGrid-backed mailer.
pub struct SendGridNotifier {
    client: reqwest::Client,
    api_key: String,
    from: String,
}

impl SendGridNotifier {
    const ENDPOINT: &'static str = "https://api.sendgrid.com/v3/mail/send";

    pub fn new(api_key: String, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            from,
        }
    }

    async fn send(&self, to: &str, subject: &str, text: &str) {
        let body = json!({
            "personalizations": [{ "to": [{ "email": to }] }],
            "from": { "email": self.from },
            "subject": subject,
            "content": [{ "type": "text/plain", "value": text }],
        });

        let result = self
            .client
            .post(Self::ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                log::debug!("sent \"{}\" to {}", subject, to);
            }
            Ok(response) => {
                log::warn!("mail to {} rejected with status {}", to, response.status());
            }
            Err(e) => {
                log::warn!("mail to {} failed: {}", to, e);
            }
        }
    }
}

#[async_trait]
impl Notifier for SendGridNotifier {
    async fn send_welcome(&self, email: &str, name: &str) {
        let text = format!(
            "Welcome to the app, {}. Let me know how you get along with it.",
            name
        );
        self.send(email, "Welcome to Taskdeck", &text).await;
    }

    async fn send_cancellation(&self, email: &str, name: &str) {
        let text = format!(
            "Hi {}, your account has been removed. We'd appreciate feedback on \
             how we might have kept you onboard.",
            name
        );
        self.send(email, "Account removed", &text).await;
    }
}

/// Used when no mail API key is configured, and by the tests.
#[derive(Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send_welcome(&self, email: &str, _name: &str) {
        log::debug!("email disabled; skipping welcome mail to {}", email);
    }

    async fn send_cancellation(&self, email: &str, _name: &str) {
        log::debug!("email disabled; skipping cancellation mail to {}", email);
    }
}
