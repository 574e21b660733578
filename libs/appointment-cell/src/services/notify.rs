// libs/appointment-cell/src/services/notify.rs
use reqwest::Client;
use tracing::{debug, warn};

use shared_config::AppConfig;

use crate::models::AppointmentEmail;

/// Confirmation-email collaborator. Strictly fire-and-forget: the outcome is
/// observed only through logging and never affects the committed booking.
pub struct NotificationService {
    client: Client,
    endpoint: String,
}

impl NotificationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.email_service_url.clone(),
        }
    }

    pub async fn send_confirmation(&self, email: &AppointmentEmail) {
        if self.endpoint.is_empty() {
            warn!("EMAIL_SERVICE_URL not configured, skipping confirmation email");
            return;
        }

        match self.client.post(&self.endpoint).json(email).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Confirmation email dispatched to {}", email.user_email);
            }
            Ok(response) => {
                warn!("Failed to send confirmation email: status {}", response.status());
            }
            Err(err) => {
                warn!("Failed to send confirmation email: {}", err);
            }
        }
    }
}
