use std::env;
use tracing::warn;

/// Default CORS allow-list used when ALLOWED_ORIGINS is not set.
const DEFAULT_ALLOWED_ORIGINS: [&str; 4] = [
    "https://dentify37.vercel.app",
    "https://www.dentify37.vercel.app",
    "http://localhost:3000",
    "http://localhost:3001",
];

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub email_service_url: String,
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_service_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_ROLE_KEY not set, using empty value");
                    String::new()
                }),
            email_service_url: env::var("EMAIL_SERVICE_URL")
                .unwrap_or_else(|_| {
                    warn!("EMAIL_SERVICE_URL not set, confirmation emails will be skipped");
                    String::new()
                }),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|origin| origin.trim().to_string())
                        .filter(|origin| !origin.is_empty())
                        .collect()
                })
                .unwrap_or_else(|_| {
                    DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect()
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_key.is_empty()
    }
}
