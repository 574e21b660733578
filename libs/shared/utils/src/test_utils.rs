use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub email_service_url: String,
    pub allowed_origins: Vec<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test-service-key".to_string(),
            email_service_url: String::new(),
            allowed_origins: vec![
                "https://app.example.com".to_string(),
                "http://localhost:3000".to_string(),
            ],
        }
    }
}

impl TestConfig {
    /// Point the persistence collaborator at a wiremock server.
    pub fn with_store(mut self, url: &str) -> Self {
        self.supabase_url = url.to_string();
        self
    }

    /// Point the confirmation-email collaborator at a wiremock server.
    pub fn with_email_service(mut self, url: &str) -> Self {
        self.email_service_url = url.to_string();
        self
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_service_key: self.supabase_service_key.clone(),
            email_service_url: self.email_service_url.clone(),
            allowed_origins: self.allowed_origins.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn user_response(clerk_id: &str, email: &str) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4().to_string(),
            "clerk_id": clerk_id,
            "email": email,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn doctor_response(id: &str, name: &str, speciality: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "speciality": speciality,
            "email": "doctor@example.com",
            "phone": "+1-555-0100",
            "bio": "Experienced dental practitioner"
        })
    }

    pub fn booked_time_response(time: &str) -> serde_json::Value {
        json!({ "time": time })
    }

    /// One row of the per-user appointment listing, with the doctor name
    /// embedded the way PostgREST returns joined resources.
    pub fn user_appointment_response(
        doctor_name: &str,
        date: &str,
        time: &str,
        reason: Option<&str>,
        status: &str,
    ) -> serde_json::Value {
        json!({
            "date": date,
            "time": time,
            "reason": reason,
            "status": status,
            "doctor": { "name": doctor_name }
        })
    }

    /// Insert representation returned for a freshly created appointment.
    pub fn created_appointment_response(
        doctor_name: &str,
        user_email: &str,
        date: &str,
        time: &str,
        reason: &str,
    ) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4().to_string(),
            "date": date,
            "time": time,
            "reason": reason,
            "status": "confirmed",
            "doctor": { "name": doctor_name },
            "user": { "email": user_email }
        })
    }
}
