// libs/appointment-cell/src/services/store.rs
use std::sync::Arc;

use reqwest::Method;
use serde_json::json;
use tracing::debug;
use urlencoding::encode;

use shared_database::supabase::{StoreError, SupabaseClient};

use crate::models::{BookedAppointment, BookedTime, UserAppointment};

/// Appointment-table access. Every read goes back to the store; the booked
/// set is never cached between calls.
pub struct AppointmentStore {
    supabase: Arc<SupabaseClient>,
}

impl AppointmentStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Committed times for (doctor, date). Cancelled rows free their slot.
    pub async fn booked_times(
        &self,
        doctor_id: &str,
        date: &str,
    ) -> Result<Vec<String>, StoreError> {
        debug!("Fetching booked slots for doctor {} on {}", doctor_id, date);

        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&date=eq.{}&status=neq.cancelled&select=time",
            encode(doctor_id),
            encode(date)
        );
        let rows: Vec<BookedTime> = self.supabase.request(Method::GET, &path, None).await?;

        Ok(rows.into_iter().map(|row| row.time).collect())
    }

    /// Create the booking and return its representation with the doctor name
    /// and user email embedded. The store carries a uniqueness key on
    /// (doctor_id, date, time); losing the check-then-commit race surfaces
    /// here as `StoreError::Conflict`.
    pub async fn create_appointment(
        &self,
        user_id: &str,
        doctor_id: &str,
        date: &str,
        time: &str,
        reason: &str,
    ) -> Result<BookedAppointment, StoreError> {
        debug!("Creating appointment for user {} with doctor {}", user_id, doctor_id);

        let path = "/rest/v1/appointments?select=id,date,time,reason,status,doctor:doctors(name),user:users(email)";
        let body = json!({
            "user_id": user_id,
            "doctor_id": doctor_id,
            "date": date,
            "time": time,
            "reason": reason,
            "status": "confirmed",
        });

        self.supabase.insert(path, body).await
    }

    /// All appointments for one user, oldest first, with doctor names joined.
    pub async fn appointments_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<UserAppointment>, StoreError> {
        debug!("Fetching appointments for user {}", user_id);

        let path = format!(
            "/rest/v1/appointments?user_id=eq.{}&select=date,time,reason,status,doctor:doctors(name)&order=date.asc",
            encode(user_id)
        );

        self.supabase.request(Method::GET, &path, None).await
    }
}
