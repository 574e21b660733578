// libs/appointment-cell/src/services/listing.rs
use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use tracing::warn;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{AppointmentStatus, UserAppointment, DEFAULT_REASON};
use crate::services::store::AppointmentStore;
use crate::speech::{long_date, twelve_hour};

/// Per-user appointment summary, spoken back as one sentence-joined string.
pub struct UserAppointmentsService {
    supabase: Arc<SupabaseClient>,
    store: AppointmentStore,
}

impl UserAppointmentsService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));

        Self {
            store: AppointmentStore::new(Arc::clone(&supabase)),
            supabase,
        }
    }

    pub async fn summarize(&self, clerk_id: Option<&str>) -> String {
        match self.try_summarize(clerk_id).await {
            Ok(message) => message,
            Err(err) => {
                warn!("Appointment listing failed unexpectedly: {err:#}");
                format!(
                    "I encountered an error while fetching your appointments: {err}. Please try again."
                )
            }
        }
    }

    async fn try_summarize(&self, clerk_id: Option<&str>) -> Result<String> {
        let Some(clerk_id) = clerk_id else {
            return Ok(
                "I need to verify your account to view your appointments. Please make sure you're logged in."
                    .to_string(),
            );
        };
        let Some(user) = self.supabase.find_user_by_clerk_id(clerk_id).await? else {
            return Ok("I couldn't find your account. Please make sure you're logged in.".to_string());
        };

        let appointments = self.store.appointments_for_user(&user.id).await?;
        if appointments.is_empty() {
            return Ok(
                "You don't have any upcoming appointments scheduled. Would you like to book one?"
                    .to_string(),
            );
        }

        // Single pass, calendar-day granularity. Cancelled future bookings
        // land in neither bucket.
        let today = Local::now().date_naive();
        let mut upcoming: Vec<&UserAppointment> = Vec::new();
        let mut past_count = 0usize;
        for appointment in &appointments {
            if appointment.date >= today && appointment.status == AppointmentStatus::Confirmed {
                upcoming.push(appointment);
            }
            if appointment.date < today || appointment.status == AppointmentStatus::Completed {
                past_count += 1;
            }
        }

        if upcoming.is_empty() {
            return Ok(format!(
                "You don't have any upcoming appointments. You have {} past appointment{}. \
                 Would you like to book a new appointment?",
                past_count,
                plural(past_count)
            ));
        }

        let formatted = upcoming
            .iter()
            .map(|appointment| {
                format!(
                    "- {} on {} at {} for {}",
                    appointment.doctor.name,
                    long_date(appointment.date),
                    twelve_hour(&appointment.time),
                    appointment
                        .reason
                        .as_deref()
                        .filter(|reason| !reason.is_empty())
                        .unwrap_or(DEFAULT_REASON)
                )
            })
            .collect::<Vec<_>>()
            .join(". ");

        let mut response = format!(
            "You have {} upcoming appointment{}: {}.",
            upcoming.len(),
            plural(upcoming.len()),
            formatted
        );

        if past_count > 0 {
            response.push_str(&format!(
                " You also have {} past appointment{}.",
                past_count,
                plural(past_count)
            ));
        }

        Ok(response)
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
