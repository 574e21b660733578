// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, Local, NaiveDate};
use tracing::{info, warn};

use doctor_cell::services::directory::{find_by_name, spoken_directory, DoctorDirectoryService};
use shared_config::AppConfig;
use shared_database::supabase::{StoreError, SupabaseClient};
use shared_models::voice::BookingArgs;

use crate::models::{
    appointment_type_by_id, AppointmentEmail, AppointmentTypeInfo, BookedAppointment,
    DEFAULT_DURATION, DEFAULT_PRICE, DEFAULT_REASON, TIME_SLOTS,
};
use crate::services::notify::NotificationService;
use crate::services::store::AppointmentStore;
use crate::speech::{long_date_with_year, numeric_date, short_date, twelve_hour};

/// The booking resolution pipeline: identity, doctor, date, time, conflict,
/// then commit-and-notify. Every outcome is a speakable string; stage
/// failures name the valid alternatives so the voice agent can steer the
/// caller without another round trip.
pub struct BookingService {
    supabase: Arc<SupabaseClient>,
    store: AppointmentStore,
    directory: DoctorDirectoryService,
    notifier: NotificationService,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));

        Self {
            store: AppointmentStore::new(Arc::clone(&supabase)),
            directory: DoctorDirectoryService::new(config),
            notifier: NotificationService::new(config),
            supabase,
        }
    }

    pub async fn book(&self, args: &BookingArgs) -> String {
        match self.try_book(args).await {
            Ok(message) => message,
            Err(err) => {
                warn!("Booking pipeline failed unexpectedly: {err:#}");
                format!(
                    "I encountered an error while booking your appointment: {err}. \
                     Please try again or contact support if the issue persists."
                )
            }
        }
    }

    async fn try_book(&self, args: &BookingArgs) -> Result<String> {
        // Stage 1: date and time are both mandatory.
        let (Some(date_raw), Some(time)) = (args.date.as_deref(), args.time.as_deref()) else {
            return Ok(
                "I need both a date and time to book your appointment. Could you please provide both?"
                    .to_string(),
            );
        };

        // Stage 2: identity. Rejected before any doctor/date/time resolution;
        // no anonymous bookings.
        let Some(clerk_id) = args.clerk_id.as_deref() else {
            return Ok(
                "I need to verify your account to book an appointment. Please make sure you're logged in."
                    .to_string(),
            );
        };
        let Some(user) = self.supabase.find_user_by_clerk_id(clerk_id).await? else {
            return Ok(
                "I couldn't find your account. Please make sure you're logged in to book an appointment."
                    .to_string(),
            );
        };

        // Stage 3: doctor. An explicit id is taken unchecked; only the
        // conflict and commit stages touch the store again.
        let doctor_id = match (args.doctor_id.as_deref(), args.doctor_name.as_deref()) {
            (Some(id), _) => id.to_string(),
            (None, Some(name)) => {
                let doctors = self.directory.list_doctors().await?;
                match find_by_name(&doctors, name) {
                    Some(doctor) => doctor.id.clone(),
                    None => {
                        return Ok(format!(
                            "I couldn't find a doctor named \"{}\". Available doctors are: {}. \
                             Which doctor would you like to book with?",
                            name,
                            spoken_directory(&doctors)
                        ));
                    }
                }
            }
            (None, None) => {
                let doctors = self.directory.list_doctors().await?;
                return Ok(format!(
                    "Which doctor would you like to book with? Available doctors are: {}",
                    spoken_directory(&doctors)
                ));
            }
        };

        // Stage 4: date must parse and be at least tomorrow, local calendar
        // day, time-of-day ignored.
        let Ok(date) = NaiveDate::parse_from_str(date_raw, "%Y-%m-%d") else {
            return Ok(
                "Invalid date format. Please provide the date in YYYY-MM-DD format, for example 2025-01-15."
                    .to_string(),
            );
        };
        let tomorrow = Local::now().date_naive() + Duration::days(1);
        if date < tomorrow {
            let next_days = (0..5)
                .map(|offset| short_date(tomorrow + Duration::days(offset)))
                .collect::<Vec<_>>()
                .join(", ");
            return Ok(format!(
                "Appointments must be booked at least one day in advance. Available dates are: {}. \
                 Which date would you prefer?",
                next_days
            ));
        }

        // Stage 5: time must be a literal member of the slot catalog.
        if !TIME_SLOTS.contains(&time) {
            return Ok(format!(
                "Invalid time slot. Available times are: {}. Which time would you prefer?",
                TIME_SLOTS.join(", ")
            ));
        }

        // Stage 6: conflict check against the freshly fetched booked set.
        let booked = self.store.booked_times(&doctor_id, date_raw).await?;
        if booked.iter().any(|slot| slot == time) {
            return Ok(conflict_message(time, date, &booked));
        }

        // Stage 7: commit, then best-effort notification.
        let type_info = args.appointment_type.as_deref().and_then(appointment_type_by_id);
        let reason = type_info
            .map(|info| info.name.to_string())
            .or_else(|| args.reason.clone().filter(|reason| !reason.is_empty()))
            .unwrap_or_else(|| DEFAULT_REASON.to_string());

        let appointment = match self
            .store
            .create_appointment(&user.id, &doctor_id, date_raw, time, &reason)
            .await
        {
            Ok(appointment) => appointment,
            // Lost the check-then-commit race: the store's uniqueness key on
            // (doctor_id, date, time) rejected the insert. Same answer as a
            // stage-6 conflict.
            Err(StoreError::Conflict(_)) => {
                let booked = self.store.booked_times(&doctor_id, date_raw).await?;
                return Ok(conflict_message(time, date, &booked));
            }
            Err(err) => return Err(err.into()),
        };

        info!(
            "Appointment {} booked with {} on {} at {}",
            appointment.id, appointment.doctor.name, date_raw, time
        );

        self.send_confirmation(&appointment, date, time, &reason, type_info).await;

        Ok(format!(
            "Great! I've successfully booked your appointment with {} on {} at {} for {}. \
             You'll receive a confirmation email shortly with all the details. \
             Is there anything else I can help you with?",
            appointment.doctor.name,
            long_date_with_year(date),
            twelve_hour(time),
            reason
        ))
    }

    async fn send_confirmation(
        &self,
        appointment: &BookedAppointment,
        date: NaiveDate,
        time: &str,
        reason: &str,
        type_info: Option<&'static AppointmentTypeInfo>,
    ) {
        let Some(user_email) = appointment.user.email.clone() else {
            warn!("No email on record for booking {}, skipping confirmation", appointment.id);
            return;
        };

        let email = AppointmentEmail {
            user_email,
            doctor_name: appointment.doctor.name.clone(),
            appointment_date: long_date_with_year(date),
            appointment_time: time.to_string(),
            appointment_type: reason.to_string(),
            duration: type_info
                .map(|info| info.spoken_duration())
                .unwrap_or_else(|| DEFAULT_DURATION.to_string()),
            price: type_info
                .map(|info| info.spoken_price())
                .unwrap_or_else(|| DEFAULT_PRICE.to_string()),
        };

        self.notifier.send_confirmation(&email).await;
    }
}

fn conflict_message(time: &str, date: NaiveDate, booked: &[String]) -> String {
    let available: Vec<&str> = TIME_SLOTS
        .iter()
        .copied()
        .filter(|slot| !booked.iter().any(|taken| taken == slot))
        .collect();
    let time_list = if available.is_empty() {
        "none available".to_string()
    } else {
        available.join(", ")
    };

    format!(
        "I'm sorry, but the time slot {} is already booked for this doctor on {}. \
         Available times on that date are: {}. Would you like to choose a different time?",
        time,
        numeric_date(date),
        time_list
    )
}
