// libs/appointment-cell/src/services/availability.rs
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::warn;

use doctor_cell::services::directory::{find_by_name, spoken_directory, DoctorDirectoryService};
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::voice::BookingArgs;

use crate::models::TIME_SLOTS;
use crate::services::store::AppointmentStore;
use crate::speech::{long_date, twelve_hour};

/// Read-only availability query: the slot catalog minus the booked set for
/// one (doctor, date). Shares the doctor and date resolution rules with the
/// booking pipeline, minus the advance-booking minimum, so past dates stay
/// queryable.
pub struct AvailabilityService {
    store: AppointmentStore,
    directory: DoctorDirectoryService,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));

        Self {
            store: AppointmentStore::new(supabase),
            directory: DoctorDirectoryService::new(config),
        }
    }

    pub async fn available_times(&self, args: &BookingArgs) -> String {
        match self.try_available_times(args).await {
            Ok(message) => message,
            Err(err) => {
                warn!("Availability query failed unexpectedly: {err:#}");
                format!(
                    "I encountered an error while checking available times: {err}. Please try again."
                )
            }
        }
    }

    async fn try_available_times(&self, args: &BookingArgs) -> Result<String> {
        let Some(date_raw) = args.date.as_deref() else {
            return Ok(
                "I need a date to check available appointment times. Please provide a date in YYYY-MM-DD format."
                    .to_string(),
            );
        };

        let Ok(date) = NaiveDate::parse_from_str(date_raw, "%Y-%m-%d") else {
            return Ok(
                "Invalid date format. Please provide the date in YYYY-MM-DD format, for example 2025-01-15."
                    .to_string(),
            );
        };

        let doctor_id = match (args.doctor_id.as_deref(), args.doctor_name.as_deref()) {
            (Some(id), _) => id.to_string(),
            (None, Some(name)) => {
                let doctors = self.directory.list_doctors().await?;
                match find_by_name(&doctors, name) {
                    Some(doctor) => doctor.id.clone(),
                    None => {
                        return Ok(format!(
                            "I couldn't find a doctor named \"{}\". Available doctors are: {}.",
                            name,
                            spoken_directory(&doctors)
                        ));
                    }
                }
            }
            (None, None) => {
                let doctors = self.directory.list_doctors().await?;
                return Ok(format!(
                    "Please specify which doctor you'd like to check availability for. \
                     Available doctors are: {}",
                    spoken_directory(&doctors)
                ));
            }
        };

        let booked = self.store.booked_times(&doctor_id, date_raw).await?;
        let available: Vec<&str> = TIME_SLOTS
            .iter()
            .copied()
            .filter(|slot| !booked.iter().any(|taken| taken == slot))
            .collect();

        if available.is_empty() {
            return Ok(format!(
                "Unfortunately, there are no available appointment times for {}. \
                 Would you like to check a different date?",
                long_date(date)
            ));
        }

        let spoken_times = available
            .iter()
            .map(|slot| twelve_hour(slot))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!(
            "Available appointment times on {} are: {}. Which time would you prefer?",
            long_date(date),
            spoken_times
        ))
    }
}
