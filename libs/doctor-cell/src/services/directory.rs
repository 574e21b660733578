use anyhow::Result;
use reqwest::Method;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::Doctor;

pub struct DoctorDirectoryService {
    supabase: SupabaseClient,
}

impl DoctorDirectoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Fetch the full doctor directory. Ordered by creation time so "first
    /// match" is stable for duplicate names; re-read on every call, never
    /// cached.
    pub async fn list_doctors(&self) -> Result<Vec<Doctor>> {
        debug!("Fetching doctor directory");

        let path = "/rest/v1/doctors?select=id,name,speciality,email,phone,bio&order=created_at.asc";
        let doctors: Vec<Doctor> = self.supabase.request(Method::GET, path, None).await?;

        Ok(doctors)
    }

    /// Directory as a speakable tool-call result. A directory fetch failure
    /// is folded into an apologetic string here so that one bad call never
    /// sinks the rest of a batch.
    pub async fn spoken_listing(&self) -> String {
        match self.list_doctors().await {
            Ok(doctors) => format!(
                "Available doctors: {}. Which doctor would you like to book with?",
                spoken_directory(&doctors)
            ),
            Err(err) => {
                warn!("Doctor directory fetch failed: {err:#}");
                format!(
                    "I encountered an error while fetching available doctors: {err}. Please try again."
                )
            }
        }
    }
}

/// First case-insensitive exact match in directory order.
pub fn find_by_name<'a>(doctors: &'a [Doctor], name: &str) -> Option<&'a Doctor> {
    let wanted = name.to_lowercase();
    doctors
        .iter()
        .find(|doctor| doctor.name.to_lowercase() == wanted)
}

/// Directory rendered for the voice agent: `"name (speciality)"`, comma-joined.
pub fn spoken_directory(doctors: &[Doctor]) -> String {
    doctors
        .iter()
        .map(|doctor| format!("{} ({})", doctor.name, doctor.speciality))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctor(id: &str, name: &str, speciality: &str) -> Doctor {
        Doctor {
            id: id.to_string(),
            name: name.to_string(),
            speciality: speciality.to_string(),
            email: None,
            phone: None,
            bio: None,
        }
    }

    #[test]
    fn name_match_is_case_insensitive_and_exact() {
        let doctors = vec![
            doctor("d1", "Dr. Sarah Smith", "Orthodontics"),
            doctor("d2", "Dr. James Lee", "General Dentistry"),
        ];

        assert_eq!(find_by_name(&doctors, "dr. sarah smith").unwrap().id, "d1");
        assert_eq!(find_by_name(&doctors, "DR. JAMES LEE").unwrap().id, "d2");
        assert!(find_by_name(&doctors, "Sarah Smith").is_none());
    }

    #[test]
    fn duplicate_names_resolve_to_first_in_directory_order() {
        let doctors = vec![
            doctor("d1", "Dr. Kim", "Orthodontics"),
            doctor("d2", "Dr. Kim", "Endodontics"),
        ];

        assert_eq!(find_by_name(&doctors, "dr. kim").unwrap().id, "d1");
    }

    #[test]
    fn spoken_directory_names_specialities() {
        let doctors = vec![
            doctor("d1", "Dr. Sarah Smith", "Orthodontics"),
            doctor("d2", "Dr. James Lee", "General Dentistry"),
        ];

        assert_eq!(
            spoken_directory(&doctors),
            "Dr. Sarah Smith (Orthodontics), Dr. James Lee (General Dentistry)"
        );
    }
}
