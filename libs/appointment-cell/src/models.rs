// libs/appointment-cell/src/models.rs
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==============================================================================
// APPOINTMENT ROW VIEWS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddedDoctor {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddedUser {
    pub email: Option<String>,
}

/// One row of the per-user appointment listing, with the doctor name joined
/// in by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct UserAppointment {
    pub date: NaiveDate,
    pub time: String,
    pub reason: Option<String>,
    pub status: AppointmentStatus,
    pub doctor: EmbeddedDoctor,
}

/// Insert representation of a freshly committed booking, including the
/// doctor name and user email needed for the confirmation flow.
#[derive(Debug, Clone, Deserialize)]
pub struct BookedAppointment {
    pub id: String,
    pub date: NaiveDate,
    pub time: String,
    pub reason: Option<String>,
    pub status: AppointmentStatus,
    pub doctor: EmbeddedDoctor,
    pub user: EmbeddedUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookedTime {
    pub time: String,
}

// ==============================================================================
// STATIC CATALOGS
// ==============================================================================

/// Bookable slots of a single business day, shared by every doctor and date.
/// Times are canonical 24-hour `HH:MM` strings; requests must match literally.
pub const TIME_SLOTS: [&str; 12] = [
    "09:00", "09:30", "10:00", "10:30", "11:00", "11:30",
    "14:00", "14:30", "15:00", "15:30", "16:00", "16:30",
];

#[derive(Debug, Clone, Copy)]
pub struct AppointmentTypeInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub duration_minutes: u32,
    pub price_usd: u32,
}

pub const APPOINTMENT_TYPES: [AppointmentTypeInfo; 4] = [
    AppointmentTypeInfo { id: "checkup", name: "Regular Checkup", duration_minutes: 60, price_usd: 120 },
    AppointmentTypeInfo { id: "cleaning", name: "Teeth Cleaning", duration_minutes: 45, price_usd: 90 },
    AppointmentTypeInfo { id: "consultation", name: "Consultation", duration_minutes: 30, price_usd: 75 },
    AppointmentTypeInfo { id: "emergency", name: "Emergency Visit", duration_minutes: 30, price_usd: 150 },
];

pub fn appointment_type_by_id(id: &str) -> Option<&'static AppointmentTypeInfo> {
    APPOINTMENT_TYPES.iter().find(|info| info.id == id)
}

impl AppointmentTypeInfo {
    pub fn spoken_duration(&self) -> String {
        format!("{} min", self.duration_minutes)
    }

    pub fn spoken_price(&self) -> String {
        format!("${}", self.price_usd)
    }
}

/// Display reason used when neither an appointment-type code nor a caller
/// reason is usable.
pub const DEFAULT_REASON: &str = "General consultation";

/// Email snapshot fallbacks for unrecognized appointment-type codes.
pub const DEFAULT_DURATION: &str = "30 min";
pub const DEFAULT_PRICE: &str = "$120";

// ==============================================================================
// NOTIFICATION PAYLOAD
// ==============================================================================

/// Wire payload for the confirmation-email collaborator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentEmail {
    pub user_email: String,
    pub doctor_name: String,
    pub appointment_date: String,
    pub appointment_time: String,
    pub appointment_type: String,
    pub duration: String,
    pub price: String,
}
