pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod speech;

pub use models::{AppointmentStatus, APPOINTMENT_TYPES, TIME_SLOTS};
