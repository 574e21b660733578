pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::Doctor;
pub use services::directory::{find_by_name, spoken_directory, DoctorDirectoryService};
