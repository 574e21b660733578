use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Internal user row as returned by the user store. The voice platform only
/// ever hands us the external `clerk_id`; everything else stays server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub clerk_id: String,
    pub email: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}
