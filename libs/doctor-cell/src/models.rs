use serde::{Deserialize, Serialize};

/// Directory entry for one doctor. Ids are opaque strings owned by the
/// external store; the voice platform passes them back verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub speciality: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
}
