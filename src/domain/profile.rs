use serde::{Deserialize, Serialize};

/// A marketplace user. The same profile acts as host (when listing
/// spaces) and renter (when booking them).
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub university: String,
    pub verification_status: String,
    pub rating: f64,
    pub total_reviews: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Partial self-update; absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub university: Option<String>,
}
