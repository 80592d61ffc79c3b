use serde::{Deserialize, Serialize};

/// Storage model for a platform user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier (hyphenated UUID)
    pub id: String,

    /// Email address
    pub email: String,

    /// Optional first name
    pub first_name: Option<String>,

    /// Optional last name
    pub last_name: Option<String>,

    /// Identifier assigned by the integrating application
    pub external_user_id: Option<String>,

    /// When the user was created (stored timestamp format)
    pub created_at: String,
}
