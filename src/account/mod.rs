/// Account directory
///
/// Registration, authentication, and profile management over the user table.

mod manager;

pub use manager::AccountManager;

use serde::{Deserialize, Serialize};

/// Default image URLs applied at registration and restored by the reset operations
pub const DEFAULT_PROFILE_IMAGE_URL: &str =
    "https://res.cloudinary.com/demo/image/upload/v1/default-profile.png";
pub const DEFAULT_BACKGROUND_IMAGE_URL: &str =
    "https://res.cloudinary.com/demo/image/upload/v1/default-background.jpg";

/// Full account view with resolved name strings
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_image_url: String,
    pub background_image_url: String,
}

/// Partial profile update
///
/// Absent and empty fields both leave the stored value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub profile_image_url: Option<String>,
    pub background_image_url: Option<String>,
}
