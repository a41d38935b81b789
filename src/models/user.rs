//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::time_utils::fixed_precision;

/// User profile stored in Firestore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Internal user ID (also used as document ID)
    pub id: String,
    /// Google account subject; `None` for accounts created before federation
    #[serde(default)]
    pub external_identity_id: Option<String>,
    /// Email address, used as a fallback join key when linking identities
    pub email: String,
    /// Display name
    pub display_name: String,
    /// Profile picture URL
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// When the user first signed in
    #[serde(with = "fixed_precision")]
    pub created_at: DateTime<Utc>,
    /// Last successful sign-in
    #[serde(with = "fixed_precision")]
    pub last_login_at: DateTime<Utc>,
}

/// Public view of a user, as returned by the auth endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "mobile/src/generated/")
)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.display_name.clone(),
            picture: user.avatar_url.clone(),
        }
    }
}
