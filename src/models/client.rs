//! Trainer client model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::time_utils::fixed_precision;

/// A client on a trainer's roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "mobile/src/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Client ID (also used as document ID)
    pub id: String,
    /// Trainer who owns this record
    pub owner_id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Prepaid sessions left. Display only; booking does not decrement it.
    #[serde(default)]
    pub sessions_remaining: u32,
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub sessions_expiry_date: Option<DateTime<Utc>>,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    #[serde(with = "fixed_precision")]
    pub created_at: DateTime<Utc>,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    #[serde(with = "fixed_precision")]
    pub updated_at: DateTime<Utc>,
}

/// Validated fields for a new client.
#[derive(Debug, Clone)]
pub struct NewClient {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub sessions_remaining: u32,
    pub sessions_expiry_date: Option<DateTime<Utc>>,
}

impl NewClient {
    pub fn into_client(self, owner_id: &str, now: DateTime<Utc>) -> Client {
        Client {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            name: self.name,
            email: self.email,
            phone: self.phone,
            sessions_remaining: self.sessions_remaining,
            sessions_expiry_date: self.sessions_expiry_date,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update; `None` leaves the field unchanged. For the optional
/// fields `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub sessions_remaining: Option<u32>,
    pub sessions_expiry_date: Option<Option<DateTime<Utc>>>,
}

impl ClientPatch {
    pub fn apply(self, client: &mut Client, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            client.name = name;
        }
        if let Some(email) = self.email {
            client.email = email;
        }
        if let Some(phone) = self.phone {
            client.phone = phone;
        }
        if let Some(remaining) = self.sessions_remaining {
            client.sessions_remaining = remaining;
        }
        if let Some(expiry) = self.sessions_expiry_date {
            client.sessions_expiry_date = expiry;
        }
        client.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_clears_only_named_fields() {
        let now = Utc::now();
        let mut client = NewClient {
            name: "Maya".to_string(),
            email: Some("maya@example.com".to_string()),
            phone: Some("555-0100".to_string()),
            sessions_remaining: 4,
            sessions_expiry_date: Some(now),
        }
        .into_client("trainer-1", now);

        ClientPatch {
            phone: Some(None),
            sessions_expiry_date: Some(None),
            ..Default::default()
        }
        .apply(&mut client, now);

        assert_eq!(client.phone, None);
        assert_eq!(client.sessions_expiry_date, None);
        assert_eq!(client.email.as_deref(), Some("maya@example.com"));
        assert_eq!(client.sessions_remaining, 4);
    }
}
