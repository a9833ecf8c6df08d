use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::serde_helpers::{id_as_string, null_as_default, null_as_empty};

/// Lifecycle of an invitation. The only transition performed here is
/// `Pending -> Accepted`; statuses written by other tools are kept as `Other`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum InvitationStatus {
    #[default]
    Pending,
    Accepted,
    Other(String),
}

impl InvitationStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "pending" => InvitationStatus::Pending,
            "accepted" => InvitationStatus::Accepted,
            other => InvitationStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Other(value) => value,
        }
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl Serialize for InvitationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Stored rows: any text is accepted, `null` reads as pending.
impl<'de> Deserialize<'de> for InvitationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?
            .map(|s| InvitationStatus::parse(&s))
            .unwrap_or_default())
    }
}

/// Client payloads may only name the statuses this service understands.
fn known_status<'de, D>(deserializer: D) -> Result<InvitationStatus, D::Error>
where
    D: Deserializer<'de>,
{
    match InvitationStatus::deserialize(deserializer)? {
        InvitationStatus::Other(value) => {
            Err(serde::de::Error::unknown_variant(&value, &["pending", "accepted"]))
        }
        known => Ok(known),
    }
}

/// A stored row of the `invitations` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Invitation {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub event_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub user_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
}

/// Client-supplied invitation fields, decoded leniently like `NewEvent`.
/// `event_id` is not checked against the events table here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewInvitation {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub event_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub user_id: String,
    #[serde(default, deserialize_with = "known_status")]
    pub status: InvitationStatus,
}
