use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::serde_helpers::{id_as_string, null_as_empty};

/// A stored row of the `events` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub user_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub startdate: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub enddate: String,
    #[serde(rename = "startTime", default, deserialize_with = "null_as_empty")]
    pub start_time: String,
    #[serde(rename = "endTime", default, deserialize_with = "null_as_empty")]
    pub end_time: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub dress_code: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// Stays `null` until an image has been generated for the event.
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub outfit_suggestion: Option<String>,
}

/// Client-supplied event fields.
///
/// Decoding is lenient: absent fields fall back to empty values and unknown
/// fields (including a client-sent `id` or `created_at`) are dropped, so the
/// insert never carries values the data service owns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub user_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub startdate: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub enddate: String,
    #[serde(rename = "startTime", default, deserialize_with = "null_as_empty")]
    pub start_time: String,
    #[serde(rename = "endTime", default, deserialize_with = "null_as_empty")]
    pub end_time: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub dress_code: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub outfit_suggestion: Option<String>,
}

impl Event {
    /// True when every client-supplied field equals the one in `new`.
    pub fn matches(&self, new: &NewEvent) -> bool {
        self.user_id == new.user_id
            && self.name == new.name
            && self.startdate == new.startdate
            && self.enddate == new.enddate
            && self.start_time == new.start_time
            && self.end_time == new.end_time
            && self.dress_code == new.dress_code
            && self.description == new.description
            && self.image_url == new.image_url
            && self.outfit_suggestion == new.outfit_suggestion
    }
}
