use std::fmt;

use serde::{Deserialize, Serialize};

pub const IMAGE_EXTENSION: &str = ".png";
pub const IMAGE_CONTENT_TYPE: &str = "image/png";

/// One entry of a storage bucket listing. Listing metadata other than the
/// object name is ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub name: String,
}

/// Deterministic object name `{dress_code}-{event_type}-{unix_seconds}.png`.
///
/// The embedded timestamp keeps names unique per second and lets the newest
/// image for a pair be found by comparing timestamps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageName {
    pub dress_code: String,
    pub event_type: String,
    pub timestamp: i64,
}

impl ImageName {
    pub fn new(dress_code: impl Into<String>, event_type: impl Into<String>, timestamp: i64) -> Self {
        Self { dress_code: dress_code.into(), event_type: event_type.into(), timestamp }
    }

    /// Prefix shared by every image of a dress-code/event-type pair.
    pub fn prefix(dress_code: &str, event_type: &str) -> String {
        format!("{dress_code}-{event_type}-")
    }

    /// Recover the timestamp from `name` if it was produced for this pair.
    ///
    /// Only exact `{prefix}{digits}.png` names qualify, so `"Neon Glow-party"`
    /// does not pick up `"Super Neon Glow-party-..."` or `"Neon Glow-party-night-..."`.
    pub fn parse_timestamp(name: &str, dress_code: &str, event_type: &str) -> Option<i64> {
        let rest = name.strip_prefix(&Self::prefix(dress_code, event_type))?;
        let digits = rest.strip_suffix(IMAGE_EXTENSION)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

impl fmt::Display for ImageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}{}", self.dress_code, self.event_type, self.timestamp, IMAGE_EXTENSION)
    }
}
