//! Populates the dress-code table through the running API.

use models::DressCode;
use tracing::{info, warn};

use crate::errors::ServiceError;
use crate::query::{join_segments, parse_base};

pub const DEFAULT_DRESS_CODES: [(&str, &str); 6] = [
    ("Neon Glow", "party"),
    ("Great Gatsby", "party"),
    ("Elegant Formal", "business"),
    ("Corporate Chic", "business"),
    ("Romantic Red", "date"),
    ("Moonlight Dinner", "date"),
];

/// POST every default dress code to `{backend_url}/api/dresscodes`.
///
/// Each failure is logged and skipped. Returns how many inserts the API accepted.
pub async fn seed_dress_codes(http: &reqwest::Client, backend_url: &str) -> Result<usize, ServiceError> {
    let endpoint = join_segments(&parse_base(backend_url)?, &["api", "dresscodes"])?;
    let mut accepted = 0;
    for (name, event_type) in DEFAULT_DRESS_CODES {
        let code = DressCode::new(name, event_type);
        match http.post(endpoint.clone()).json(&code).send().await {
            Ok(resp) if resp.status().is_success() => {
                accepted += 1;
                info!(name, event_type, "seeded dress code");
            }
            Ok(resp) => warn!(name, event_type, status = %resp.status(), "dress code seed rejected"),
            Err(e) => warn!(name, event_type, error = %e, "dress code seed failed"),
        }
    }
    Ok(accepted)
}
