use axum::{extract::State, Json};
use models::DressCode;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::ApiError;
use crate::extract::{Params, Payload};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DressCodeFilter {
    #[serde(rename = "eventType")]
    pub event_type: Option<String>,
}

pub async fn list_dress_codes(
    State(state): State<AppState>,
    Params(filter): Params<DressCodeFilter>,
) -> Result<Json<Vec<DressCode>>, ApiError> {
    Ok(Json(state.dress_codes.list(filter.event_type.as_deref()).await?))
}

pub async fn insert_dress_code(
    State(state): State<AppState>,
    Payload(code): Payload<DressCode>,
) -> Result<Json<Value>, ApiError> {
    state.dress_codes.insert(code).await?;
    Ok(Json(json!({ "message": "Dress code added successfully" })))
}
