use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;
use crate::extract::Params;
use crate::state::AppState;

/// Query string of both image endpoints. Every field is optional here so that
/// a missing one is reported by the gateway, before any outbound call.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageParams {
    pub image_url: Option<String>,
    pub dress_code: Option<String>,
    pub event_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLocation {
    pub image_url: String,
}

pub async fn save_image(
    State(state): State<AppState>,
    Params(params): Params<ImageParams>,
) -> Result<Json<ImageLocation>, ApiError> {
    let image_url = state
        .images
        .save(params.image_url.as_deref(), params.dress_code.as_deref(), params.event_type.as_deref())
        .await?;
    Ok(Json(ImageLocation { image_url }))
}

pub async fn get_image(
    State(state): State<AppState>,
    Params(params): Params<ImageParams>,
) -> Result<Json<ImageLocation>, ApiError> {
    let image_url = state
        .images
        .find_latest(params.dress_code.as_deref(), params.event_type.as_deref())
        .await?;
    Ok(Json(ImageLocation { image_url }))
}
