use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use models::{Event, NewEvent};
use serde_json::{json, Value};

use crate::errors::ApiError;
use crate::extract::Payload;
use crate::state::AppState;

pub async fn create_event(
    State(state): State<AppState>,
    Payload(new): Payload<NewEvent>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let event = state.events.create(new).await?;
    Ok((StatusCode::CREATED, Json(json!({ "message": "Event created successfully", "data": event }))))
}

pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, ApiError> {
    Ok(Json(state.events.list().await?))
}

pub async fn get_event(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Event>, ApiError> {
    Ok(Json(state.events.get(&id).await?))
}

pub async fn delete_event(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    state.events.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
