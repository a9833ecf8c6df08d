use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use models::{Invitation, NewInvitation};
use serde_json::{json, Value};

use crate::errors::ApiError;
use crate::extract::Payload;
use crate::state::AppState;

pub async fn create_invitation(
    State(state): State<AppState>,
    Payload(new): Payload<NewInvitation>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let invitation = state.invitations.create(new).await?;
    Ok((StatusCode::CREATED, Json(json!({ "message": "Invitation created successfully", "data": invitation }))))
}

pub async fn list_invitations(State(state): State<AppState>) -> Result<Json<Vec<Invitation>>, ApiError> {
    Ok(Json(state.invitations.list().await?))
}

pub async fn accept_invitation(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    state.invitations.accept(&id).await?;
    Ok(Json(json!({ "message": "Invitation accepted" })))
}
