use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use models::errors::ModelError;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{error, warn};

/// Error returned by every handler; rendered as `{"error": .., "kind": ..}`.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub ServiceError);

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self { Self(ServiceError::Validation(msg.into())) }

    fn parts(&self) -> (StatusCode, &'static str, String) {
        match &self.0 {
            ServiceError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation", msg.clone()),
            ServiceError::Model(ModelError::Validation(msg)) => (StatusCode::BAD_REQUEST, "validation", msg.clone()),
            ServiceError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ServiceError::Upstream(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "upstream", msg.clone()),
            ServiceError::UpstreamStatus { status, message } => {
                // Forward client and server errors only; anything else from upstream is ours.
                let status = StatusCode::from_u16(*status)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, "upstream", message.clone())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, msg) = self.parts();
        if kind == "upstream" {
            error!(%status, error = %msg, "upstream failure");
        } else {
            warn!(%status, kind, error = %msg, "request rejected");
        }
        (status, Json(serde_json::json!({ "error": msg, "kind": kind }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_status_codes() {
        let status = |e: ServiceError| ApiError(e).into_response().status();
        assert_eq!(status(ServiceError::Validation("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status(ModelError::Validation("x".into()).into()), StatusCode::BAD_REQUEST);
        assert_eq!(status(ServiceError::not_found("Event")), StatusCode::NOT_FOUND);
        assert_eq!(status(ServiceError::Upstream("x".into())), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            status(ServiceError::UpstreamStatus { status: 403, message: "Supabase API error".into() }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status(ServiceError::UpstreamStatus { status: 302, message: "moved".into() }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
