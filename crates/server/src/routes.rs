use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod dress_codes;
pub mod events;
pub mod images;
pub mod invitations;

const ALLOWED_METHODS: [Method; 5] = [Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS];
const ALLOWED_METHODS_VALUE: &str = "GET,POST,PUT,DELETE,OPTIONS";
const ALLOWED_HEADERS_VALUE: &str = "Origin, Content-Type, Accept, Authorization";

pub async fn index() -> &'static str {
    "Backend API is running!"
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "Not found", "kind": "not_found" })))
}

fn frontend_origin(frontend_url: &str) -> anyhow::Result<HeaderValue> {
    Ok(HeaderValue::from_str(frontend_url.trim_end_matches('/'))?)
}

/// CORS for the single configured frontend origin, with credentials.
pub fn build_cors(frontend_url: &str) -> anyhow::Result<CorsLayer> {
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::exact(frontend_origin(frontend_url)?))
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .allow_credentials(true))
}

/// `OPTIONS` under `/api` without an `Origin` header is answered ahead of the
/// CORS layer: 204 with the configured origin, methods and headers.
async fn answer_options(State(origin): State<HeaderValue>, req: Request, next: Next) -> Response {
    let plain_options = req.method() == Method::OPTIONS
        && req.uri().path().starts_with("/api/")
        && !req.headers().contains_key(header::ORIGIN);
    if !plain_options {
        return next.run(req).await;
    }
    let mut resp = StatusCode::NO_CONTENT.into_response();
    let headers = resp.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOWED_METHODS_VALUE));
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOWED_HEADERS_VALUE));
    resp
}

/// Preflights answered by the CORS layer come back as 204 instead of 200.
async fn preflight_no_content(req: Request, next: Next) -> Response {
    let is_options = req.method() == Method::OPTIONS;
    let mut resp = next.run(req).await;
    if is_options && resp.status() == StatusCode::OK {
        *resp.status_mut() = StatusCode::NO_CONTENT;
    }
    resp
}

/// Routing answers a known path with the wrong method by an empty 405; give it
/// the JSON error body, keeping `Allow`.
async fn method_not_allowed_json(resp: Response) -> Response {
    if resp.status() != StatusCode::METHOD_NOT_ALLOWED {
        return resp;
    }
    let allow = resp.headers().get(header::ALLOW).cloned();
    let body = serde_json::json!({ "error": "Method not allowed", "kind": "validation" });
    let mut out = (StatusCode::METHOD_NOT_ALLOWED, Json(body)).into_response();
    if let Some(allow) = allow {
        out.headers_mut().insert(header::ALLOW, allow);
    }
    out
}

/// Build the full application router for the given frontend origin.
pub fn build_router(state: AppState, frontend_url: &str) -> anyhow::Result<Router> {
    let origin = frontend_origin(frontend_url)?;
    let cors = build_cors(frontend_url)?;

    let api = Router::new()
        .route("/api/events", get(events::list_events).post(events::create_event))
        .route("/api/events/:id", get(events::get_event).delete(events::delete_event))
        .route("/api/invitations", get(invitations::list_invitations).post(invitations::create_invitation))
        .route("/api/invitations/:id/accept", post(invitations::accept_invitation))
        .route("/api/dresscodes", get(dress_codes::list_dress_codes).post(dress_codes::insert_dress_code))
        .route("/api/saveImage", post(images::save_image))
        .route("/api/getImage", get(images::get_image));

    Ok(Router::new()
        .route("/", get(index))
        .merge(api)
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::map_response(method_not_allowed_json))
        .layer(cors)
        .layer(middleware::from_fn_with_state(origin, answer_options))
        .layer(middleware::from_fn(preflight_no_content))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        ))
}
