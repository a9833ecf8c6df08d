use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use server::routes::build_router;
use server::AppState;
use service::memory::{MemoryImageFetcher, MemoryObjectStore, MemoryTableStore, StepClock};
use tower::ServiceExt;

const ORIGIN: &str = "http://localhost:5173";
const SOURCE: &str = "https://images.example.com/gen/abc.png";

struct TestApp {
    router: Router,
    tables: Arc<MemoryTableStore>,
    objects: Arc<MemoryObjectStore>,
    fetcher: Arc<MemoryImageFetcher>,
}

fn app() -> anyhow::Result<TestApp> {
    let tables = Arc::new(MemoryTableStore::new());
    let objects = Arc::new(MemoryObjectStore::default());
    let fetcher = Arc::new(MemoryImageFetcher::new().with_image(SOURCE, vec![1, 2, 3]));
    let state = AppState::new(tables.clone(), objects.clone(), fetcher.clone(), Arc::new(StepClock::new(1_700_000_000, 1)));
    let router = build_router(state, ORIGIN)?;
    Ok(TestApp { router, tables, objects, fetcher })
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&v)?)
        }
        None => Body::empty(),
    };
    let resp = router.clone().oneshot(req.body(body)?).await?;
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    Ok((status, value))
}

#[tokio::test]
async fn root_reports_running() -> anyhow::Result<()> {
    let app = app()?;
    let resp = app.router.clone().oneshot(Request::get("/").body(Body::empty())?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    assert_eq!(&bytes[..], b"Backend API is running!");
    Ok(())
}

#[tokio::test]
async fn event_lifecycle() -> anyhow::Result<()> {
    let app = app()?;
    let (status, list) = send(&app.router, Method::GET, "/api/events", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([]));

    let payload = json!({
        "user_id": "user-1",
        "name": "Office Party",
        "startdate": "2025-12-12",
        "enddate": "2025-12-12",
        "startTime": "18:00",
        "endTime": "23:00",
        "dress_code": "Corporate Chic",
        "description": "End of year",
        "unexpected": true
    });
    let (status, created) = send(&app.router, Method::POST, "/api/events", Some(payload)).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["message"], "Event created successfully");
    let id = created["data"]["id"].as_str().unwrap_or_default().to_string();
    assert!(!id.is_empty());
    assert!(app.tables.rows("events")[0].get("unexpected").is_none());

    let (status, fetched) = send(&app.router, Method::GET, &format!("/api/events/{id}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Office Party");
    assert_eq!(fetched["startTime"], "18:00");
    assert_eq!(fetched["created_at"], created["data"]["created_at"]);

    for _ in 0..2 {
        let (status, _) = send(&app.router, Method::DELETE, &format!("/api/events/{id}"), None).await?;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
    let (status, body) = send(&app.router, Method::GET, &format!("/api/events/{id}"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
    Ok(())
}

#[tokio::test]
async fn malformed_event_body_is_bad_request() -> anyhow::Result<()> {
    let app = app()?;
    let req = Request::post("/api/events")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))?;
    let resp = app.router.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.tables.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn data_service_failure_is_500() -> anyhow::Result<()> {
    let app = app()?;
    app.tables.set_failing(true);
    let (status, body) = send(&app.router, Method::GET, "/api/events", None).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "upstream");
    Ok(())
}

#[tokio::test]
async fn invitation_accept_flow() -> anyhow::Result<()> {
    let app = app()?;
    let (status, created) =
        send(&app.router, Method::POST, "/api/invitations", Some(json!({"event_id": "e1", "user_id": "u2"}))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["status"], "pending");
    let id = created["data"]["id"].as_str().unwrap_or_default().to_string();

    for _ in 0..2 {
        let (status, body) = send(&app.router, Method::POST, &format!("/api/invitations/{id}/accept"), None).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Invitation accepted"}));
    }
    let (_, list) = send(&app.router, Method::GET, "/api/invitations", None).await?;
    assert_eq!(list[0]["status"], "accepted");

    let (status, _) = send(&app.router, Method::POST, "/api/invitations/unknown/accept", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn dress_codes_filter_by_event_type() -> anyhow::Result<()> {
    let app = app()?;
    for (name, event_type) in [("Neon Glow", "party"), ("Great Gatsby", "party"), ("Corporate Chic", "business")] {
        let (status, body) =
            send(&app.router, Method::POST, "/api/dresscodes", Some(json!({"name": name, "event_type": event_type}))).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Dress code added successfully");
    }

    let (_, party) = send(&app.router, Method::GET, "/api/dresscodes?eventType=party", None).await?;
    assert_eq!(party, json!([
        {"name": "Neon Glow", "event_type": "party"},
        {"name": "Great Gatsby", "event_type": "party"}
    ]));
    let (_, all) = send(&app.router, Method::GET, "/api/dresscodes", None).await?;
    assert_eq!(all.as_array().map(Vec::len), Some(3));
    Ok(())
}

#[tokio::test]
async fn dress_code_with_unknown_field_is_rejected() -> anyhow::Result<()> {
    let app = app()?;
    let (status, body) =
        send(&app.router, Method::POST, "/api/dresscodes", Some(json!({"name": "X", "event_type": "y", "color": "red"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
    assert_eq!(app.tables.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn save_then_get_image() -> anyhow::Result<()> {
    let app = app()?;
    let uri = format!("/api/saveImage?imageUrl={}&dressCode=Neon%20Glow&eventType=party", SOURCE);
    let (status, saved) = send(&app.router, Method::POST, &uri, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        saved["imageUrl"],
        "http://localhost:54321/storage/v1/object/public/event-images/Neon%20Glow-party-1700000000.png"
    );
    assert_eq!(app.objects.names(), vec!["Neon Glow-party-1700000000.png".to_string()]);

    let (status, found) = send(&app.router, Method::GET, "/api/getImage?dressCode=Neon+Glow&eventType=party", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found, saved);

    let (status, body) = send(&app.router, Method::GET, "/api/getImage?dressCode=Neon+Glow&eventType=date", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Image not found");
    Ok(())
}

#[tokio::test]
async fn missing_image_params_make_no_outbound_calls() -> anyhow::Result<()> {
    let app = app()?;
    let (status, body) = send(&app.router, Method::POST, "/api/saveImage?dressCode=Neon%20Glow", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing imageUrl, dressCode, or eventType");

    let (status, body) = send(&app.router, Method::GET, "/api/getImage?eventType=party", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing dressCode or eventType");

    assert_eq!(app.fetcher.calls(), 0);
    assert_eq!(app.objects.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn cors_preflight_is_204_with_allowed_origin() -> anyhow::Result<()> {
    let app = app()?;
    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/events")
        .header(header::ORIGIN, ORIGIN)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())?;
    let resp = app.router.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let headers = resp.headers();
    assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).and_then(|v| v.to_str().ok()), Some(ORIGIN));
    assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).and_then(|v| v.to_str().ok()), Some("true"));
    let methods = headers
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(methods.contains("DELETE"), "{methods}");
    Ok(())
}

#[tokio::test]
async fn plain_options_under_api_is_204_with_allow_headers() -> anyhow::Result<()> {
    let app = app()?;
    let req = Request::builder().method(Method::OPTIONS).uri("/api/invitations/42/accept").body(Body::empty())?;
    let resp = app.router.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let header_str = |name: header::HeaderName| resp.headers().get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
    assert_eq!(header_str(header::ACCESS_CONTROL_ALLOW_ORIGIN).as_deref(), Some(ORIGIN));
    assert_eq!(header_str(header::ACCESS_CONTROL_ALLOW_METHODS).as_deref(), Some("GET,POST,PUT,DELETE,OPTIONS"));
    assert_eq!(
        header_str(header::ACCESS_CONTROL_ALLOW_HEADERS).as_deref(),
        Some("Origin, Content-Type, Accept, Authorization")
    );
    Ok(())
}

#[tokio::test]
async fn undecodable_query_is_json_bad_request() -> anyhow::Result<()> {
    let app = app()?;
    for uri in [
        "/api/getImage?dressCode=a&dressCode=b&eventType=party",
        "/api/dresscodes?eventType=a&eventType=b",
    ] {
        let (status, body) = send(&app.router, Method::GET, uri, None).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["kind"], "validation", "{uri}");
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()), "{uri}");
    }
    assert_eq!(app.objects.calls(), 0);
    assert_eq!(app.tables.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn wrong_method_is_json_405() -> anyhow::Result<()> {
    let app = app()?;
    let req = Request::builder().method(Method::PUT).uri("/api/events").body(Body::empty())?;
    let resp = app.router.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    let allow = resp.headers().get(header::ALLOW).and_then(|v| v.to_str().ok()).unwrap_or_default().to_string();
    assert!(allow.contains("GET") && allow.contains("POST"), "{allow}");
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["error"], "Method not allowed");
    assert_eq!(body["kind"], "validation");
    Ok(())
}

#[tokio::test]
async fn cross_origin_response_echoes_configured_origin() -> anyhow::Result<()> {
    let app = app()?;
    let req = Request::get("/api/events").header(header::ORIGIN, ORIGIN).body(Body::empty())?;
    let resp = app.router.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).and_then(|v| v.to_str().ok()),
        Some(ORIGIN)
    );
    Ok(())
}

#[tokio::test]
async fn unknown_route_is_json_404() -> anyhow::Result<()> {
    let app = app()?;
    let (status, body) = send(&app.router, Method::GET, "/api/nothing", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
    Ok(())
}
