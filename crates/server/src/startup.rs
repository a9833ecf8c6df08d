use std::time::Duration;

use axum::Router;
use configs::AppConfig;
use service::seed::seed_dress_codes;
use service::supabase::{build_http_client, SupabaseBackends};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::routes;
use crate::state::AppState;

const SEED_DELAY: Duration = Duration::from_secs(2);

/// Wire the router to the Supabase-backed gateways.
pub fn build_app(cfg: &AppConfig, http: reqwest::Client) -> anyhow::Result<Router> {
    let backends = SupabaseBackends::connect(&cfg.supabase, http)?;
    routes::build_router(AppState::from_backends(backends), &cfg.server.frontend_url)
}

/// Seed through the public API once the listener is accepting connections.
fn spawn_seed(http: reqwest::Client, backend_url: String) {
    tokio::spawn(async move {
        tokio::time::sleep(SEED_DELAY).await;
        match seed_dress_codes(&http, &backend_url).await {
            Ok(n) => info!(seeded = n, "dress code seeding finished"),
            Err(e) => warn!(error = %e, "dress code seeding skipped"),
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("received Ctrl+C, shutting down");
}

/// Public entry: build the app and serve until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let http = build_http_client(&cfg.http)?;
    let app = build_app(&cfg, http.clone())?;

    let addr = cfg.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, frontend = %cfg.server.frontend_url, bucket = %cfg.supabase.bucket, "listening");

    if cfg.seed.enabled {
        spawn_seed(http, cfg.seed.backend_url.clone());
    }

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}
