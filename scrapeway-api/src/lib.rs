//! HTTP surface of the scraper.
//!
//! - `GET /` answers with a welcome message (no auth)
//! - `POST /scrape-public` runs one scrape, guarded by the `x-api-key` header

pub mod auth;
pub mod error;

use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Json, Router,
};
use scrapeway_web::{Orchestrator, ScrapedItem};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub use auth::API_KEY_HEADER;
pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub api_key: Arc<str>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, api_key: impl Into<Arc<str>>) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            api_key: api_key.into(),
        }
    }
}

fn default_num_results() -> usize {
    5
}

#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    pub query: String,
    #[serde(default = "default_num_results")]
    pub num_results: usize,
}

#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub status: &'static str,
    pub data: Vec<ScrapedItem>,
}

#[derive(Debug, Serialize)]
struct Welcome {
    message: &'static str,
}

pub fn router(state: AppState) -> Router {
    let scrape = post(scrape_public).route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::require_api_key,
    ));

    Router::new()
        .route("/", get(root))
        .route("/scrape-public", scrape)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Welcome> {
    Json(Welcome {
        message: "Welcome to the Public Scraper API.",
    })
}

async fn scrape_public(
    State(state): State<AppState>,
    Json(req): Json<ScrapeRequest>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    info!(
        target: "api",
        query = %req.query,
        num_results = req.num_results,
        "scrape requested"
    );
    let data = state
        .orchestrator
        .run(&req.query, req.num_results)
        .await
        .inspect_err(|e| error!(target: "api", error = %e, "scrape failed"))?;
    Ok(Json(ScrapeResponse {
        status: "success",
        data,
    }))
}

/// Bind `addr` and serve until Ctrl+C or SIGTERM.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(target: "api", %addr, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(target: "api", "server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(target: "api", error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(target: "api", error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!(target: "api", "received Ctrl+C, shutting down"),
        _ = terminate => info!(target: "api", "received SIGTERM, shutting down"),
    }
}
