//! Shared-secret check for the scrape endpoint.
//!
//! Runs as route middleware so the key is verified before the request body
//! is read and before any browser work starts.
use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

pub const API_KEY_HEADER: &str = "x-api-key";

pub async fn require_api_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let presented = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if presented != Some(state.api_key.as_ref()) {
        warn!(target: "api", path = %req.uri().path(), "rejected request with invalid API key");
        return Err(ApiError::InvalidApiKey);
    }

    Ok(next.run(req).await)
}
