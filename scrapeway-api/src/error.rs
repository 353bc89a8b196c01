use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use scrapeway_common::ScrapewayError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid API Key")]
    InvalidApiKey,

    #[error("An internal error occurred: {0}")]
    Internal(#[from] ScrapewayError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ErrorBody {
            detail: self.to_string(),
        });
        (status, body).into_response()
    }
}
