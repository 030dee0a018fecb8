use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use platter_common::api::ValidationError;
use platter_common::session::SessionError;

use crate::store::StoreError;

/// Errors surfaced to HTTP callers. Each kind keeps its own status code so
/// clients can tell "fix the request" from "try again later".
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("insufficient stock: {available} available, {requested} requested")]
    InsufficientStock { available: u32, requested: u32 },

    #[error("not signed in: {0}")]
    Unauthorized(#[from] SessionError),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::FoodNotFound(_) | StoreError::PurchaseNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            StoreError::DuplicateEmail(_)
            | StoreError::DuplicateFoodName(_)
            | StoreError::InvalidTransition { .. } => ApiError::Conflict(err.to_string()),
            StoreError::InsufficientStock {
                available,
                requested,
            } => ApiError::InsufficientStock {
                available,
                requested,
            },
            StoreError::Unavailable(msg) => ApiError::Unavailable(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) | ApiError::InsufficientStock { .. } => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let body = match &self {
            // Stock rejections carry the numbers so the buyer can retry
            // with a smaller quantity.
            ApiError::InsufficientStock {
                available,
                requested,
            } => json!({
                "error": self.to_string(),
                "available": available,
                "requested": requested,
            }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
