//! Mapping of store errors onto HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use super::server::AVAILABLE_ROUTES;
use crate::error::{StoreError, ValidationError};

/// Errors returned by the HTTP handlers
#[derive(Debug)]
pub enum ApiError {
    /// Failure coming from the record store
    Store(StoreError),
    /// The body could not be read as a JSON object
    InvalidBody(String),
    /// No route matched the request
    RouteNotFound,
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Store(StoreError::Validation(ValidationError::MissingFields(fields))) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "success": false,
                    "error": "Missing required fields",
                    "missingFields": fields,
                }),
            ),
            ApiError::Store(StoreError::Validation(ValidationError::EmptyPayload)) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "success": false,
                    "error": "No build data was sent",
                }),
            ),
            ApiError::Store(StoreError::NotFound(id)) => (
                StatusCode::NOT_FOUND,
                json!({
                    "success": false,
                    "error": "Record not found or expired",
                    "id": id,
                }),
            ),
            ApiError::Store(StoreError::Persistence(message)) => {
                error!("Persistence failure: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "success": false,
                        "error": "Error saving build",
                    }),
                )
            }
            ApiError::InvalidBody(reason) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "success": false,
                    "error": format!("Invalid build data: {}", reason),
                }),
            ),
            ApiError::RouteNotFound => (
                StatusCode::NOT_FOUND,
                json!({
                    "success": false,
                    "error": "Route not found",
                    "availableRoutes": AVAILABLE_ROUTES,
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
