//! HTTP handlers for the build API

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::error::ApiError;
use crate::clock;
use crate::error::ValidationError;
use crate::store::{Record, RecordStore};

/// Shared application state
pub type AppState = Arc<RecordStore>;

/// Response for a single record lookup
#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub success: bool,
    pub data: Record,
    pub id: String,
}

/// Response for the record listing
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub data: Vec<Record>,
    pub count: usize,
}

/// Response for a stored build
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub success: bool,
    pub message: &'static str,
    pub id: String,
    pub build: Record,
    /// Lifetime in words, e.g. "2 hours"
    pub expires_in: String,
    /// Expiry instant, RFC 3339
    pub expires_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsBody {
    pub total: usize,
    pub active: usize,
    pub expiring_soon: usize,
    pub record_lifetime: String,
    pub next_cleanup: String,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: StatsBody,
}

/// Fetch one live record
pub async fn get_record(
    State(store): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RecordResponse>, ApiError> {
    debug!("Fetching record {}", id);

    let record = store.get(&id).await?;

    Ok(Json(RecordResponse {
        success: true,
        data: record,
        id,
    }))
}

/// List all live records
pub async fn list_records(State(store): State<AppState>) -> Json<ListResponse> {
    let records = store.list().await;
    debug!("Listing {} records", records.len());

    Json(ListResponse {
        success: true,
        count: records.len(),
        data: records,
    })
}

/// Store a new build
///
/// The body is parsed by hand so that empty and malformed bodies get the
/// same JSON error envelope as every other failure.
pub async fn create_record(
    State(store): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::Store(ValidationError::EmptyPayload.into()));
    }

    let payload = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err(ApiError::InvalidBody("expected a JSON object".to_string())),
        Err(e) => return Err(ApiError::InvalidBody(e.to_string())),
    };

    let record = store.insert(payload).await?;
    debug!("Created record {}", record.id);

    let response = CreatedResponse {
        success: true,
        message: "Build saved",
        id: record.id.clone(),
        expires_in: clock::humanize(store.lifetime()),
        expires_at: clock::to_iso(record.expires_at),
        build: record,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Store statistics, computed without evicting
pub async fn stats_handler(State(store): State<AppState>) -> Json<StatsResponse> {
    let stats = store.stats().await;

    Json(StatsResponse {
        success: true,
        stats: StatsBody {
            total: stats.total,
            active: stats.active,
            expiring_soon: stats.expiring_soon,
            record_lifetime: clock::humanize(stats.record_lifetime),
            next_cleanup: clock::to_iso(stats.next_cleanup),
        },
    })
}

/// Fallback for unmatched routes
pub async fn not_found_handler() -> ApiError {
    ApiError::RouteNotFound
}
