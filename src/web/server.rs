//! HTTP server implementation

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use super::handlers::{
    create_record, get_record, list_records, not_found_handler, stats_handler,
};
use crate::store::RecordStore;

/// Route directory returned on unmatched requests
pub const AVAILABLE_ROUTES: [&str; 4] = [
    "GET /api/data/:id - Fetch a build by id",
    "GET /api/data - List all builds",
    "POST /api/data - Store a new build (removed automatically after its lifetime)",
    "GET /api/stats - Store statistics",
];

/// Build the application router
pub fn router(store: Arc<RecordStore>) -> Router {
    // Known paths with an unsupported method get the same 404 directory
    Router::new()
        .route(
            "/api/data",
            get(list_records)
                .post(create_record)
                .fallback(not_found_handler),
        )
        .route("/api/data/:id", get(get_record).fallback(not_found_handler))
        .route("/api/stats", get(stats_handler).fallback(not_found_handler))
        .fallback(not_found_handler)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CorsLayer::permissive())
        .with_state(store)
}

/// Run the web server until `shutdown` resolves
pub async fn run_web_server<F>(
    addr: &str,
    store: Arc<RecordStore>,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(store);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API listening on http://{}", addr);
    for route in AVAILABLE_ROUTES {
        info!("  {}", route);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    };
    error!("Unhandled error in handler: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "error": "Internal server error",
        })),
    )
        .into_response()
}
