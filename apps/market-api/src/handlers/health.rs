//! Liveness check.

use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::error;

use crate::error::{ApiError, ApiResult};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub database: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// 200 when the database answers, 503 otherwise.
pub async fn check(State(state): State<AppState>) -> ApiResult<ApiResponse<Health>> {
    if !state.db.health_check().await {
        error!("Health check failed: database unreachable");
        return Err(ApiError::unavailable("Database is unreachable"));
    }

    Ok(ApiResponse::ok(Health {
        database: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
    }))
}
