//! # Checkout Routes
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /v1/scan-barcode?sale_id=..&branch_id=..&barcode=..               │
//! │       one more unit of the product on the sale        ──► 201 outcome   │
//! │                                                                         │
//! │  POST /v1/do-sale?sale_id=..&branch_id=..                               │
//! │       payments into shift ledger, stock deducted,                       │
//! │       sale finished                                   ──► 201 summary   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both run as a single database transaction in `market-db`; a failure
//! leaves nothing half-applied.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use market_core::validation::validate_barcode;
use market_db::{CompletedSale, ScanOutcome};

use crate::error::{ApiError, ApiResult};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ScanQuery {
    #[serde(default)]
    pub sale_id: String,
    #[serde(default)]
    pub branch_id: String,
    #[serde(default)]
    pub barcode: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DoSaleQuery {
    #[serde(default)]
    pub sale_id: String,
    #[serde(default)]
    pub branch_id: String,
}

fn ensure_ids(sale_id: &str, branch_id: &str) -> ApiResult<()> {
    Uuid::parse_str(sale_id).map_err(|_| ApiError::bad_request("sale id is not uuid"))?;
    Uuid::parse_str(branch_id).map_err(|_| ApiError::bad_request("branch id is not uuid"))?;
    Ok(())
}

pub async fn scan_barcode(
    State(state): State<AppState>,
    query: Result<Query<ScanQuery>, QueryRejection>,
) -> ApiResult<ApiResponse<ScanOutcome>> {
    let Query(query) = query?;
    ensure_ids(&query.sale_id, &query.branch_id)?;
    validate_barcode(&query.barcode)?;

    let outcome = state
        .db
        .checkout()
        .scan_barcode(&query.sale_id, &query.branch_id, &query.barcode)
        .await?;

    Ok(ApiResponse::created(outcome))
}

pub async fn do_sale(
    State(state): State<AppState>,
    query: Result<Query<DoSaleQuery>, QueryRejection>,
) -> ApiResult<ApiResponse<CompletedSale>> {
    let Query(query) = query?;
    ensure_ids(&query.sale_id, &query.branch_id)?;

    let completed = state
        .db
        .checkout()
        .complete_sale(&query.sale_id, &query.branch_id)
        .await?;

    info!(
        sale_id = %completed.sale.id,
        lines = completed.deductions.len(),
        "Sale completed via API"
    );

    Ok(ApiResponse::created(completed))
}
