//! Shift ledger routes.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use market_core::requests::{CreateTransaction, TransactionFilter, UpdateTransaction};
use market_core::validation::validate_optional_uuid;
use market_core::{ListPage, Transaction};

use super::{ensure_rows_affected, ensure_uuid, parse_page};
use crate::error::{ApiError, ApiResult};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TransactionListQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub shift_id: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateTransaction>, JsonRejection>,
) -> ApiResult<ApiResponse<Transaction>> {
    let Json(req) = payload?;
    req.validate()?;

    let transaction = state.db.transactions().create(&req).await?;
    info!(id = %transaction.id, shift_id = %transaction.shift_id, "Shift ledger created");

    Ok(ApiResponse::created(transaction))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<Transaction>> {
    ensure_uuid(&id)?;

    let transaction = state
        .db
        .transactions()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Transaction", &id))?;

    Ok(ApiResponse::ok(transaction))
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<TransactionListQuery>, QueryRejection>,
) -> ApiResult<ApiResponse<ListPage<Transaction>>> {
    let Query(query) = query?;
    validate_optional_uuid("shift_id", query.shift_id.as_deref())?;

    let filter = TransactionFilter {
        page: parse_page(query.limit.as_deref(), query.offset.as_deref())?,
        shift_id: query.shift_id,
    };

    let page = state.db.transactions().get_list(&filter).await?;
    Ok(ApiResponse::ok(page))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTransaction>, JsonRejection>,
) -> ApiResult<ApiResponse<Transaction>> {
    ensure_uuid(&id)?;
    let Json(req) = payload?;
    req.validate()?;

    let repo = state.db.transactions();
    ensure_rows_affected(repo.update(&id, &req).await?)?;

    let transaction = repo
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Transaction", &id))?;

    Ok(ApiResponse::accepted(transaction))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<()>> {
    ensure_uuid(&id)?;

    if state.db.transactions().delete(&id).await? == 0 {
        return Err(ApiError::not_found("Transaction", &id));
    }

    Ok(ApiResponse::no_content())
}
