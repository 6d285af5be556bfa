//! Branch stock routes.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use market_core::requests::{CreateRemainder, RemainderFilter, UpdateRemainder};
use market_core::validation::validate_optional_uuid;
use market_core::{ListPage, Remainder};

use super::{ensure_rows_affected, ensure_uuid, parse_page};
use crate::error::{ApiError, ApiResult};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RemainderListQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub branch_id: Option<String>,
    pub barcode: Option<String>,
    #[serde(default)]
    pub search: String,
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateRemainder>, JsonRejection>,
) -> ApiResult<ApiResponse<Remainder>> {
    let Json(req) = payload?;
    req.validate()?;

    let remainder = state.db.remainders().create(&req).await?;
    info!(
        id = %remainder.id,
        branch_id = %remainder.branch_id,
        barcode = %remainder.barcode,
        quantity = remainder.quantity,
        "Stock received"
    );

    Ok(ApiResponse::created(remainder))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<Remainder>> {
    ensure_uuid(&id)?;

    let remainder = state
        .db
        .remainders()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Remainder", &id))?;

    Ok(ApiResponse::ok(remainder))
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<RemainderListQuery>, QueryRejection>,
) -> ApiResult<ApiResponse<ListPage<Remainder>>> {
    let Query(query) = query?;
    validate_optional_uuid("branch_id", query.branch_id.as_deref())?;

    let filter = RemainderFilter {
        page: parse_page(query.limit.as_deref(), query.offset.as_deref())?,
        branch_id: query.branch_id,
        barcode: query.barcode,
        search: query.search,
    };
    filter.validate()?;

    let page = state.db.remainders().get_list(&filter).await?;
    Ok(ApiResponse::ok(page))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateRemainder>, JsonRejection>,
) -> ApiResult<ApiResponse<Remainder>> {
    ensure_uuid(&id)?;
    let Json(req) = payload?;
    req.validate()?;

    let repo = state.db.remainders();
    ensure_rows_affected(repo.update(&id, &req).await?)?;

    let remainder = repo
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Remainder", &id))?;

    Ok(ApiResponse::accepted(remainder))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<()>> {
    ensure_uuid(&id)?;

    if state.db.remainders().delete(&id).await? == 0 {
        return Err(ApiError::not_found("Remainder", &id));
    }

    Ok(ApiResponse::no_content())
}
