//! Sale routes.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use market_core::requests::{CreateSale, SaleFilter, UpdateSale};
use market_core::validation::validate_optional_uuid;
use market_core::{ListPage, Sale, SaleStatus};

use super::{ensure_rows_affected, ensure_uuid, parse_page};
use crate::error::{ApiError, ApiResult};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SaleListQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub branch_id: Option<String>,
    pub shift_id: Option<String>,
    pub employee_id: Option<String>,
    pub status: Option<SaleStatus>,
}

impl SaleListQuery {
    fn into_filter(self) -> ApiResult<SaleFilter> {
        validate_optional_uuid("branch_id", self.branch_id.as_deref())?;
        validate_optional_uuid("shift_id", self.shift_id.as_deref())?;
        validate_optional_uuid("employee_id", self.employee_id.as_deref())?;

        Ok(SaleFilter {
            page: parse_page(self.limit.as_deref(), self.offset.as_deref())?,
            branch_id: self.branch_id,
            shift_id: self.shift_id,
            employee_id: self.employee_id,
            status: self.status,
        })
    }
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateSale>, JsonRejection>,
) -> ApiResult<ApiResponse<Sale>> {
    let Json(req) = payload?;
    req.validate()?;

    let sale = state.db.sales().create(&req).await?;
    info!(id = %sale.id, shift_id = %sale.shift_id, "Sale opened");

    Ok(ApiResponse::created(sale))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<Sale>> {
    ensure_uuid(&id)?;

    let sale = state
        .db
        .sales()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", &id))?;

    Ok(ApiResponse::ok(sale))
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<SaleListQuery>, QueryRejection>,
) -> ApiResult<ApiResponse<ListPage<Sale>>> {
    let Query(query) = query?;
    let filter = query.into_filter()?;

    let page = state.db.sales().get_list(&filter).await?;
    Ok(ApiResponse::ok(page))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateSale>, JsonRejection>,
) -> ApiResult<ApiResponse<Sale>> {
    ensure_uuid(&id)?;
    let Json(req) = payload?;
    req.validate()?;

    let repo = state.db.sales();
    ensure_rows_affected(repo.update(&id, &req).await?)?;

    let sale = repo
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", &id))?;

    Ok(ApiResponse::accepted(sale))
}

/// Deleting a sale also removes its lines and payments.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<()>> {
    ensure_uuid(&id)?;

    if state.db.sales().delete(&id).await? == 0 {
        return Err(ApiError::not_found("Sale", &id));
    }
    info!(id = %id, "Sale deleted");

    Ok(ApiResponse::no_content())
}
