//! Sale line routes.
//!
//! Lines are normally produced by `/scan-barcode`; these routes let the
//! back office correct them by hand.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::{debug, info};

use market_core::requests::{CreateSaleProduct, SaleProductFilter, UpdateSaleProduct};
use market_core::validation::validate_optional_uuid;
use market_core::{ListPage, SaleProduct};

use super::{ensure_rows_affected, ensure_uuid, parse_page};
use crate::error::{ApiError, ApiResult};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SaleProductListQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub sale_id: Option<String>,
    pub barcode: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateSaleProduct>, JsonRejection>,
) -> ApiResult<ApiResponse<SaleProduct>> {
    let Json(req) = payload?;
    req.validate()?;

    let line = state.db.sale_products().create(&req).await?;
    info!(id = %line.id, sale_id = %line.sale_id, barcode = %line.barcode, "Sale line created");

    Ok(ApiResponse::created(line))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<SaleProduct>> {
    ensure_uuid(&id)?;

    let line = state
        .db
        .sale_products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("SaleProduct", &id))?;

    Ok(ApiResponse::ok(line))
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<SaleProductListQuery>, QueryRejection>,
) -> ApiResult<ApiResponse<ListPage<SaleProduct>>> {
    let Query(query) = query?;
    validate_optional_uuid("sale_id", query.sale_id.as_deref())?;

    let filter = SaleProductFilter {
        page: parse_page(query.limit.as_deref(), query.offset.as_deref())?,
        sale_id: query.sale_id,
        barcode: query.barcode,
    };

    let page = state.db.sale_products().get_list(&filter).await?;
    debug!(count = page.count, "Listed sale lines");

    Ok(ApiResponse::ok(page))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateSaleProduct>, JsonRejection>,
) -> ApiResult<ApiResponse<SaleProduct>> {
    ensure_uuid(&id)?;
    let Json(req) = payload?;
    req.validate()?;

    let repo = state.db.sale_products();
    ensure_rows_affected(repo.update(&id, &req).await?)?;

    let line = repo
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("SaleProduct", &id))?;

    Ok(ApiResponse::accepted(line))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<()>> {
    ensure_uuid(&id)?;

    if state.db.sale_products().delete(&id).await? == 0 {
        return Err(ApiError::not_found("SaleProduct", &id));
    }

    Ok(ApiResponse::no_content())
}
