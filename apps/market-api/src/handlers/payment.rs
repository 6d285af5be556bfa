//! Payment routes.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use market_core::requests::{CreatePayment, PaymentFilter, UpdatePayment};
use market_core::validation::validate_optional_uuid;
use market_core::{ListPage, Payment};

use super::{ensure_rows_affected, ensure_uuid, parse_page};
use crate::error::{ApiError, ApiResult};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PaymentListQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub sale_id: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreatePayment>, JsonRejection>,
) -> ApiResult<ApiResponse<Payment>> {
    let Json(req) = payload?;
    req.validate()?;

    let payment = state.db.payments().create(&req).await?;
    info!(
        id = %payment.id,
        sale_id = %payment.sale_id,
        total = %payment.total_amount,
        "Payment recorded"
    );

    Ok(ApiResponse::created(payment))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<Payment>> {
    ensure_uuid(&id)?;

    let payment = state
        .db
        .payments()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Payment", &id))?;

    Ok(ApiResponse::ok(payment))
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<PaymentListQuery>, QueryRejection>,
) -> ApiResult<ApiResponse<ListPage<Payment>>> {
    let Query(query) = query?;
    validate_optional_uuid("sale_id", query.sale_id.as_deref())?;

    let filter = PaymentFilter {
        page: parse_page(query.limit.as_deref(), query.offset.as_deref())?,
        sale_id: query.sale_id,
    };

    let page = state.db.payments().get_list(&filter).await?;
    Ok(ApiResponse::ok(page))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePayment>, JsonRejection>,
) -> ApiResult<ApiResponse<Payment>> {
    ensure_uuid(&id)?;
    let Json(req) = payload?;
    req.validate()?;

    let repo = state.db.payments();
    ensure_rows_affected(repo.update(&id, &req).await?)?;

    let payment = repo
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Payment", &id))?;

    Ok(ApiResponse::accepted(payment))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<()>> {
    ensure_uuid(&id)?;

    if state.db.payments().delete(&id).await? == 0 {
        return Err(ApiError::not_found("Payment", &id));
    }

    Ok(ApiResponse::no_content())
}
