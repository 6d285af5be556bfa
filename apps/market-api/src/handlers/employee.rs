//! Employee routes.
//!
//! Mounted behind [`crate::auth::require_password`]. The list response is
//! cached for `list_cache_ttl_secs`; writes do not invalidate it, so a
//! fresh employee may take one TTL to appear in lists.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::{debug, info, warn};

use market_core::requests::{CreateEmployee, EmployeeFilter, UpdateEmployee};
use market_core::{Employee, ListPage};

use super::{ensure_rows_affected, ensure_uuid, parse_page};
use crate::error::{ApiError, ApiResult};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct EmployeeListQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    #[serde(default)]
    pub search: String,
}

fn cache_key(filter: &EmployeeFilter) -> String {
    format!(
        "employee-limit={}&offset={}&search={}",
        filter.page.limit, filter.page.offset, filter.search
    )
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateEmployee>, JsonRejection>,
) -> ApiResult<ApiResponse<Employee>> {
    let Json(req) = payload?;
    req.validate()?;

    let employee = state.db.employees().create(&req).await?;
    info!(id = %employee.id, login = %employee.login, "Employee created");

    Ok(ApiResponse::created(employee))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<Employee>> {
    ensure_uuid(&id)?;

    let employee = state
        .db
        .employees()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Employee", &id))?;

    Ok(ApiResponse::ok(employee))
}

/// Lists employees, serving a cached page when one with rows exists.
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<EmployeeListQuery>, QueryRejection>,
) -> ApiResult<ApiResponse<ListPage<Employee>>> {
    let Query(query) = query?;
    let filter = EmployeeFilter {
        page: parse_page(query.limit.as_deref(), query.offset.as_deref())?,
        search: query.search,
    };
    filter.validate()?;

    let key = cache_key(&filter);
    if let Some(cached) = state.cache.get(&key).await {
        match serde_json::from_str::<ListPage<Employee>>(&cached) {
            Ok(page) if !page.is_empty() => {
                debug!(key = %key, "Employee list served from cache");
                return Ok(ApiResponse::ok(page));
            }
            Ok(_) => {}
            Err(e) => warn!(key = %key, error = %e, "Discarding unreadable cache entry"),
        }
    }

    let page = state.db.employees().get_list(&filter).await?;

    match serde_json::to_string(&page) {
        Ok(body) => {
            state
                .cache
                .set(&key, body, state.config.list_cache_ttl())
                .await
        }
        Err(e) => warn!(key = %key, error = %e, "Failed to serialize employee list for cache"),
    }

    Ok(ApiResponse::ok(page))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateEmployee>, JsonRejection>,
) -> ApiResult<ApiResponse<Employee>> {
    ensure_uuid(&id)?;
    let Json(req) = payload?;
    req.validate()?;

    let repo = state.db.employees();
    ensure_rows_affected(repo.update(&id, &req).await?)?;

    let employee = repo
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Employee", &id))?;

    Ok(ApiResponse::accepted(employee))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<()>> {
    ensure_uuid(&id)?;

    if state.db.employees().delete(&id).await? == 0 {
        return Err(ApiError::not_found("Employee", &id));
    }
    info!(id = %id, "Employee deleted");

    Ok(ApiResponse::no_content())
}
