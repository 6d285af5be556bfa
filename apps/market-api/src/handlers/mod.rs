//! # HTTP Handlers
//!
//! One module per resource. Handlers stay thin: parse and validate the
//! request, call a repository, wrap the result in the envelope.
//!
//! ## Shared Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  path id not a UUID         ──► 400 "ID is not a valid UUID"            │
//! │  limit / offset not integer ──► 400 "Invalid query limit" / "offset"    │
//! │  update touched no row      ──► 400 "No rows affected"                  │
//! │  get / delete missing row   ──► 404                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod checkout;
pub mod employee;
pub mod health;
pub mod payment;
pub mod remainder;
pub mod sale;
pub mod sale_product;
pub mod transaction;

use market_core::requests::Page;
use market_core::ValidationError;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

pub(crate) fn ensure_uuid(id: &str) -> ApiResult<()> {
    Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| ApiError::bad_request("ID is not a valid UUID"))
}

pub(crate) fn parse_page(limit: Option<&str>, offset: Option<&str>) -> ApiResult<Page> {
    Page::from_query(limit, offset).map_err(|e| match e {
        ValidationError::InvalidFormat { field, .. } if field == "offset" => {
            ApiError::bad_request("Invalid query offset")
        }
        _ => ApiError::bad_request("Invalid query limit"),
    })
}

pub(crate) fn ensure_rows_affected(rows: u64) -> ApiResult<()> {
    if rows == 0 {
        return Err(ApiError::bad_request("No rows affected"));
    }
    Ok(())
}
