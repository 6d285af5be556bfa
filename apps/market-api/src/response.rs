//! Response envelope.
//!
//! ```json
//! { "status": 201, "description": "Created", "data": { ... } }
//! ```
//!
//! `204 No Content` responses carry no body at all.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: u16,
    pub description: &'static str,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        Envelope {
            status: status.as_u16(),
            description: status.canonical_reason().unwrap_or_default(),
            data,
        }
    }
}

/// A successful handler result.
#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse::with_status(StatusCode::OK, data)
    }

    pub fn created(data: T) -> Self {
        ApiResponse::with_status(StatusCode::CREATED, data)
    }

    pub fn accepted(data: T) -> Self {
        ApiResponse::with_status(StatusCode::ACCEPTED, data)
    }

    pub fn with_status(status: StatusCode, data: T) -> Self {
        ApiResponse {
            status,
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn no_content() -> Self {
        ApiResponse {
            status: StatusCode::NO_CONTENT,
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self.data {
            Some(data) if self.status != StatusCode::NO_CONTENT => {
                (self.status, Json(Envelope::new(self.status, data))).into_response()
            }
            _ => self.status.into_response(),
        }
    }
}
