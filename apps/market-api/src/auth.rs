//! Shared-password authentication for the employee routes.
//!
//! Clients send the configured password in the `Password` header. Anything
//! else, including a missing header, is answered with 401 before the
//! handler runs.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

pub const PASSWORD_HEADER: &str = "Password";

pub async fn require_password(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let supplied = request
        .headers()
        .get(PASSWORD_HEADER)
        .and_then(|h| h.to_str().ok());
    let missing = supplied.is_none();
    let authorized = supplied == Some(state.config.employee_password.as_str());

    if authorized {
        return Ok(next.run(request).await);
    }

    warn!(path = %request.uri().path(), missing, "Rejected employee request");
    Err(ApiError::unauthorized())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::{middleware, Router};
    use tower::ServiceExt;

    async fn handler() -> &'static str {
        "ok"
    }

    async fn app() -> Router {
        let state = AppState::for_tests().await;
        Router::new()
            .route("/", get(handler))
            .layer(middleware::from_fn_with_state(state.clone(), require_password))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_correct_password() {
        let req = Request::builder()
            .uri("/")
            .header(PASSWORD_HEADER, "1234")
            .body(Body::empty())
            .unwrap();

        let response = app().await.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let req = Request::builder()
            .uri("/")
            .header(PASSWORD_HEADER, "12345")
            .body(Body::empty())
            .unwrap();

        let response = app().await.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_missing_header() {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();

        let response = app().await.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
