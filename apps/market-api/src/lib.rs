//! # Market API
//!
//! REST server for the Market POS backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Market API Routes                              │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  /v1/employee  │  │  CRUD          │  │  Checkout                  ││
//! │  │                │  │                │  │                            ││
//! │  │ • Password hdr │  │ • sale         │  │ • POST /v1/scan-barcode    ││
//! │  │ • cached list  │  │ • sale_product │  │ • POST /v1/do-sale         ││
//! │  │                │  │ • payment      │  │                            ││
//! │  │                │  │ • transaction  │  │                            ││
//! │  │                │  │ • remainder    │  │                            ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure                               │  │
//! │  │                                                                   │  │
//! │  │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────────┐│  │
//! │  │  │  SQLite      │  │ Redis / moka │  │ tower-http               ││  │
//! │  │  │  (market-db) │  │              │  │                          ││  │
//! │  │  │ Primary data │  │ List cache   │  │ Trace, CORS, timeout     ││  │
//! │  │  └──────────────┘  └──────────────┘  └──────────────────────────┘│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every response uses the envelope described in [`response`].

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod state;

use axum::error_handling::HandleErrorLayer;
use axum::routing::{get, post};
use axum::{middleware, Router};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use cache::ResponseCache;
pub use config::{AppConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::AppState;

use handlers::{checkout, employee, health, payment, remainder, sale, sale_product, transaction};

/// Builds the full application router.
pub fn app(state: AppState) -> Router {
    let timeout = state.config.request_timeout();

    Router::new()
        .route("/health", get(health::check))
        .nest("/v1", v1_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(error::handle_layer_error))
                .timeout(timeout),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn v1_routes(state: AppState) -> Router<AppState> {
    let employees = Router::new()
        .route("/employee", post(employee::create).get(employee::list))
        .route(
            "/employee/:id",
            get(employee::get)
                .put(employee::update)
                .delete(employee::delete),
        )
        .route_layer(middleware::from_fn_with_state(state, auth::require_password));

    Router::new()
        .merge(employees)
        .route("/sale", post(sale::create).get(sale::list))
        .route(
            "/sale/:id",
            get(sale::get).put(sale::update).delete(sale::delete),
        )
        .route(
            "/sale_product",
            post(sale_product::create).get(sale_product::list),
        )
        .route(
            "/sale_product/:id",
            get(sale_product::get)
                .put(sale_product::update)
                .delete(sale_product::delete),
        )
        .route("/payment", post(payment::create).get(payment::list))
        .route(
            "/payment/:id",
            get(payment::get).put(payment::update).delete(payment::delete),
        )
        .route(
            "/transaction",
            post(transaction::create).get(transaction::list),
        )
        .route(
            "/transaction/:id",
            get(transaction::get)
                .put(transaction::update)
                .delete(transaction::delete),
        )
        .route("/remainder", post(remainder::create).get(remainder::list))
        .route(
            "/remainder/:id",
            get(remainder::get)
                .put(remainder::update)
                .delete(remainder::delete),
        )
        .route("/scan-barcode", post(checkout::scan_barcode))
        .route("/do-sale", post(checkout::do_sale))
}

// =============================================================================
// Router Tests
// =============================================================================
