//! # market-core: Pure Business Logic for Market POS
//!
//! This crate holds the domain of the store backend as plain types and pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Market POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    market-api (axum)                            │   │
//! │  │    /v1/employee  /v1/sale  ...  /v1/scan-barcode  /v1/do-sale   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ market-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ checkout  │  │ validation│  │   │
//! │  │   │   Sale    │  │   Money   │  │ scan rule │  │ requests  │  │   │
//! │  │   │ Remainder │  │  Tenders  │  │ do-sale   │  │  filters  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    market-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (Employee, Sale, SaleProduct, Payment, ...)
//! - [`money`] - Integer money and per-channel tenders
//! - [`requests`] - Create/update payloads, list filters, pagination
//! - [`validation`] - Field rules
//! - [`checkout`] - Scan and do-sale decisions
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use market_core::money::{Money, Tenders};
//!
//! let ledger = Tenders { cash: Money::from_minor(10_000), total_amount: Money::from_minor(10_000), ..Tenders::default() };
//! let paid = Tenders { click: Money::from_minor(2_500), total_amount: Money::from_minor(2_500), ..Tenders::default() };
//!
//! let settled = ledger + paid;
//! assert_eq!(settled.total_amount.minor(), 12_500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod money;
pub mod requests;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Tenders};
pub use requests::{ListPage, Page};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Page size used when a list request gives no positive `limit`.
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest quantity a single sale line may carry.
pub const MAX_ITEM_QUANTITY: i64 = 9_999;
