//! # market-db: Database Layer for Market POS
//!
//! This crate provides database access for the Market POS backend.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Market POS Data Flow                             │
//! │                                                                         │
//! │  HTTP handler (market-api)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     market-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐ │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │ │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │ │   │
//! │  │   │               │    │ EmployeeRepo   │    │              │ │   │
//! │  │   │ SqlitePool    │◄───│ SaleRepo ...   │    │ 001_initial  │ │   │
//! │  │   │               │    │ CheckoutRepo   │    │              │ │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘ │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (./market.db by default)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use market_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./market.db")).await?;
//!
//! let outcome = db.checkout().scan_barcode(&sale_id, &branch_id, "4780000000011").await?;
//! let done = db.checkout().complete_sale(&sale_id, &branch_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::{
    CheckoutRepository, CompletedSale, EmployeeRepository, PaymentRepository,
    RemainderRepository, SaleProductRepository, SaleRepository, ScanOutcome,
    TransactionRepository,
};
