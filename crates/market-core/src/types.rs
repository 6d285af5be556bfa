//! # Domain Types
//!
//! Core domain types used throughout Market POS.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌───────────────┐     ┌───────────────┐      ┌───────────────┐        │
//! │  │   Employee    │────►│     Sale      │◄─────│    Payment    │        │
//! │  │  branch_id    │     │  shift_id     │      │  sale_id (FK) │        │
//! │  │  user_type    │     │  status       │      │  tenders      │        │
//! │  └───────────────┘     └───────┬───────┘      └───────────────┘        │
//! │                                │ 1..n                                   │
//! │                        ┌───────▼───────┐      ┌───────────────┐        │
//! │                        │  SaleProduct  │◄─────│   Remainder   │        │
//! │                        │  barcode      │ scan │  barcode      │        │
//! │                        │  quantity     │      │  quantity     │        │
//! │                        └───────────────┘      └───────────────┘        │
//! │                                                                         │
//! │  ┌───────────────┐  one per shift: the cash ledger that do-sale        │
//! │  │  Transaction  │  adds each sale's payment into                      │
//! │  └───────────────┘                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity has a UUID v4 `id` (string form). Barcodes are the business
//! key that links a sale line to the branch's stock record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::{Money, Tenders};

// =============================================================================
// Employee
// =============================================================================

/// Role of an employee at the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Admin,
    Manager,
    #[default]
    Cashier,
}

/// A store employee.
///
/// The password never leaves the database: only an argon2 hash is stored
/// and it is not part of this type.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Employee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub login: String,
    pub branch_id: Option<String>,
    pub salepoint_id: Option<String>,
    pub user_type: UserType,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    /// Full name as printed on receipts.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Items are still being scanned.
    #[default]
    InProcess,
    /// Paid, stock deducted, ledger updated.
    Finished,
    /// Abandoned by the cashier.
    Cancelled,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::InProcess => "in_process",
            SaleStatus::Finished => "finished",
            SaleStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A sale opened at a sale point during a shift.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub branch_id: String,
    pub sale_point_id: String,
    pub shift_id: String,
    pub employee_id: String,
    /// Receipt barcode printed for the customer.
    pub barcode: String,
    pub status: SaleStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == SaleStatus::InProcess
    }
}

// =============================================================================
// Sale Product
// =============================================================================

/// How a line discount is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    #[default]
    None,
    /// `discount` is a percentage (0-100) of the line total.
    Percent,
    /// `discount` is an absolute amount in minor units.
    Fixed,
}

/// A line item in a sale.
///
/// Product name, barcode and price are copied from the remainder at scan
/// time so later stock edits do not rewrite sale history.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleProduct {
    pub id: String,
    pub sale_id: String,
    pub category_id: Option<String>,
    pub product_name: String,
    pub barcode: String,
    /// Stock level of the product when it was first scanned.
    pub remaining_quantity: i64,
    pub quantity: i64,
    pub allow_discount: bool,
    pub discount_type: DiscountType,
    pub discount: i64,
    pub price: Money,
    pub total_amount: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Payment
// =============================================================================

/// Tenders collected for a sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Payment {
    pub id: String,
    pub sale_id: String,
    pub cash: Money,
    pub uzcard: Money,
    pub payme: Money,
    pub click: Money,
    pub humo: Money,
    pub apelsin: Money,
    pub total_amount: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn tenders(&self) -> Tenders {
        Tenders {
            cash: self.cash,
            uzcard: self.uzcard,
            payme: self.payme,
            click: self.click,
            humo: self.humo,
            apelsin: self.apelsin,
            total_amount: self.total_amount,
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// The cash ledger of a shift.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Transaction {
    pub id: String,
    pub shift_id: String,
    pub cash: Money,
    pub uzcard: Money,
    pub payme: Money,
    pub click: Money,
    pub humo: Money,
    pub apelsin: Money,
    pub total_amount: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn tenders(&self) -> Tenders {
        Tenders {
            cash: self.cash,
            uzcard: self.uzcard,
            payme: self.payme,
            click: self.click,
            humo: self.humo,
            apelsin: self.apelsin,
            total_amount: self.total_amount,
        }
    }
}

// =============================================================================
// Remainder
// =============================================================================

/// Stock on hand for one product in one branch.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Remainder {
    pub id: String,
    pub branch_id: String,
    pub category_id: Option<String>,
    pub product_name: String,
    pub barcode: String,
    /// Purchase price, used as the selling price when scanned.
    pub price_income: Money,
    pub quantity: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
