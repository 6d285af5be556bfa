//! # Error Types
//!
//! Domain-specific error types for market-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  market-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  market-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  HTTP errors (in market-api)                                           │
//! │  └── ApiError         - What clients see (status + envelope)           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations in the scan and
/// checkout workflows.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No remainder row carries the scanned barcode in the branch.
    #[error("Product not found: barcode {barcode}")]
    ProductNotFound { barcode: String },

    /// Scanning one more unit would exceed what the branch has in stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Scan barcode (line has 3, remainder has 3)
    ///      │
    ///      ▼
    /// QuantityLimit { barcode, available: 3 }
    ///      │
    ///      ▼
    /// Cashier sees: "Maximum quantity reached"
    /// ```
    #[error("Maximum quantity reached for {barcode}: {available} in stock")]
    QuantityLimit { barcode: String, available: i64 },

    /// Insufficient stock to complete the sale.
    #[error("Insufficient stock for {barcode}: available {available}, requested {requested}")]
    InsufficientStock {
        barcode: String,
        available: i64,
        requested: i64,
    },

    /// Sale is not in a state that allows the requested operation.
    #[error("Sale {sale_id} is {current_status}, cannot perform operation")]
    InvalidSaleStatus {
        sale_id: String,
        current_status: String,
    },

    /// The sale has no recorded payment to settle.
    #[error("No payment recorded for sale {sale_id}")]
    NoPayment { sale_id: String },

    /// The sale's shift has no cash transaction to settle into.
    #[error("No transaction found for shift {shift_id}")]
    TransactionNotFound { shift_id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any storage access happens.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., invalid UUID, non-numeric limit).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Returns the name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::Negative { field }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            barcode: "4780001".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for 4780001: available 3, requested 5"
        );

        let err = CoreError::QuantityLimit {
            barcode: "4780001".to_string(),
            available: 2,
        };
        assert_eq!(
            err.to_string(),
            "Maximum quantity reached for 4780001: 2 in stock"
        );
    }

    #[test]
    fn test_validation_error_field() {
        let err = ValidationError::InvalidFormat {
            field: "limit".to_string(),
            reason: "must be an integer".to_string(),
        };
        assert_eq!(err.field(), "limit");
        assert_eq!(err.to_string(), "limit has invalid format: must be an integer");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "barcode".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
