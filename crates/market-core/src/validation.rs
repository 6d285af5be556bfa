//! # Validation Module
//!
//! Input validation utilities for Market POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (market-api)                                    │
//! │  ├── Path ids and workflow query params must be UUIDs                  │
//! │  └── limit / offset must be integers                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Payload .validate() (market-core)                            │
//! │  └── THIS MODULE: field rules                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use market_core::validation::{validate_barcode, validate_quantity};
//!
//! validate_barcode("4780001234567").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Rejects empty or whitespace-only values.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a person or product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use market_core::validation::validate_name;
///
/// assert!(validate_name("product_name", "Coca-Cola 1.5L").is_ok());
/// assert!(validate_name("product_name", "").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    validate_required(field, name)?;

    if name.trim().chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a phone number: digits with an optional leading `+`, 3 to 20
/// characters.
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();
    validate_required("phone", phone)?;

    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if digits.len() < 3 || digits.len() > 20 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain 3 to 20 digits".to_string(),
        });
    }

    Ok(())
}

/// Validates a product or receipt barcode.
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters, no whitespace
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    validate_required("barcode", barcode)?;

    if barcode.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: 64,
        });
    }

    if barcode.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (returns all results)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if !(1..=MAX_ITEM_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a monetary amount. Zero is allowed, negative is not.
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Parses an integer query parameter.
///
/// An empty value yields `default`; anything else must parse as `i64`.
///
/// ## Example
/// ```rust
/// use market_core::validation::parse_int_or_default;
///
/// assert_eq!(parse_int_or_default("limit", "", 10).unwrap(), 10);
/// assert_eq!(parse_int_or_default("limit", "25", 10).unwrap(), 25);
/// assert!(parse_int_or_default("limit", "abc", 10).is_err());
/// ```
pub fn parse_int_or_default(field: &str, raw: &str, default: i64) -> ValidationResult<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(default);
    }

    raw.parse::<i64>()
        .map_err(|_| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be an integer".to_string(),
        })
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string.
///
/// ## Example
/// ```rust
/// use market_core::validation::validate_uuid;
///
/// assert!(validate_uuid("sale_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("sale_id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, value: &str) -> ValidationResult<()> {
    validate_required(field, value)?;

    uuid::Uuid::parse_str(value.trim()).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

/// Like [`validate_uuid`] but accepts `None`.
pub fn validate_optional_uuid(field: &str, value: Option<&str>) -> ValidationResult<()> {
    match value {
        Some(value) => validate_uuid(field, value),
        None => Ok(()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
