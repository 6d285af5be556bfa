//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)         CoreError (scan / do-sale rules)   │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (market-api) ← Status code + envelope                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Client sees {"status", "description", "data": {code, message}}        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use market_core::{CoreError, ValidationError};
use sqlx::error::ErrorKind;
use thiserror::Error;

/// Failures of the storage layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// No row with this id. Raised for the sale named by a workflow
    /// request; plain `get_by_id` lookups return `Ok(None)` instead.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// e.g. a second employee with the same login
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// e.g. a sale line pointing at a sale that does not exist
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// CHECK constraints and other statement-level errors.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Commit of a workflow transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    /// A checkout rule rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        DbError::Core(CoreError::Validation(err))
    }
}

/// SQLite reports a unique failure as
/// `UNIQUE constraint failed: employees.login`; keep the column part.
fn unique_column(message: &str) -> String {
    message
        .rsplit(": ")
        .next()
        .and_then(|target| target.split(", ").next())
        .map(|target| target.rsplit('.').next().unwrap_or(target))
        .unwrap_or("unknown")
        .to_string()
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.kind() {
                    ErrorKind::UniqueViolation => {
                        DbError::duplicate(unique_column(&message), "value")
                    }
                    ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation { message },
                    _ => DbError::QueryFailed(message),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err: DbError = CoreError::NoPayment {
            sale_id: "s-1".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "No payment recorded for sale s-1");
    }

    #[test]
    fn test_unique_column() {
        assert_eq!(unique_column("UNIQUE constraint failed: employees.login"), "login");
        assert_eq!(unique_column("something else"), "something else");
    }

    #[test]
    fn test_validation_error_wraps_into_core() {
        let err: DbError = ValidationError::Required {
            field: "barcode".to_string(),
        }
        .into();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
    }
}
