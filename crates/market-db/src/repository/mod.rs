//! # Repository Module
//!
//! Database repository implementations for Market POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.sales().get_list(&filter)                                  │
//! │       ▼                                                                 │
//! │  SaleRepository                    pub(crate) fns on &mut Connection    │
//! │  ├── create(&self, req)      ───►  insert(conn, req)                   │
//! │  ├── get_by_id(&self, id)    ───►  find_by_id(conn, id)                │
//! │  ├── get_list(&self, filter)                                          │
//! │  ├── update(&self, id, req)                                           │
//! │  └── delete(&self, id)                                                │
//! │                                          ▲                              │
//! │  CheckoutRepository ─────────────────────┘ same fns, one transaction   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every row-level helper takes `&mut SqliteConnection`, so it runs equally
//! on a pooled connection or inside an open transaction.
//!
//! ## Available Repositories
//!
//! - [`EmployeeRepository`] - Employees and password hashes
//! - [`SaleRepository`] - Sales
//! - [`SaleProductRepository`] - Sale line items
//! - [`PaymentRepository`] - Payments per sale
//! - [`TransactionRepository`] - Shift cash ledgers
//! - [`RemainderRepository`] - Branch stock
//! - [`CheckoutRepository`] - Scan barcode and do-sale workflows

use market_core::Page;
use sqlx::{QueryBuilder, Sqlite};

pub mod checkout;
pub mod employee;
pub mod payment;
pub mod remainder;
pub mod sale;
pub mod sale_product;
pub mod transaction;

pub use checkout::{CheckoutRepository, CompletedSale, ScanOutcome};
pub use employee::EmployeeRepository;
pub use payment::PaymentRepository;
pub use remainder::RemainderRepository;
pub use sale::SaleRepository;
pub use sale_product::SaleProductRepository;
pub use transaction::TransactionRepository;

/// Appends newest-first ordering and the page window.
///
/// `rowid` breaks ties between rows created within the same instant.
pub(crate) fn push_page(query: &mut QueryBuilder<'_, Sqlite>, page: &Page) {
    query
        .push(" ORDER BY created_at DESC, rowid DESC LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset);
}

/// Appends `AND <column> = ?` when the filter value is present.
pub(crate) fn push_eq(query: &mut QueryBuilder<'_, Sqlite>, column: &str, value: Option<&String>) {
    if let Some(value) = value {
        query
            .push(" AND ")
            .push(column)
            .push(" = ")
            .push_bind(value.clone());
    }
}

/// Lowercased search column value for a row's searchable fields.
pub(crate) fn search_text(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|field| field.to_lowercase())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Appends a case-insensitive substring match against a `search_text` column.
///
/// `%`, `_` and `\` in the term match themselves.
pub(crate) fn push_contains(query: &mut QueryBuilder<'_, Sqlite>, column: &str, search: &str) {
    let search = search.trim();
    if search.is_empty() {
        return;
    }

    query
        .push(" AND ")
        .push(column)
        .push(" LIKE ")
        .push_bind(like_pattern(search))
        .push(" ESCAPE '\\'");
}

fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_text_lowercases_unicode() {
        assert_eq!(search_text(&["Азиз", "KARIMOV"]), "азиз\nkarimov");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Ёлка"), "%ёлка%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
