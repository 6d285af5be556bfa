//! # Remainder Repository
//!
//! Stock on hand per branch, keyed by barcode.
//!
//! ## Who Touches Stock
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Goods receipt (CRUD)  ──► create / update quantity                     │
//! │  Scan barcode          ──► read: name, price, quantity ceiling          │
//! │  Do sale               ──► quantity -= sold units (same transaction)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::{push_contains, push_eq, push_page, search_text};
use crate::error::DbResult;
use market_core::requests::{CreateRemainder, RemainderFilter, UpdateRemainder};
use market_core::{ListPage, Remainder};

const SELECT_REMAINDER: &str = "SELECT id, branch_id, category_id, product_name, barcode, \
     price_income, quantity, created_at, updated_at FROM remainders";

/// Repository for branch stock records.
#[derive(Debug, Clone)]
pub struct RemainderRepository {
    pool: SqlitePool,
}

impl RemainderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        RemainderRepository { pool }
    }

    pub async fn create(&self, req: &CreateRemainder) -> DbResult<Remainder> {
        let now = Utc::now();
        let remainder = Remainder {
            id: Uuid::new_v4().to_string(),
            branch_id: req.branch_id.clone(),
            category_id: req.category_id.clone(),
            product_name: req.product_name.clone(),
            barcode: req.barcode.clone(),
            price_income: req.price_income,
            quantity: req.quantity,
            created_at: now,
            updated_at: now,
        };

        debug!(
            branch_id = %remainder.branch_id,
            barcode = %remainder.barcode,
            quantity = remainder.quantity,
            "Creating remainder"
        );

        sqlx::query(
            r#"
            INSERT INTO remainders (
                id, branch_id, category_id, product_name, barcode,
                price_income, quantity, created_at, updated_at, search_text
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&remainder.id)
        .bind(&remainder.branch_id)
        .bind(&remainder.category_id)
        .bind(&remainder.product_name)
        .bind(&remainder.barcode)
        .bind(remainder.price_income)
        .bind(remainder.quantity)
        .bind(remainder.created_at)
        .bind(remainder.updated_at)
        .bind(search_text(&[&remainder.product_name]))
        .execute(&self.pool)
        .await?;

        Ok(remainder)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Remainder>> {
        let sql = format!("{SELECT_REMAINDER} WHERE id = ?1");
        let remainder = sqlx::query_as::<_, Remainder>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(remainder)
    }

    pub async fn get_list(&self, filter: &RemainderFilter) -> DbResult<ListPage<Remainder>> {
        let mut conn = self.pool.acquire().await?;

        let mut count_query =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM remainders WHERE 1 = 1");
        push_filters(&mut count_query, filter);
        let count = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&mut *conn)
            .await?;

        let mut list_query = QueryBuilder::<Sqlite>::new(format!("{SELECT_REMAINDER} WHERE 1 = 1"));
        push_filters(&mut list_query, filter);
        push_page(&mut list_query, &filter.page);
        let items = list_query
            .build_query_as::<Remainder>()
            .fetch_all(&mut *conn)
            .await?;

        Ok(ListPage { count, items })
    }

    pub async fn update(&self, id: &str, req: &UpdateRemainder) -> DbResult<u64> {
        debug!(id = %id, quantity = req.quantity, "Updating remainder");

        let result = sqlx::query(
            r#"
            UPDATE remainders SET
                branch_id = ?2,
                category_id = ?3,
                product_name = ?4,
                barcode = ?5,
                price_income = ?6,
                quantity = ?7,
                updated_at = ?8,
                search_text = ?9
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&req.branch_id)
        .bind(&req.category_id)
        .bind(&req.product_name)
        .bind(&req.barcode)
        .bind(req.price_income)
        .bind(req.quantity)
        .bind(Utc::now())
        .bind(search_text(&[&req.product_name]))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete(&self, id: &str) -> DbResult<u64> {
        debug!(id = %id, "Deleting remainder");

        let result = sqlx::query("DELETE FROM remainders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Sqlite>, filter: &RemainderFilter) {
    push_eq(query, "branch_id", filter.branch_id.as_ref());
    push_eq(query, "barcode", filter.barcode.as_ref());
    push_contains(query, "search_text", &filter.search);
}

// =============================================================================
// Connection-level helpers
// =============================================================================

/// The branch's stock record for a barcode.
pub(crate) async fn find_by_branch_and_barcode(
    conn: &mut SqliteConnection,
    branch_id: &str,
    barcode: &str,
) -> DbResult<Option<Remainder>> {
    let sql = format!(
        "{SELECT_REMAINDER} WHERE branch_id = ?1 AND barcode = ?2 \
         ORDER BY created_at ASC, rowid ASC LIMIT 1"
    );
    let remainder = sqlx::query_as::<_, Remainder>(&sql)
        .bind(branch_id)
        .bind(barcode)
        .fetch_optional(conn)
        .await?;

    Ok(remainder)
}

/// The branch's stock records for a set of barcodes.
pub(crate) async fn list_by_branch_and_barcodes(
    conn: &mut SqliteConnection,
    branch_id: &str,
    barcodes: &[String],
) -> DbResult<Vec<Remainder>> {
    if barcodes.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = QueryBuilder::<Sqlite>::new(format!("{SELECT_REMAINDER} WHERE branch_id = "));
    query.push_bind(branch_id.to_string()).push(" AND barcode IN (");
    let mut values = query.separated(", ");
    for barcode in barcodes {
        values.push_bind(barcode.clone());
    }
    values.push_unseparated(") ORDER BY created_at ASC, rowid ASC");

    let remainders = query
        .build_query_as::<Remainder>()
        .fetch_all(conn)
        .await?;

    Ok(remainders)
}

pub(crate) async fn set_quantity(
    conn: &mut SqliteConnection,
    id: &str,
    quantity: i64,
) -> DbResult<u64> {
    let result = sqlx::query("UPDATE remainders SET quantity = ?2, updated_at = ?3 WHERE id = ?1")
        .bind(id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}

// =============================================================================
// Unit Tests
// =============================================================================
