//! # Sale Repository
//!
//! Database operations for sales.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. OPEN                                                               │
//! │     └── create() → Sale { status: InProcess }                          │
//! │                                                                         │
//! │  2. SCAN ITEMS                                                         │
//! │     └── checkout().scan_barcode() → SaleProduct added / incremented    │
//! │                                                                         │
//! │  3. PAY                                                                │
//! │     └── payments().create() → Payment                                  │
//! │                                                                         │
//! │  4. DO SALE                                                            │
//! │     └── checkout().complete_sale() → Sale { status: Finished }         │
//! │         (ledger, stock and status in one transaction)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::{push_eq, push_page};
use crate::error::DbResult;
use market_core::requests::{CreateSale, SaleFilter, UpdateSale};
use market_core::{ListPage, Sale, SaleStatus};

const SELECT_SALE: &str = "SELECT id, branch_id, sale_point_id, shift_id, employee_id, \
     barcode, status, created_at, updated_at FROM sales";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Opens a new sale.
    pub async fn create(&self, req: &CreateSale) -> DbResult<Sale> {
        let mut conn = self.pool.acquire().await?;
        insert(&mut conn, req).await
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let mut conn = self.pool.acquire().await?;
        find_by_id(&mut conn, id).await
    }

    /// Lists sales, newest first.
    pub async fn get_list(&self, filter: &SaleFilter) -> DbResult<ListPage<Sale>> {
        let mut conn = self.pool.acquire().await?;

        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM sales WHERE 1 = 1");
        push_filters(&mut count_query, filter);
        let count = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&mut *conn)
            .await?;

        let mut list_query = QueryBuilder::<Sqlite>::new(format!("{SELECT_SALE} WHERE 1 = 1"));
        push_filters(&mut list_query, filter);
        push_page(&mut list_query, &filter.page);
        let items = list_query
            .build_query_as::<Sale>()
            .fetch_all(&mut *conn)
            .await?;

        debug!(count, returned = items.len(), "Listed sales");
        Ok(ListPage { count, items })
    }

    /// Replaces every mutable column of a sale. Returns rows affected.
    pub async fn update(&self, id: &str, req: &UpdateSale) -> DbResult<u64> {
        debug!(id = %id, status = %req.status, "Updating sale");

        let result = sqlx::query(
            r#"
            UPDATE sales SET
                branch_id = ?2,
                sale_point_id = ?3,
                shift_id = ?4,
                employee_id = ?5,
                barcode = ?6,
                status = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&req.branch_id)
        .bind(&req.sale_point_id)
        .bind(&req.shift_id)
        .bind(&req.employee_id)
        .bind(&req.barcode)
        .bind(req.status)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Deletes a sale together with its lines and payments.
    pub async fn delete(&self, id: &str) -> DbResult<u64> {
        debug!(id = %id, "Deleting sale");

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Sqlite>, filter: &SaleFilter) {
    push_eq(query, "branch_id", filter.branch_id.as_ref());
    push_eq(query, "shift_id", filter.shift_id.as_ref());
    push_eq(query, "employee_id", filter.employee_id.as_ref());
    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status);
    }
}

// =============================================================================
// Connection-level helpers
// =============================================================================

pub(crate) async fn insert(conn: &mut SqliteConnection, req: &CreateSale) -> DbResult<Sale> {
    let now = Utc::now();
    let sale = Sale {
        id: Uuid::new_v4().to_string(),
        branch_id: req.branch_id.clone(),
        sale_point_id: req.sale_point_id.clone(),
        shift_id: req.shift_id.clone(),
        employee_id: req.employee_id.clone(),
        barcode: req.barcode.clone(),
        status: req.status,
        created_at: now,
        updated_at: now,
    };

    debug!(id = %sale.id, barcode = %sale.barcode, "Creating sale");

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, branch_id, sale_point_id, shift_id, employee_id,
            barcode, status, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.branch_id)
    .bind(&sale.sale_point_id)
    .bind(&sale.shift_id)
    .bind(&sale.employee_id)
    .bind(&sale.barcode)
    .bind(sale.status)
    .bind(sale.created_at)
    .bind(sale.updated_at)
    .execute(conn)
    .await?;

    Ok(sale)
}

pub(crate) async fn find_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Sale>> {
    let sql = format!("{SELECT_SALE} WHERE id = ?1");
    let sale = sqlx::query_as::<_, Sale>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(sale)
}

pub(crate) async fn set_status(
    conn: &mut SqliteConnection,
    id: &str,
    status: SaleStatus,
) -> DbResult<u64> {
    let result = sqlx::query("UPDATE sales SET status = ?2, updated_at = ?3 WHERE id = ?1")
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use market_core::Page;

    pub(crate) const BRANCH: &str = "6a1d5e2c-0f3b-4e61-9a7c-3d2b1f0e9c11";
    pub(crate) const SHIFT: &str = "b3c1f4a2-7d8e-4f90-8a1b-2c3d4e5f6a7b";

    pub(crate) fn sale_payload() -> CreateSale {
        CreateSale {
            branch_id: BRANCH.to_string(),
            sale_point_id: "0c9a8b7d-6e5f-4a3b-9c2d-1e0f9a8b7c6d".to_string(),
            shift_id: SHIFT.to_string(),
            employee_id: "5f4e3d2c-1b0a-4987-8654-3210fedcba98".to_string(),
            barcode: "R-000001".to_string(),
            status: SaleStatus::InProcess,
        }
    }

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_sale() {
        let db = setup().await;
        let repo = db.sales();

        let created = repo.create(&sale_payload()).await.unwrap();
        assert_eq!(created.status, SaleStatus::InProcess);

        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.shift_id, SHIFT);
        assert_eq!(fetched.barcode, "R-000001");
    }

    #[tokio::test]
    async fn test_get_missing_sale() {
        let db = setup().await;
        assert!(db.sales().get_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_and_pagination() {
        let db = setup().await;
        let repo = db.sales();

        for n in 0..3 {
            let mut payload = sale_payload();
            payload.barcode = format!("R-{n}");
            repo.create(&payload).await.unwrap();
        }
        let mut other = sale_payload();
        other.shift_id = "11111111-2222-4333-8444-555555555555".to_string();
        other.status = SaleStatus::Finished;
        repo.create(&other).await.unwrap();

        let all = repo.get_list(&SaleFilter::default()).await.unwrap();
        assert_eq!(all.count, 4);
        // newest first
        assert_eq!(all.items[0].shift_id, other.shift_id);

        let by_shift = repo
            .get_list(&SaleFilter {
                shift_id: Some(SHIFT.to_string()),
                page: Page::new(2, 0),
                ..SaleFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(by_shift.count, 3);
        assert_eq!(by_shift.items.len(), 2);

        let finished = repo
            .get_list(&SaleFilter {
                status: Some(SaleStatus::Finished),
                ..SaleFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(finished.count, 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_sale() {
        let db = setup().await;
        let repo = db.sales();
        let sale = repo.create(&sale_payload()).await.unwrap();

        let mut change = sale_payload();
        change.status = SaleStatus::Cancelled;
        assert_eq!(repo.update(&sale.id, &change).await.unwrap(), 1);
        assert_eq!(repo.update("missing", &change).await.unwrap(), 0);

        let updated = repo.get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(updated.status, SaleStatus::Cancelled);
        assert!(updated.updated_at >= sale.updated_at);

        assert_eq!(repo.delete(&sale.id).await.unwrap(), 1);
        assert_eq!(repo.delete(&sale.id).await.unwrap(), 0);
    }
}
