//! # Transaction Repository
//!
//! The cash ledger of a shift: running per-channel totals that grow with
//! every completed sale.
//!
//! ```text
//! shift opens ──► create() with zero tenders
//!      │
//!      ▼
//! do-sale ──► newest ledger of the shift += sale payments
//! ```

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::{push_eq, push_page};
use crate::error::DbResult;
use market_core::requests::{CreateTransaction, TransactionFilter, UpdateTransaction};
use market_core::{ListPage, Tenders, Transaction};

const SELECT_TRANSACTION: &str = "SELECT id, shift_id, cash, uzcard, payme, click, humo, \
     apelsin, total_amount, created_at, updated_at FROM transactions";

/// Repository for shift cash ledgers.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    pub async fn create(&self, req: &CreateTransaction) -> DbResult<Transaction> {
        let now = Utc::now();
        let tenders = &req.tenders;
        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            shift_id: req.shift_id.clone(),
            cash: tenders.cash,
            uzcard: tenders.uzcard,
            payme: tenders.payme,
            click: tenders.click,
            humo: tenders.humo,
            apelsin: tenders.apelsin,
            total_amount: tenders.total_amount,
            created_at: now,
            updated_at: now,
        };

        debug!(shift_id = %transaction.shift_id, "Opening shift ledger");

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, shift_id, cash, uzcard, payme, click, humo, apelsin,
                total_amount, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&transaction.id)
        .bind(&transaction.shift_id)
        .bind(transaction.cash)
        .bind(transaction.uzcard)
        .bind(transaction.payme)
        .bind(transaction.click)
        .bind(transaction.humo)
        .bind(transaction.apelsin)
        .bind(transaction.total_amount)
        .bind(transaction.created_at)
        .bind(transaction.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(transaction)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Transaction>> {
        let sql = format!("{SELECT_TRANSACTION} WHERE id = ?1");
        let transaction = sqlx::query_as::<_, Transaction>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(transaction)
    }

    pub async fn get_list(&self, filter: &TransactionFilter) -> DbResult<ListPage<Transaction>> {
        let mut conn = self.pool.acquire().await?;

        let mut count_query =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM transactions WHERE 1 = 1");
        push_eq(&mut count_query, "shift_id", filter.shift_id.as_ref());
        let count = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&mut *conn)
            .await?;

        let mut list_query =
            QueryBuilder::<Sqlite>::new(format!("{SELECT_TRANSACTION} WHERE 1 = 1"));
        push_eq(&mut list_query, "shift_id", filter.shift_id.as_ref());
        push_page(&mut list_query, &filter.page);
        let items = list_query
            .build_query_as::<Transaction>()
            .fetch_all(&mut *conn)
            .await?;

        Ok(ListPage { count, items })
    }

    pub async fn update(&self, id: &str, req: &UpdateTransaction) -> DbResult<u64> {
        debug!(id = %id, "Updating shift ledger");
        let tenders = &req.tenders;

        let result = sqlx::query(
            r#"
            UPDATE transactions SET
                shift_id = ?2,
                cash = ?3,
                uzcard = ?4,
                payme = ?5,
                click = ?6,
                humo = ?7,
                apelsin = ?8,
                total_amount = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&req.shift_id)
        .bind(tenders.cash)
        .bind(tenders.uzcard)
        .bind(tenders.payme)
        .bind(tenders.click)
        .bind(tenders.humo)
        .bind(tenders.apelsin)
        .bind(tenders.total_amount)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete(&self, id: &str) -> DbResult<u64> {
        debug!(id = %id, "Deleting shift ledger");

        let result = sqlx::query("DELETE FROM transactions WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Connection-level helpers
// =============================================================================

/// The most recently opened ledger of a shift.
pub(crate) async fn find_latest_for_shift(
    conn: &mut SqliteConnection,
    shift_id: &str,
) -> DbResult<Option<Transaction>> {
    let sql = format!(
        "{SELECT_TRANSACTION} WHERE shift_id = ?1 ORDER BY created_at DESC, rowid DESC LIMIT 1"
    );
    let transaction = sqlx::query_as::<_, Transaction>(&sql)
        .bind(shift_id)
        .fetch_optional(conn)
        .await?;

    Ok(transaction)
}

/// Overwrites the per-channel totals of a ledger.
pub(crate) async fn set_tenders(
    conn: &mut SqliteConnection,
    id: &str,
    tenders: &Tenders,
) -> DbResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE transactions SET
            cash = ?2,
            uzcard = ?3,
            payme = ?4,
            click = ?5,
            humo = ?6,
            apelsin = ?7,
            total_amount = ?8,
            updated_at = ?9
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .bind(tenders.cash)
    .bind(tenders.uzcard)
    .bind(tenders.payme)
    .bind(tenders.click)
    .bind(tenders.humo)
    .bind(tenders.apelsin)
    .bind(tenders.total_amount)
    .bind(Utc::now())
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

pub(crate) async fn find_by_id(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<Transaction>> {
    let sql = format!("{SELECT_TRANSACTION} WHERE id = ?1");
    let transaction = sqlx::query_as::<_, Transaction>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(transaction)
}
