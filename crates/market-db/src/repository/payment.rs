//! # Payment Repository
//!
//! Tenders collected for a sale. A sale may carry several payments; the
//! do-sale workflow adds all of them to the shift ledger.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::{push_eq, push_page};
use crate::error::DbResult;
use market_core::requests::{CreatePayment, PaymentFilter, UpdatePayment};
use market_core::{ListPage, Payment};

const SELECT_PAYMENT: &str = "SELECT id, sale_id, cash, uzcard, payme, click, humo, apelsin, \
     total_amount, created_at, updated_at FROM payments";

/// Repository for payment database operations.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    pub async fn create(&self, req: &CreatePayment) -> DbResult<Payment> {
        let now = Utc::now();
        let tenders = &req.tenders;
        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            sale_id: req.sale_id.clone(),
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

        debug!(sale_id = %payment.sale_id, total = %payment.total_amount, "Recording payment");

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, sale_id, cash, uzcard, payme, click, humo, apelsin,
                total_amount, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.sale_id)
        .bind(payment.cash)
        .bind(payment.uzcard)
        .bind(payment.payme)
        .bind(payment.click)
        .bind(payment.humo)
        .bind(payment.apelsin)
        .bind(payment.total_amount)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(payment)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Payment>> {
        let sql = format!("{SELECT_PAYMENT} WHERE id = ?1");
        let payment = sqlx::query_as::<_, Payment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(payment)
    }

    pub async fn get_list(&self, filter: &PaymentFilter) -> DbResult<ListPage<Payment>> {
        let mut conn = self.pool.acquire().await?;

        let mut count_query =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM payments WHERE 1 = 1");
        push_eq(&mut count_query, "sale_id", filter.sale_id.as_ref());
        let count = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&mut *conn)
            .await?;

        let mut list_query = QueryBuilder::<Sqlite>::new(format!("{SELECT_PAYMENT} WHERE 1 = 1"));
        push_eq(&mut list_query, "sale_id", filter.sale_id.as_ref());
        push_page(&mut list_query, &filter.page);
        let items = list_query
            .build_query_as::<Payment>()
            .fetch_all(&mut *conn)
            .await?;

        Ok(ListPage { count, items })
    }

    pub async fn update(&self, id: &str, req: &UpdatePayment) -> DbResult<u64> {
        debug!(id = %id, "Updating payment");
        let tenders = &req.tenders;

        let result = sqlx::query(
            r#"
            UPDATE payments SET
                sale_id = ?2,
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
        .bind(&req.sale_id)
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
        debug!(id = %id, "Deleting payment");

        let result = sqlx::query("DELETE FROM payments WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Every payment recorded for a sale, oldest first.
pub(crate) async fn list_by_sale(conn: &mut SqliteConnection, sale_id: &str) -> DbResult<Vec<Payment>> {
    let sql = format!("{SELECT_PAYMENT} WHERE sale_id = ?1 ORDER BY created_at ASC, rowid ASC");
    let payments = sqlx::query_as::<_, Payment>(&sql)
        .bind(sale_id)
        .fetch_all(conn)
        .await?;

    Ok(payments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::sale::tests::sale_payload;
    use crate::{Database, DbConfig};
    use market_core::{Money, Tenders};

    fn payment_payload(sale_id: &str, cash: i64, uzcard: i64) -> CreatePayment {
        CreatePayment {
            sale_id: sale_id.to_string(),
            tenders: Tenders {
                cash: Money::from_minor(cash),
                uzcard: Money::from_minor(uzcard),
                total_amount: Money::from_minor(cash + uzcard),
                ..Tenders::default()
            },
        }
    }

    #[tokio::test]
    async fn test_payment_crud() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sale = db.sales().create(&sale_payload()).await.unwrap();
        let repo = db.payments();

        let payment = repo.create(&payment_payload(&sale.id, 5_000, 2_000)).await.unwrap();
        let fetched = repo.get_by_id(&payment.id).await.unwrap().unwrap();
        assert_eq!(fetched.tenders(), payment.tenders());
        assert_eq!(fetched.total_amount, Money::from_minor(7_000));

        let change = payment_payload(&sale.id, 1_000, 0);
        assert_eq!(repo.update(&payment.id, &change).await.unwrap(), 1);
        let updated = repo.get_by_id(&payment.id).await.unwrap().unwrap();
        assert_eq!(updated.cash, Money::from_minor(1_000));
        assert!(updated.uzcard.is_zero());

        assert_eq!(repo.delete(&payment.id).await.unwrap(), 1);
        assert!(repo.get_by_id(&payment.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_by_sale() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sale = db.sales().create(&sale_payload()).await.unwrap();
        let other = db.sales().create(&sale_payload()).await.unwrap();
        let repo = db.payments();

        repo.create(&payment_payload(&sale.id, 100, 0)).await.unwrap();
        repo.create(&payment_payload(&sale.id, 0, 200)).await.unwrap();
        repo.create(&payment_payload(&other.id, 50, 0)).await.unwrap();

        let page = repo
            .get_list(&PaymentFilter {
                sale_id: Some(sale.id.clone()),
                ..PaymentFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(page.count, 2);

        let mut conn = db.pool().acquire().await.unwrap();
        let payments = list_by_sale(&mut conn, &sale.id).await.unwrap();
        assert_eq!(payments.len(), 2);
        assert_eq!(payments[0].cash, Money::from_minor(100));
    }
}
