//! # Sale Product Repository
//!
//! Line items of a sale. Rows are usually written by the scan workflow in
//! [`super::checkout`]; the CRUD surface here serves manual corrections.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::{push_eq, push_page};
use crate::error::DbResult;
use market_core::requests::{CreateSaleProduct, SaleProductFilter, UpdateSaleProduct};
use market_core::{ListPage, Money, SaleProduct};

const SELECT_SALE_PRODUCT: &str = "SELECT id, sale_id, category_id, product_name, barcode, \
     remaining_quantity, quantity, allow_discount, discount_type, discount, price, \
     total_amount, created_at, updated_at FROM sale_products";

/// Repository for sale line items.
#[derive(Debug, Clone)]
pub struct SaleProductRepository {
    pool: SqlitePool,
}

impl SaleProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleProductRepository { pool }
    }

    pub async fn create(&self, req: &CreateSaleProduct) -> DbResult<SaleProduct> {
        let mut conn = self.pool.acquire().await?;
        insert(&mut conn, req).await
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SaleProduct>> {
        let sql = format!("{SELECT_SALE_PRODUCT} WHERE id = ?1");
        let line = sqlx::query_as::<_, SaleProduct>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(line)
    }

    pub async fn get_list(&self, filter: &SaleProductFilter) -> DbResult<ListPage<SaleProduct>> {
        let mut conn = self.pool.acquire().await?;

        let mut count_query =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM sale_products WHERE 1 = 1");
        push_filters(&mut count_query, filter);
        let count = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&mut *conn)
            .await?;

        let mut list_query =
            QueryBuilder::<Sqlite>::new(format!("{SELECT_SALE_PRODUCT} WHERE 1 = 1"));
        push_filters(&mut list_query, filter);
        push_page(&mut list_query, &filter.page);
        let items = list_query
            .build_query_as::<SaleProduct>()
            .fetch_all(&mut *conn)
            .await?;

        Ok(ListPage { count, items })
    }

    /// Replaces every mutable column of a line. Returns rows affected.
    pub async fn update(&self, id: &str, req: &UpdateSaleProduct) -> DbResult<u64> {
        debug!(id = %id, quantity = req.quantity, "Updating sale product");

        let result = sqlx::query(
            r#"
            UPDATE sale_products SET
                sale_id = ?2,
                category_id = ?3,
                product_name = ?4,
                barcode = ?5,
                remaining_quantity = ?6,
                quantity = ?7,
                allow_discount = ?8,
                discount_type = ?9,
                discount = ?10,
                price = ?11,
                total_amount = ?12,
                updated_at = ?13
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&req.sale_id)
        .bind(&req.category_id)
        .bind(&req.product_name)
        .bind(&req.barcode)
        .bind(req.remaining_quantity)
        .bind(req.quantity)
        .bind(req.allow_discount)
        .bind(req.discount_type)
        .bind(req.discount)
        .bind(req.price)
        .bind(req.total_amount)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete(&self, id: &str) -> DbResult<u64> {
        debug!(id = %id, "Deleting sale product");

        let result = sqlx::query("DELETE FROM sale_products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Sqlite>, filter: &SaleProductFilter) {
    push_eq(query, "sale_id", filter.sale_id.as_ref());
    push_eq(query, "barcode", filter.barcode.as_ref());
}

// =============================================================================
// Connection-level helpers
// =============================================================================

pub(crate) async fn insert(
    conn: &mut SqliteConnection,
    req: &CreateSaleProduct,
) -> DbResult<SaleProduct> {
    let now = Utc::now();
    let line = SaleProduct {
        id: Uuid::new_v4().to_string(),
        sale_id: req.sale_id.clone(),
        category_id: req.category_id.clone(),
        product_name: req.product_name.clone(),
        barcode: req.barcode.clone(),
        remaining_quantity: req.remaining_quantity,
        quantity: req.quantity,
        allow_discount: req.allow_discount,
        discount_type: req.discount_type,
        discount: req.discount,
        price: req.price,
        total_amount: req.total_amount,
        created_at: now,
        updated_at: now,
    };

    debug!(sale_id = %line.sale_id, barcode = %line.barcode, "Adding sale product");

    sqlx::query(
        r#"
        INSERT INTO sale_products (
            id, sale_id, category_id, product_name, barcode,
            remaining_quantity, quantity, allow_discount, discount_type, discount,
            price, total_amount, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        "#,
    )
    .bind(&line.id)
    .bind(&line.sale_id)
    .bind(&line.category_id)
    .bind(&line.product_name)
    .bind(&line.barcode)
    .bind(line.remaining_quantity)
    .bind(line.quantity)
    .bind(line.allow_discount)
    .bind(line.discount_type)
    .bind(line.discount)
    .bind(line.price)
    .bind(line.total_amount)
    .bind(line.created_at)
    .bind(line.updated_at)
    .execute(conn)
    .await?;

    Ok(line)
}

/// The line of `sale_id` carrying `barcode`, if it was scanned before.
pub(crate) async fn find_by_sale_and_barcode(
    conn: &mut SqliteConnection,
    sale_id: &str,
    barcode: &str,
) -> DbResult<Option<SaleProduct>> {
    let sql = format!(
        "{SELECT_SALE_PRODUCT} WHERE sale_id = ?1 AND barcode = ?2 \
         ORDER BY created_at ASC, rowid ASC LIMIT 1"
    );
    let line = sqlx::query_as::<_, SaleProduct>(&sql)
        .bind(sale_id)
        .bind(barcode)
        .fetch_optional(conn)
        .await?;

    Ok(line)
}

pub(crate) async fn list_by_sale(
    conn: &mut SqliteConnection,
    sale_id: &str,
) -> DbResult<Vec<SaleProduct>> {
    let sql = format!("{SELECT_SALE_PRODUCT} WHERE sale_id = ?1 ORDER BY created_at ASC, rowid ASC");
    let lines = sqlx::query_as::<_, SaleProduct>(&sql)
        .bind(sale_id)
        .fetch_all(conn)
        .await?;

    Ok(lines)
}

pub(crate) async fn set_quantity(
    conn: &mut SqliteConnection,
    id: &str,
    quantity: i64,
    total_amount: Money,
) -> DbResult<SaleProduct> {
    sqlx::query(
        "UPDATE sale_products SET quantity = ?2, total_amount = ?3, updated_at = ?4 WHERE id = ?1",
    )
    .bind(id)
    .bind(quantity)
    .bind(total_amount)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    let sql = format!("{SELECT_SALE_PRODUCT} WHERE id = ?1");
    let line = sqlx::query_as::<_, SaleProduct>(&sql)
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(line)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::sale::tests::sale_payload;
    use crate::{Database, DbConfig, DbError};
    use market_core::DiscountType;

    fn line_payload(sale_id: &str, barcode: &str) -> CreateSaleProduct {
        CreateSaleProduct {
            sale_id: sale_id.to_string(),
            category_id: None,
            product_name: "Milk 1L".to_string(),
            barcode: barcode.to_string(),
            remaining_quantity: 20,
            quantity: 2,
            allow_discount: false,
            discount_type: DiscountType::None,
            discount: 0,
            price: Money::from_minor(900_000),
            total_amount: Money::from_minor(1_800_000),
        }
    }

    async fn setup() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sale = db.sales().create(&sale_payload()).await.unwrap();
        (db, sale.id)
    }

    #[tokio::test]
    async fn test_create_get_and_list() {
        let (db, sale_id) = setup().await;
        let repo = db.sale_products();

        let line = repo.create(&line_payload(&sale_id, "111")).await.unwrap();
        repo.create(&line_payload(&sale_id, "222")).await.unwrap();

        let fetched = repo.get_by_id(&line.id).await.unwrap().unwrap();
        assert_eq!(fetched.total_amount, Money::from_minor(1_800_000));
        assert_eq!(fetched.discount_type, DiscountType::None);
        assert!(!fetched.allow_discount);

        let by_barcode = repo
            .get_list(&SaleProductFilter {
                barcode: Some("222".to_string()),
                ..SaleProductFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(by_barcode.count, 1);
        assert_eq!(by_barcode.items[0].barcode, "222");

        let by_sale = repo
            .get_list(&SaleProductFilter {
                sale_id: Some(sale_id.clone()),
                ..SaleProductFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(by_sale.count, 2);
    }

    #[tokio::test]
    async fn test_line_requires_existing_sale() {
        let (db, _) = setup().await;
        let err = db
            .sale_products()
            .create(&line_payload("00000000-0000-4000-8000-000000000000", "111"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (db, sale_id) = setup().await;
        let repo = db.sale_products();
        let line = repo.create(&line_payload(&sale_id, "111")).await.unwrap();

        let mut change = line_payload(&sale_id, "111");
        change.quantity = 3;
        change.total_amount = Money::from_minor(2_700_000);
        assert_eq!(repo.update(&line.id, &change).await.unwrap(), 1);

        let updated = repo.get_by_id(&line.id).await.unwrap().unwrap();
        assert_eq!(updated.quantity, 3);

        assert_eq!(repo.delete(&line.id).await.unwrap(), 1);
        assert!(repo.get_by_id(&line.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deleting_sale_cascades_to_lines() {
        let (db, sale_id) = setup().await;
        let line = db
            .sale_products()
            .create(&line_payload(&sale_id, "111"))
            .await
            .unwrap();

        db.sales().delete(&sale_id).await.unwrap();
        assert!(db.sale_products().get_by_id(&line.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_connection_helpers() {
        let (db, sale_id) = setup().await;
        let mut conn = db.pool().acquire().await.unwrap();

        assert!(find_by_sale_and_barcode(&mut conn, &sale_id, "111")
            .await
            .unwrap()
            .is_none());

        let line = insert(&mut conn, &line_payload(&sale_id, "111")).await.unwrap();
        let found = find_by_sale_and_barcode(&mut conn, &sale_id, "111")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, line.id);

        let bumped = set_quantity(&mut conn, &line.id, 5, Money::from_minor(4_500_000))
            .await
            .unwrap();
        assert_eq!(bumped.quantity, 5);

        assert_eq!(list_by_sale(&mut conn, &sale_id).await.unwrap().len(), 1);
    }
}
