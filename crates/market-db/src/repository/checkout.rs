//! # Checkout Repository
//!
//! The two store workflows that touch several tables at once. Each runs in
//! a single SQLite transaction: either every write lands or none does.
//!
//! ## Scan Barcode
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │   ├── sale (must exist, must be in_process)                             │
//! │   ├── remainder by (branch_id, barcode)  ── none ──► ProductNotFound    │
//! │   ├── sale_product by (sale_id, barcode)                                │
//! │   ├── decide_scan() ──► INSERT line  |  UPDATE quantity + 1             │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Do Sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │   ├── sale (must exist, must be in_process)                             │
//! │   ├── payments of the sale                                              │
//! │   ├── newest transaction of the sale's shift ── none ──► 400            │
//! │   ├── UPDATE transaction += sum(payments)                               │
//! │   ├── sale products ──► remainders of the branch (barcode IN ...)      │
//! │   ├── UPDATE remainders -= sold quantity                                │
//! │   ├── UPDATE sale status = finished                                     │
//! │  COMMIT                  (any error above: ROLLBACK on drop)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use super::{payment, remainder, sale, sale_product, transaction};
use crate::error::{DbError, DbResult};
use market_core::checkout::{
    decide_scan, ensure_open, line_barcodes, plan_stock_deductions, settle_ledger, ScanDecision,
    StockDeduction,
};
use market_core::{CoreError, Sale, SaleProduct, SaleStatus, Transaction};

/// What a scan did to the sale.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", content = "sale_product", rename_all = "snake_case")]
pub enum ScanOutcome {
    /// First unit of the product: a new line was created.
    Added(SaleProduct),
    /// The existing line grew by one unit.
    Incremented(SaleProduct),
}

impl ScanOutcome {
    pub fn sale_product(&self) -> &SaleProduct {
        match self {
            ScanOutcome::Added(line) | ScanOutcome::Incremented(line) => line,
        }
    }
}

/// Result of a completed sale.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedSale {
    pub sale: Sale,
    /// The shift ledger after the sale's payments were added.
    pub transaction: Transaction,
    pub deductions: Vec<StockDeduction>,
}

/// Repository running the scan and do-sale workflows.
#[derive(Debug, Clone)]
pub struct CheckoutRepository {
    pool: SqlitePool,
}

impl CheckoutRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CheckoutRepository { pool }
    }

    /// Adds one unit of the product with `barcode` to the sale.
    ///
    /// ## Errors
    /// - `DbError::NotFound` when the sale doesn't exist
    /// - `CoreError::InvalidSaleStatus` when the sale is closed
    /// - `CoreError::ProductNotFound` when the branch has no such barcode
    /// - `CoreError::QuantityLimit` when stock would be exceeded
    pub async fn scan_barcode(
        &self,
        sale_id: &str,
        branch_id: &str,
        barcode: &str,
    ) -> DbResult<ScanOutcome> {
        debug!(sale_id = %sale_id, branch_id = %branch_id, barcode = %barcode, "Scanning barcode");

        let mut tx = self.pool.begin().await?;

        let sale = sale::find_by_id(&mut tx, sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_id))?;
        ensure_open(&sale)?;

        let stock = remainder::find_by_branch_and_barcode(&mut tx, branch_id, barcode)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound {
                barcode: barcode.to_string(),
            })?;
        let existing = sale_product::find_by_sale_and_barcode(&mut tx, sale_id, barcode).await?;

        let outcome = match decide_scan(sale_id, &stock, existing.as_ref())? {
            ScanDecision::AddLine(new_line) => {
                ScanOutcome::Added(sale_product::insert(&mut tx, &new_line).await?)
            }
            ScanDecision::Increment {
                id,
                quantity,
                total_amount,
            } => ScanOutcome::Incremented(
                sale_product::set_quantity(&mut tx, &id, quantity, total_amount).await?,
            ),
        };

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let line = outcome.sale_product();
        info!(
            sale_id = %sale_id,
            barcode = %barcode,
            quantity = line.quantity,
            total = %line.total_amount,
            "Barcode scanned"
        );

        Ok(outcome)
    }

    /// Finalizes a sale.
    ///
    /// Adds every payment of the sale to the newest cash transaction of its
    /// shift, takes the sold quantities out of the branch's stock and marks
    /// the sale finished.
    ///
    /// ## Errors
    /// - `DbError::NotFound` when the sale doesn't exist
    /// - `CoreError::InvalidSaleStatus` when the sale is not in process
    /// - `CoreError::TransactionNotFound` when the shift has no ledger
    /// - `CoreError::NoPayment` when nothing was paid
    /// - `CoreError::InsufficientStock` when stock dropped below a line
    pub async fn complete_sale(&self, sale_id: &str, branch_id: &str) -> DbResult<CompletedSale> {
        debug!(sale_id = %sale_id, branch_id = %branch_id, "Completing sale");

        let mut tx = self.pool.begin().await?;

        let current = sale::find_by_id(&mut tx, sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_id))?;
        ensure_open(&current)?;

        let payments = payment::list_by_sale(&mut tx, sale_id).await?;
        let ledger = transaction::find_latest_for_shift(&mut tx, &current.shift_id)
            .await?
            .ok_or_else(|| CoreError::TransactionNotFound {
                shift_id: current.shift_id.clone(),
            })?;

        let settled = settle_ledger(sale_id, &ledger, &payments)?;
        transaction::set_tenders(&mut tx, &ledger.id, &settled).await?;

        let lines = sale_product::list_by_sale(&mut tx, sale_id).await?;
        let stock =
            remainder::list_by_branch_and_barcodes(&mut tx, branch_id, &line_barcodes(&lines))
                .await?;

        for line in &lines {
            if !stock.iter().any(|r| r.barcode == line.barcode) {
                warn!(
                    sale_id = %sale_id,
                    branch_id = %branch_id,
                    barcode = %line.barcode,
                    "No stock record for sold product, skipping deduction"
                );
            }
        }

        let deductions = plan_stock_deductions(&lines, &stock)?;
        for deduction in &deductions {
            remainder::set_quantity(&mut tx, &deduction.remainder_id, deduction.remaining).await?;
        }

        sale::set_status(&mut tx, sale_id, SaleStatus::Finished).await?;

        let finished = sale::find_by_id(&mut tx, sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_id))?;
        let ledger = transaction::find_by_id(&mut tx, &ledger.id)
            .await?
            .ok_or_else(|| DbError::not_found("Transaction", ledger.id.as_str()))?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            sale_id = %sale_id,
            shift_id = %finished.shift_id,
            payments = payments.len(),
            lines = lines.len(),
            ledger_total = %ledger.total_amount,
            "Sale completed"
        );

        Ok(CompletedSale {
            sale: finished,
            transaction: ledger,
            deductions,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::remainder::tests::remainder_payload;
    use crate::repository::sale::tests::{sale_payload, BRANCH, SHIFT};
    use crate::{Database, DbConfig};
    use market_core::requests::{CreatePayment, CreateTransaction};
    use market_core::{Money, Tenders};

    struct Fixture {
        db: Database,
        sale_id: String,
    }

    /// A sale with two products in stock and an open shift ledger.
    async fn setup() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.remainders()
            .create(&remainder_payload("COLA", "Coca-Cola 1L", 3))
            .await
            .unwrap();
        db.remainders()
            .create(&remainder_payload("BREAD", "Bread", 10))
            .await
            .unwrap();
        db.transactions()
            .create(&CreateTransaction {
                shift_id: SHIFT.to_string(),
                tenders: Tenders {
                    cash: Money::from_minor(50_000),
                    total_amount: Money::from_minor(50_000),
                    ..Tenders::default()
                },
            })
            .await
            .unwrap();
        let sale = db.sales().create(&sale_payload()).await.unwrap();

        Fixture {
            db,
            sale_id: sale.id,
        }
    }

    async fn pay(fixture: &Fixture, cash: i64, click: i64) {
        fixture
            .db
            .payments()
            .create(&CreatePayment {
                sale_id: fixture.sale_id.clone(),
                tenders: Tenders {
                    cash: Money::from_minor(cash),
                    click: Money::from_minor(click),
                    total_amount: Money::from_minor(cash + click),
                    ..Tenders::default()
                },
            })
            .await
            .unwrap();
    }

    async fn stock_of(db: &Database, barcode: &str) -> i64 {
        sqlx::query_scalar("SELECT quantity FROM remainders WHERE barcode = ?1")
            .bind(barcode)
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_scan_adds_then_increments() {
        let f = setup().await;
        let checkout = f.db.checkout();

        let first = checkout.scan_barcode(&f.sale_id, BRANCH, "COLA").await.unwrap();
        let ScanOutcome::Added(line) = first else {
            panic!("expected a new line");
        };
        assert_eq!(line.quantity, 1);
        assert_eq!(line.remaining_quantity, 3);
        assert_eq!(line.price, Money::from_minor(1_000_000));

        let second = checkout.scan_barcode(&f.sale_id, BRANCH, "COLA").await.unwrap();
        assert!(matches!(second, ScanOutcome::Incremented(_)));
        assert_eq!(second.sale_product().id, line.id);
        assert_eq!(second.sale_product().quantity, 2);
        assert_eq!(second.sale_product().total_amount, Money::from_minor(2_000_000));
    }

    #[tokio::test]
    async fn test_scan_respects_stock_limit() {
        let f = setup().await;
        let checkout = f.db.checkout();

        for _ in 0..3 {
            checkout.scan_barcode(&f.sale_id, BRANCH, "COLA").await.unwrap();
        }
        let err = checkout
            .scan_barcode(&f.sale_id, BRANCH, "COLA")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::QuantityLimit { .. })));

        let lines = f
            .db
            .sale_products()
            .get_list(&Default::default())
            .await
            .unwrap();
        assert_eq!(lines.items[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_scan_unknown_product_or_sale() {
        let f = setup().await;
        let checkout = f.db.checkout();

        let err = checkout
            .scan_barcode(&f.sale_id, BRANCH, "NOPE")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::ProductNotFound { .. })));

        let other_branch = "00000000-0000-4000-8000-000000000001";
        let err = checkout
            .scan_barcode(&f.sale_id, other_branch, "COLA")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::ProductNotFound { .. })));

        let err = checkout
            .scan_barcode("00000000-0000-4000-8000-000000000002", BRANCH, "COLA")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_complete_sale() {
        let f = setup().await;
        let checkout = f.db.checkout();

        checkout.scan_barcode(&f.sale_id, BRANCH, "COLA").await.unwrap();
        checkout.scan_barcode(&f.sale_id, BRANCH, "COLA").await.unwrap();
        checkout.scan_barcode(&f.sale_id, BRANCH, "BREAD").await.unwrap();
        pay(&f, 2_000_000, 0).await;
        pay(&f, 0, 1_000_000).await;

        let done = checkout.complete_sale(&f.sale_id, BRANCH).await.unwrap();

        assert_eq!(done.sale.status, SaleStatus::Finished);
        assert_eq!(done.transaction.cash, Money::from_minor(2_050_000));
        assert_eq!(done.transaction.click, Money::from_minor(1_000_000));
        assert_eq!(done.transaction.total_amount, Money::from_minor(3_050_000));
        assert_eq!(done.deductions.len(), 2);

        assert_eq!(stock_of(&f.db, "COLA").await, 1);
        assert_eq!(stock_of(&f.db, "BREAD").await, 9);

        let err = checkout.complete_sale(&f.sale_id, BRANCH).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::InvalidSaleStatus { .. })));

        let err = checkout
            .scan_barcode(&f.sale_id, BRANCH, "BREAD")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::InvalidSaleStatus { .. })));
    }

    #[tokio::test]
    async fn test_complete_sale_rolls_back_on_short_stock() {
        let f = setup().await;
        let checkout = f.db.checkout();

        checkout.scan_barcode(&f.sale_id, BRANCH, "COLA").await.unwrap();
        checkout.scan_barcode(&f.sale_id, BRANCH, "COLA").await.unwrap();
        pay(&f, 2_000_000, 0).await;

        // Stock sold elsewhere after scanning
        sqlx::query("UPDATE remainders SET quantity = 1 WHERE barcode = 'COLA'")
            .execute(f.db.pool())
            .await
            .unwrap();

        let err = checkout.complete_sale(&f.sale_id, BRANCH).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::InsufficientStock { .. })));

        let ledger = f
            .db
            .transactions()
            .get_list(&Default::default())
            .await
            .unwrap();
        assert_eq!(ledger.items[0].cash, Money::from_minor(50_000));

        let sale = f.db.sales().get_by_id(&f.sale_id).await.unwrap().unwrap();
        assert_eq!(sale.status, SaleStatus::InProcess);
        assert_eq!(stock_of(&f.db, "COLA").await, 1);
    }

    #[tokio::test]
    async fn test_complete_sale_preconditions() {
        let f = setup().await;
        let checkout = f.db.checkout();

        let err = checkout.complete_sale(&f.sale_id, BRANCH).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::NoPayment { .. })));

        let err = checkout
            .complete_sale("00000000-0000-4000-8000-000000000002", BRANCH)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let mut orphan = sale_payload();
        orphan.shift_id = "99999999-8888-4777-8666-555555555555".to_string();
        let orphan = f.db.sales().create(&orphan).await.unwrap();
        let err = checkout.complete_sale(&orphan.id, BRANCH).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::TransactionNotFound { .. })));
    }

    #[tokio::test]
    async fn test_complete_sale_without_stock_record() {
        let f = setup().await;

        // A line typed in by hand for a product the branch doesn't stock
        f.db.sale_products()
            .create(&market_core::requests::CreateSaleProduct {
                sale_id: f.sale_id.clone(),
                category_id: None,
                product_name: "Gift card".to_string(),
                barcode: "GIFT".to_string(),
                remaining_quantity: 0,
                quantity: 1,
                allow_discount: false,
                discount_type: Default::default(),
                discount: 0,
                price: Money::from_minor(100),
                total_amount: Money::from_minor(100),
            })
            .await
            .unwrap();
        pay(&f, 100, 0).await;

        let done = f.db.checkout().complete_sale(&f.sale_id, BRANCH).await.unwrap();
        assert!(done.deductions.is_empty());
        assert_eq!(done.sale.status, SaleStatus::Finished);
    }

    #[test]
    fn test_scan_outcome_serialization() {
        let now = chrono::Utc::now();
        let outcome = ScanOutcome::Added(SaleProduct {
            id: "l".to_string(),
            sale_id: "s".to_string(),
            category_id: None,
            product_name: "Tea".to_string(),
            barcode: "T".to_string(),
            remaining_quantity: 4,
            quantity: 1,
            allow_discount: false,
            discount_type: Default::default(),
            discount: 0,
            price: Money::from_minor(10),
            total_amount: Money::from_minor(10),
            created_at: now,
            updated_at: now,
        });

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["action"], "added");
        assert_eq!(json["sale_product"]["barcode"], "T");
    }
}
