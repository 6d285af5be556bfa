//! # Checkout Rules
//!
//! Pure decisions behind the two store workflows. The database layer loads
//! rows, asks this module what to do, then writes the answer back inside a
//! single transaction.
//!
//! ## Scan Barcode
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  barcode ──► Remainder (branch stock)                                   │
//! │                 │                                                       │
//! │                 ├── no line in sale yet ──► AddLine  (quantity = 1)     │
//! │                 │                                                       │
//! │                 └── line exists ─────────► Increment (quantity + 1)     │
//! │                                               │                         │
//! │           new quantity > min(stock, cap) ──┴──► QuantityLimit           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Do Sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ensure_open(sale)                                                      │
//! │  settle_ledger(shift transaction, payments)   ──► new ledger tenders    │
//! │  plan_stock_deductions(lines, remainders)     ──► quantity per stock row│
//! │  status ──► finished                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, Tenders};
use crate::requests::CreateSaleProduct;
use crate::types::{DiscountType, Payment, Remainder, Sale, SaleProduct, Transaction};
use crate::MAX_ITEM_QUANTITY;

// =============================================================================
// Scan
// =============================================================================

/// What a barcode scan should do to the sale.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanDecision {
    /// First unit of this product in the sale.
    AddLine(CreateSaleProduct),
    /// Bump an existing line by one unit.
    Increment {
        id: String,
        quantity: i64,
        total_amount: Money,
    },
}

/// Decides how a scanned product enters the sale.
///
/// A new line copies name, barcode, category and price from the stock
/// record and starts at quantity 1 without discount. An existing line grows
/// by one unit at its own recorded price. Either way the resulting quantity
/// may not exceed what the branch holds, nor `MAX_ITEM_QUANTITY`.
pub fn decide_scan(
    sale_id: &str,
    remainder: &Remainder,
    existing: Option<&SaleProduct>,
) -> CoreResult<ScanDecision> {
    if remainder.quantity <= 0 {
        return Err(CoreError::QuantityLimit {
            barcode: remainder.barcode.clone(),
            available: remainder.quantity.max(0),
        });
    }

    let Some(line) = existing else {
        return Ok(ScanDecision::AddLine(CreateSaleProduct {
            sale_id: sale_id.to_string(),
            category_id: remainder.category_id.clone(),
            product_name: remainder.product_name.clone(),
            barcode: remainder.barcode.clone(),
            remaining_quantity: remainder.quantity,
            quantity: 1,
            allow_discount: false,
            discount_type: DiscountType::None,
            discount: 0,
            price: remainder.price_income,
            total_amount: remainder.price_income,
        }));
    };

    let quantity = line.quantity + 1;
    let ceiling = remainder.quantity.min(MAX_ITEM_QUANTITY);
    if quantity > ceiling {
        return Err(CoreError::QuantityLimit {
            barcode: remainder.barcode.clone(),
            available: ceiling,
        });
    }

    Ok(ScanDecision::Increment {
        id: line.id.clone(),
        quantity,
        total_amount: line.total_amount + line.price,
    })
}

// =============================================================================
// Do Sale
// =============================================================================

/// Only sales still being scanned can be changed.
pub fn ensure_open(sale: &Sale) -> CoreResult<()> {
    if !sale.is_open() {
        return Err(CoreError::InvalidSaleStatus {
            sale_id: sale.id.clone(),
            current_status: sale.status.to_string(),
        });
    }
    Ok(())
}

/// Adds every payment of a sale to the shift's ledger.
///
/// ## Example
/// A ledger holding 100 cash plus a payment of 30 cash and 20 click
/// settles to 130 cash and 20 click.
pub fn settle_ledger(
    sale_id: &str,
    transaction: &Transaction,
    payments: &[Payment],
) -> CoreResult<Tenders> {
    if payments.is_empty() {
        return Err(CoreError::NoPayment {
            sale_id: sale_id.to_string(),
        });
    }

    let paid: Tenders = payments.iter().map(Payment::tenders).sum();
    Ok(transaction.tenders() + paid)
}

/// One stock row to decrement when a sale completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockDeduction {
    pub remainder_id: String,
    pub barcode: String,
    /// Units sold.
    pub quantity: i64,
    /// Stock left after the deduction.
    pub remaining: i64,
}

/// Matches sale lines to the branch's stock rows by barcode.
///
/// Lines whose barcode has no stock row in the branch are left out. Several
/// lines with the same barcode are combined before the stock check.
pub fn plan_stock_deductions(
    lines: &[SaleProduct],
    remainders: &[Remainder],
) -> CoreResult<Vec<StockDeduction>> {
    let mut plan: Vec<StockDeduction> = Vec::new();

    for line in lines {
        let Some(remainder) = remainders.iter().find(|r| r.barcode == line.barcode) else {
            continue;
        };

        match plan.iter_mut().find(|d| d.remainder_id == remainder.id) {
            Some(deduction) => {
                deduction.quantity += line.quantity;
                deduction.remaining -= line.quantity;
            }
            None => plan.push(StockDeduction {
                remainder_id: remainder.id.clone(),
                barcode: remainder.barcode.clone(),
                quantity: line.quantity,
                remaining: remainder.quantity - line.quantity,
            }),
        }
    }

    if let Some(short) = plan.iter().find(|d| d.remaining < 0) {
        return Err(CoreError::InsufficientStock {
            barcode: short.barcode.clone(),
            available: short.quantity + short.remaining,
            requested: short.quantity,
        });
    }

    Ok(plan)
}

/// Barcodes of the sale's lines without duplicates, in scan order.
pub fn line_barcodes(lines: &[SaleProduct]) -> Vec<String> {
    let mut barcodes: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        if !barcodes.contains(&line.barcode) {
            barcodes.push(line.barcode.clone());
        }
    }
    barcodes
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SaleStatus;
    use chrono::Utc;

    fn remainder(barcode: &str, quantity: i64, price: i64) -> Remainder {
        let now = Utc::now();
        Remainder {
            id: format!("rem-{barcode}"),
            branch_id: "branch".to_string(),
            category_id: Some("drinks".to_string()),
            product_name: format!("Product {barcode}"),
            barcode: barcode.to_string(),
            price_income: Money::from_minor(price),
            quantity,
            created_at: now,
            updated_at: now,
        }
    }

    fn line(barcode: &str, quantity: i64, price: i64) -> SaleProduct {
        let now = Utc::now();
        SaleProduct {
            id: format!("line-{barcode}"),
            sale_id: "sale".to_string(),
            category_id: None,
            product_name: format!("Product {barcode}"),
            barcode: barcode.to_string(),
            remaining_quantity: 10,
            quantity,
            allow_discount: false,
            discount_type: DiscountType::None,
            discount: 0,
            price: Money::from_minor(price),
            total_amount: Money::from_minor(price * quantity),
            created_at: now,
            updated_at: now,
        }
    }

    fn ledger(cash: i64) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: "tx".to_string(),
            shift_id: "shift".to_string(),
            cash: Money::from_minor(cash),
            uzcard: Money::zero(),
            payme: Money::zero(),
            click: Money::zero(),
            humo: Money::zero(),
            apelsin: Money::zero(),
            total_amount: Money::from_minor(cash),
            created_at: now,
            updated_at: now,
        }
    }

    fn payment(cash: i64, click: i64) -> Payment {
        let now = Utc::now();
        Payment {
            id: "pay".to_string(),
            sale_id: "sale".to_string(),
            cash: Money::from_minor(cash),
            uzcard: Money::zero(),
            payme: Money::zero(),
            click: Money::from_minor(click),
            humo: Money::zero(),
            apelsin: Money::zero(),
            total_amount: Money::from_minor(cash + click),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_first_scan_adds_line_from_stock() {
        let stock = remainder("4780001", 5, 12_000);
        let decision = decide_scan("sale", &stock, None).unwrap();

        let ScanDecision::AddLine(new_line) = decision else {
            panic!("expected a new line");
        };
        assert_eq!(new_line.quantity, 1);
        assert_eq!(new_line.remaining_quantity, 5);
        assert_eq!(new_line.price, Money::from_minor(12_000));
        assert_eq!(new_line.total_amount, Money::from_minor(12_000));
        assert_eq!(new_line.category_id.as_deref(), Some("drinks"));
        assert!(!new_line.allow_discount);
    }

    #[test]
    fn test_repeat_scan_increments_line() {
        let stock = remainder("4780001", 5, 12_000);
        let existing = line("4780001", 2, 12_000);

        let decision = decide_scan("sale", &stock, Some(&existing)).unwrap();
        assert_eq!(
            decision,
            ScanDecision::Increment {
                id: "line-4780001".to_string(),
                quantity: 3,
                total_amount: Money::from_minor(36_000),
            }
        );
    }

    #[test]
    fn test_scan_stops_at_stock_level() {
        let stock = remainder("4780001", 3, 100);

        assert!(decide_scan("sale", &stock, Some(&line("4780001", 2, 100))).is_ok());

        let err = decide_scan("sale", &stock, Some(&line("4780001", 3, 100))).unwrap_err();
        assert!(matches!(err, CoreError::QuantityLimit { available: 3, .. }));
    }

    #[test]
    fn test_scan_stops_at_line_cap() {
        let stock = remainder("4780001", 20_000, 100);
        let below = line("4780001", MAX_ITEM_QUANTITY - 1, 100);

        match decide_scan("sale", &stock, Some(&below)).unwrap() {
            ScanDecision::Increment { quantity, .. } => assert_eq!(quantity, MAX_ITEM_QUANTITY),
            other => panic!("expected increment, got {other:?}"),
        }

        let full = line("4780001", MAX_ITEM_QUANTITY, 100);
        let err = decide_scan("sale", &stock, Some(&full)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::QuantityLimit { available, .. } if available == MAX_ITEM_QUANTITY
        ));
    }

    #[test]
    fn test_scan_out_of_stock_product() {
        let stock = remainder("4780001", 0, 100);
        let err = decide_scan("sale", &stock, None).unwrap_err();
        assert!(matches!(err, CoreError::QuantityLimit { available: 0, .. }));
    }

    #[test]
    fn test_settle_ledger_sums_all_payments() {
        let settled = settle_ledger("sale", &ledger(100), &[payment(30, 20), payment(5, 0)]).unwrap();

        assert_eq!(settled.cash, Money::from_minor(135));
        assert_eq!(settled.click, Money::from_minor(20));
        assert_eq!(settled.total_amount, Money::from_minor(155));
    }

    #[test]
    fn test_settle_ledger_requires_payment() {
        let err = settle_ledger("sale", &ledger(100), &[]).unwrap_err();
        assert!(matches!(err, CoreError::NoPayment { .. }));
    }

    #[test]
    fn test_plan_stock_deductions() {
        let lines = vec![line("A", 2, 100), line("B", 1, 100), line("GHOST", 4, 100)];
        let stock = vec![remainder("A", 10, 100), remainder("B", 1, 100)];

        let plan = plan_stock_deductions(&lines, &stock).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].remainder_id, "rem-A");
        assert_eq!(plan[0].quantity, 2);
        assert_eq!(plan[0].remaining, 8);
        assert_eq!(plan[1].remaining, 0);
    }

    #[test]
    fn test_plan_combines_duplicate_lines() {
        let lines = vec![line("A", 2, 100), line("A", 3, 100)];
        let stock = vec![remainder("A", 4, 100)];

        let err = plan_stock_deductions(&lines, &stock).unwrap_err();
        match err {
            CoreError::InsufficientStock {
                barcode,
                available,
                requested,
            } => {
                assert_eq!(barcode, "A");
                assert_eq!(available, 4);
                assert_eq!(requested, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ensure_open() {
        let now = Utc::now();
        let mut sale = Sale {
            id: "sale".to_string(),
            branch_id: "b".to_string(),
            sale_point_id: "sp".to_string(),
            shift_id: "shift".to_string(),
            employee_id: "e".to_string(),
            barcode: "R-1".to_string(),
            status: SaleStatus::InProcess,
            created_at: now,
            updated_at: now,
        };
        assert!(ensure_open(&sale).is_ok());

        sale.status = SaleStatus::Finished;
        let err = ensure_open(&sale).unwrap_err();
        assert_eq!(err.to_string(), "Sale sale is finished, cannot perform operation");
    }

    #[test]
    fn test_line_barcodes_dedup() {
        let lines = vec![line("A", 1, 1), line("B", 1, 1), line("A", 1, 1)];
        assert_eq!(line_barcodes(&lines), vec!["A".to_string(), "B".to_string()]);
    }
}
