//! # Request Payloads
//!
//! Create/update payloads, list filters and the paginated list wrapper.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP body / query ──► CreateX / XFilter ──► .validate() ──► repository │
//! │                                                                         │
//! │  repository ──► ListPage<X> { count, items } ──► envelope ──► client    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Update payloads replace every mutable column of the row, so most of them
//! share the shape of their create payload.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{Money, Tenders};
use crate::types::{DiscountType, SaleStatus, UserType};
use crate::validation::{
    parse_int_or_default, validate_amount, validate_barcode, validate_name,
    validate_optional_uuid, validate_phone, validate_quantity, validate_required,
    validate_search_query, validate_uuid, ValidationResult,
};
use crate::DEFAULT_LIMIT;

// =============================================================================
// Pagination
// =============================================================================

/// Limit/offset window for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Page {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Page {
    /// Builds a page, clamping non-positive values to the defaults.
    ///
    /// ```rust
    /// use market_core::requests::Page;
    ///
    /// assert_eq!(Page::new(0, -3), Page { limit: 10, offset: 0 });
    /// assert_eq!(Page::new(25, 50), Page { limit: 25, offset: 50 });
    /// ```
    pub fn new(limit: i64, offset: i64) -> Self {
        Page {
            limit: if limit <= 0 { DEFAULT_LIMIT } else { limit },
            offset: offset.max(0),
        }
    }

    /// Parses raw `limit` / `offset` query values.
    ///
    /// Missing or empty values fall back to the defaults; anything that is
    /// not an integer is rejected with the field name attached.
    pub fn from_query(limit: Option<&str>, offset: Option<&str>) -> ValidationResult<Self> {
        let limit = parse_int_or_default("limit", limit.unwrap_or_default(), DEFAULT_LIMIT)?;
        let offset = parse_int_or_default("offset", offset.unwrap_or_default(), 0)?;
        Ok(Page::new(limit, offset))
    }
}

/// One page of a list query.
///
/// `count` is the number of rows matching the filter, ignoring the page
/// window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ListPage<T> {
    pub count: i64,
    pub items: Vec<T>,
}

impl<T> ListPage<T> {
    pub fn empty() -> Self {
        ListPage {
            count: 0,
            items: Vec::new(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Employee
// =============================================================================

/// Payload for creating an employee.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateEmployee {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub login: String,
    /// Plain password; hashed before it reaches storage.
    pub password: String,
    #[serde(default)]
    pub branch_id: Option<String>,
    #[serde(default)]
    pub salepoint_id: Option<String>,
    #[serde(default)]
    pub user_type: UserType,
}

impl CreateEmployee {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name("first_name", &self.first_name)?;
        validate_name("last_name", &self.last_name)?;
        validate_phone(&self.phone)?;
        validate_name("login", &self.login)?;
        validate_password(&self.password)?;
        validate_optional_uuid("branch_id", self.branch_id.as_deref())?;
        validate_optional_uuid("salepoint_id", self.salepoint_id.as_deref())?;
        Ok(())
    }
}

/// Payload for updating an employee.
///
/// When `password` is omitted the stored hash is kept.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateEmployee {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub login: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub branch_id: Option<String>,
    #[serde(default)]
    pub salepoint_id: Option<String>,
    #[serde(default)]
    pub user_type: UserType,
}

impl UpdateEmployee {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name("first_name", &self.first_name)?;
        validate_name("last_name", &self.last_name)?;
        validate_phone(&self.phone)?;
        validate_name("login", &self.login)?;
        if let Some(password) = &self.password {
            validate_password(password)?;
        }
        validate_optional_uuid("branch_id", self.branch_id.as_deref())?;
        validate_optional_uuid("salepoint_id", self.salepoint_id.as_deref())?;
        Ok(())
    }
}

fn validate_password(password: &str) -> ValidationResult<()> {
    validate_required("password", password)?;
    if password.len() > 128 {
        return Err(ValidationError::TooLong {
            field: "password".to_string(),
            max: 128,
        });
    }
    Ok(())
}

/// Employee list filter. `search` matches first name, last name or phone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeFilter {
    pub page: Page,
    pub search: String,
}

impl EmployeeFilter {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_search_query(&self.search).map(|_| ())
    }
}

// =============================================================================
// Sale
// =============================================================================

/// Payload for opening a sale. Also used as the full-replacement update.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateSale {
    pub branch_id: String,
    pub sale_point_id: String,
    pub shift_id: String,
    pub employee_id: String,
    pub barcode: String,
    #[serde(default)]
    pub status: SaleStatus,
}

impl CreateSale {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_uuid("branch_id", &self.branch_id)?;
        validate_uuid("sale_point_id", &self.sale_point_id)?;
        validate_uuid("shift_id", &self.shift_id)?;
        validate_uuid("employee_id", &self.employee_id)?;
        validate_barcode(&self.barcode)?;
        Ok(())
    }
}

pub type UpdateSale = CreateSale;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleFilter {
    pub page: Page,
    pub branch_id: Option<String>,
    pub shift_id: Option<String>,
    pub employee_id: Option<String>,
    pub status: Option<SaleStatus>,
}

// =============================================================================
// Sale Product
// =============================================================================

/// Payload for a sale line item. Also produced by the scan workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateSaleProduct {
    pub sale_id: String,
    #[serde(default)]
    pub category_id: Option<String>,
    pub product_name: String,
    pub barcode: String,
    #[serde(default)]
    pub remaining_quantity: i64,
    pub quantity: i64,
    #[serde(default)]
    pub allow_discount: bool,
    #[serde(default)]
    pub discount_type: DiscountType,
    #[serde(default)]
    pub discount: i64,
    pub price: Money,
    pub total_amount: Money,
}

impl CreateSaleProduct {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_uuid("sale_id", &self.sale_id)?;
        validate_optional_uuid("category_id", self.category_id.as_deref())?;
        validate_name("product_name", &self.product_name)?;
        validate_barcode(&self.barcode)?;
        validate_quantity(self.quantity)?;
        validate_amount("price", self.price)?;
        validate_amount("total_amount", self.total_amount)?;

        match self.discount_type {
            DiscountType::None => {}
            DiscountType::Percent if !(0..=100).contains(&self.discount) => {
                return Err(ValidationError::OutOfRange {
                    field: "discount".to_string(),
                    min: 0,
                    max: 100,
                });
            }
            _ if self.discount < 0 => {
                return Err(ValidationError::Negative {
                    field: "discount".to_string(),
                });
            }
            _ => {}
        }

        Ok(())
    }
}

pub type UpdateSaleProduct = CreateSaleProduct;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleProductFilter {
    pub page: Page,
    pub sale_id: Option<String>,
    pub barcode: Option<String>,
}

// =============================================================================
// Payment
// =============================================================================

/// Payload for recording the tenders of a sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreatePayment {
    pub sale_id: String,
    #[serde(flatten)]
    #[ts(flatten)]
    pub tenders: Tenders,
}

impl CreatePayment {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_uuid("sale_id", &self.sale_id)?;
        validate_tenders(&self.tenders)
    }
}

pub type UpdatePayment = CreatePayment;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentFilter {
    pub page: Page,
    pub sale_id: Option<String>,
}

// =============================================================================
// Transaction
// =============================================================================

/// Payload for opening a shift's cash ledger.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateTransaction {
    pub shift_id: String,
    #[serde(flatten)]
    #[ts(flatten)]
    pub tenders: Tenders,
}

impl CreateTransaction {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_uuid("shift_id", &self.shift_id)?;
        validate_tenders(&self.tenders)
    }
}

pub type UpdateTransaction = CreateTransaction;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub page: Page,
    pub shift_id: Option<String>,
}

fn validate_tenders(tenders: &Tenders) -> ValidationResult<()> {
    for (field, amount) in tenders.entries() {
        validate_amount(field, amount)?;
    }
    Ok(())
}

// =============================================================================
// Remainder
// =============================================================================

/// Payload for a stock record.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateRemainder {
    pub branch_id: String,
    #[serde(default)]
    pub category_id: Option<String>,
    pub product_name: String,
    pub barcode: String,
    pub price_income: Money,
    pub quantity: i64,
}

impl CreateRemainder {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_uuid("branch_id", &self.branch_id)?;
        validate_optional_uuid("category_id", self.category_id.as_deref())?;
        validate_name("product_name", &self.product_name)?;
        validate_barcode(&self.barcode)?;
        validate_amount("price_income", self.price_income)?;
        if self.quantity < 0 {
            return Err(ValidationError::Negative {
                field: "quantity".to_string(),
            });
        }
        Ok(())
    }
}

pub type UpdateRemainder = CreateRemainder;

/// Remainder list filter. `search` matches the product name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemainderFilter {
    pub page: Page,
    pub branch_id: Option<String>,
    pub barcode: Option<String>,
    pub search: String,
}

impl RemainderFilter {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_search_query(&self.search).map(|_| ())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const BRANCH: &str = "550e8400-e29b-41d4-a716-446655440000";

    fn remainder_payload() -> CreateRemainder {
        CreateRemainder {
            branch_id: BRANCH.to_string(),
            category_id: None,
            product_name: "Coca-Cola 1.5L".to_string(),
            barcode: "4780001234567".to_string(),
            price_income: Money::from_minor(1_200_000),
            quantity: 12,
        }
    }

    #[test]
    fn test_page_defaults() {
        assert_eq!(Page::default(), Page { limit: 10, offset: 0 });
        assert_eq!(Page::from_query(None, None).unwrap(), Page::default());
        assert_eq!(Page::from_query(Some(""), Some("")).unwrap(), Page::default());
        assert_eq!(
            Page::from_query(Some("0"), Some("5")).unwrap(),
            Page { limit: 10, offset: 5 }
        );
    }

    #[test]
    fn test_page_rejects_garbage() {
        let err = Page::from_query(Some("ten"), None).unwrap_err();
        assert_eq!(err.field(), "limit");

        let err = Page::from_query(Some("5"), Some("1.5")).unwrap_err();
        assert_eq!(err.field(), "offset");
    }

    #[test]
    fn test_create_employee_validation() {
        let mut payload = CreateEmployee {
            first_name: "Aziz".to_string(),
            last_name: "Karimov".to_string(),
            phone: "+998901234567".to_string(),
            login: "aziz".to_string(),
            password: "secret".to_string(),
            branch_id: Some(BRANCH.to_string()),
            salepoint_id: None,
            user_type: UserType::Cashier,
        };
        assert!(payload.validate().is_ok());

        payload.branch_id = Some("branch-1".to_string());
        assert_eq!(payload.validate().unwrap_err().field(), "branch_id");

        payload.branch_id = None;
        payload.password = String::new();
        assert_eq!(payload.validate().unwrap_err().field(), "password");
    }

    #[test]
    fn test_employee_payload_defaults() {
        let payload: CreateEmployee = serde_json::from_str(
            r#"{"first_name":"A","last_name":"B","phone":"998","login":"ab","password":"x"}"#,
        )
        .unwrap();
        assert_eq!(payload.user_type, UserType::Cashier);
        assert!(payload.branch_id.is_none());
    }

    #[test]
    fn test_payment_payload_is_flat() {
        let payload: CreatePayment = serde_json::from_str(&format!(
            r#"{{"sale_id":"{BRANCH}","cash":5000,"uzcard":0,"payme":0,"click":0,"humo":0,"apelsin":0,"total_amount":5000}}"#
        ))
        .unwrap();
        assert_eq!(payload.tenders.cash.minor(), 5000);
        assert!(payload.validate().is_ok());

        let mut negative = payload.clone();
        negative.tenders.click = Money::from_minor(-1);
        assert_eq!(negative.validate().unwrap_err().field(), "click");
    }

    #[test]
    fn test_remainder_validation() {
        assert!(remainder_payload().validate().is_ok());

        let mut payload = remainder_payload();
        payload.quantity = -1;
        assert!(matches!(
            payload.validate(),
            Err(ValidationError::Negative { .. })
        ));

        let mut payload = remainder_payload();
        payload.barcode = "  ".to_string();
        assert_eq!(payload.validate().unwrap_err().field(), "barcode");
    }

    #[test]
    fn test_sale_product_discount_rules() {
        let mut line = CreateSaleProduct {
            sale_id: BRANCH.to_string(),
            category_id: None,
            product_name: "Bread".to_string(),
            barcode: "100200".to_string(),
            remaining_quantity: 10,
            quantity: 1,
            allow_discount: true,
            discount_type: DiscountType::Percent,
            discount: 15,
            price: Money::from_minor(500_000),
            total_amount: Money::from_minor(500_000),
        };
        assert!(line.validate().is_ok());

        line.discount = 150;
        assert!(matches!(
            line.validate(),
            Err(ValidationError::OutOfRange { .. })
        ));

        line.discount_type = DiscountType::Fixed;
        line.discount = -5;
        assert!(matches!(line.validate(), Err(ValidationError::Negative { .. })));
    }
}
