//! # Money Module
//!
//! Provides the `Money` type for monetary values and `Tenders`, the
//! per-channel breakdown shared by payments and shift transactions.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                             │
//! │                                                                         │
//! │  A shift ledger adds up hundreds of payments per day. Float drift      │
//! │  makes the closing cash count disagree with the register.              │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (tiyin)                             │
//! │    1 soum = 100 tiyin, stored as i64                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use market_core::money::Money;
//!
//! let price = Money::from_minor(1_250_000); // 12 500.00
//! let line_total = price * 3;
//! assert_eq!(line_total.minor(), 3_750_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in minor currency units.
///
/// Serialized as a bare integer in JSON and stored as INTEGER in SQLite.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use market_core::money::Money;
    ///
    /// let price = Money::from_minor(1099);
    /// assert_eq!(price.minor(), 1099);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from major and minor parts.
    ///
    /// For negative amounts only the major part carries the sign:
    /// `from_major_minor(-5, 50)` is -5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Tenders
// =============================================================================

/// Amounts per payment channel.
///
/// ## Where Tenders Flow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Payment (per sale)            Transaction (per shift)                  │
/// │  ─────────────────             ───────────────────────                  │
/// │  cash    20 000.00   ──┐       cash    1 450 000.00                     │
/// │  uzcard  15 000.00     │ do    uzcard    820 000.00                     │
/// │  payme        0.00     ├─────► payme      95 000.00                     │
/// │  click        0.00     │ sale  click      40 000.00                     │
/// │  humo         0.00     │       humo       12 000.00                     │
/// │  apelsin      0.00   ──┘       apelsin         0.00                     │
/// │  total   35 000.00             total   2 417 000.00                     │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct Tenders {
    pub cash: Money,
    pub uzcard: Money,
    pub payme: Money,
    pub click: Money,
    pub humo: Money,
    pub apelsin: Money,
    pub total_amount: Money,
}

impl Tenders {
    /// Sum of the individual channels (excluding `total_amount`).
    pub fn channels_total(&self) -> Money {
        self.cash + self.uzcard + self.payme + self.click + self.humo + self.apelsin
    }

    /// Iterates over `(name, amount)` pairs including the total.
    pub fn entries(&self) -> [(&'static str, Money); 7] {
        [
            ("cash", self.cash),
            ("uzcard", self.uzcard),
            ("payme", self.payme),
            ("click", self.click),
            ("humo", self.humo),
            ("apelsin", self.apelsin),
            ("total_amount", self.total_amount),
        ]
    }
}

impl Add for Tenders {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Tenders {
            cash: self.cash + other.cash,
            uzcard: self.uzcard + other.uzcard,
            payme: self.payme + other.payme,
            click: self.click + other.click,
            humo: self.humo + other.humo,
            apelsin: self.apelsin + other.apelsin,
            total_amount: self.total_amount + other.total_amount,
        }
    }
}

impl Sum for Tenders {
    fn sum<I: Iterator<Item = Tenders>>(iter: I) -> Self {
        iter.fold(Tenders::default(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
