//! # Domain Types
//!
//! Core domain types used throughout Paluto POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    LineItem     │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  uom SERVE/KG   │   │  transaction_id │   │  transaction_id │       │
//! │  │  price          │   │  qty/weight_kg  │   │  amount (capped)│       │
//! │  │  variety fields │   │  subtotal/disc. │   │  method         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   OrderStatus   │   │   OrderMode     │   │ DiscountRequest │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  PENDING        │   │  regular        │   │  Senior / Pwd   │       │
//! │  │  ACTIVE→READY   │   │  takeout        │   │  Employee       │       │
//! │  │  →SERVED→PAID   │   └─────────────────┘   │  Custom / Remove│       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! A transaction is not its own row: it is the set of line items sharing one
//! opaque 8-character alphanumeric token, exactly like the original sales
//! ledger. Line items, payments and products carry UUID v4 primary keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Unit of Measure
// =============================================================================

/// How a product is priced.
///
/// ## Why It Matters
/// The unit-of-measure decides which of {quantity, weight} drives a line's
/// subtotal: SERVE items are priced per discrete serving, KG items per
/// kilogram (the POS UI collects grams and divides by 1000).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum Uom {
    /// Priced per discrete serving (quantity).
    Serve,
    /// Priced per kilogram (weight).
    Kg,
}

impl Uom {
    /// Parses a unit-of-measure string case-insensitively.
    pub fn parse(value: &str) -> CoreResult<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "SERVE" => Ok(Uom::Serve),
            "KG" => Ok(Uom::Kg),
            other => Err(CoreError::invalid_input(format!(
                "unknown unit of measure '{other}'"
            ))),
        }
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle status of an order.
///
/// ## State Machine
/// ```text
/// PENDING ──► ACTIVE ──► READY ──► SERVED ──► PAID
///    │
///    └─ deleted on cancellation (a removal, not a transition)
/// ```
/// No status ever moves backward. PAID is reachable from any status at
/// settlement time, because settlement is unconditional once the cashier has
/// reconciled the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Items staged at checkout, not yet confirmed.
    Pending,
    /// Confirmed order, visible to the kitchen.
    Active,
    /// Kitchen finished preparing.
    Ready,
    /// Delivered to the table.
    Served,
    /// Settled; table is free again.
    Paid,
}

impl OrderStatus {
    /// Whether the kitchen workflow allows moving from `self` to `to`.
    ///
    /// Only ACTIVE → READY and READY → SERVED are kitchen transitions.
    /// PAID is reserved for settlement and is not reachable here.
    pub fn is_kitchen_transition(self, to: OrderStatus) -> bool {
        matches!(
            (self, to),
            (OrderStatus::Active, OrderStatus::Ready)
                | (OrderStatus::Ready, OrderStatus::Served)
        )
    }

    /// Statuses that occupy a table (everything before settlement except
    /// staged checkout items).
    pub fn occupies_table(self) -> bool {
        matches!(
            self,
            OrderStatus::Active | OrderStatus::Ready | OrderStatus::Served
        )
    }
}

// =============================================================================
// Order Mode
// =============================================================================

/// Dine-in vs takeout, recorded on every line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderMode {
    Regular,
    Takeout,
}

impl Default for OrderMode {
    fn default() -> Self {
        OrderMode::Regular
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// GCash mobile wallet.
    Gcash,
    /// Card payment on external terminal.
    Card,
}

impl PaymentMethod {
    /// Display label used on receipts.
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Gcash => "GCASH",
            PaymentMethod::Card => "CARD",
        }
    }
}

// =============================================================================
// Discounts
// =============================================================================

/// The tag saved on every line item once a discount is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    Senior,
    Pwd,
    Employee,
    Custom,
}

impl DiscountKind {
    /// Uppercase label for operator-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            DiscountKind::Senior => "SENIOR",
            DiscountKind::Pwd => "PWD",
            DiscountKind::Employee => "EMPLOYEE",
            DiscountKind::Custom => "CUSTOM",
        }
    }
}

/// A transaction-level discount request from the cashier.
///
/// Each request is converted into a single deduction ratio applied uniformly
/// across line items; requests fully replace one another (the ratio is always
/// recomputed from the current subtotal, never accumulated).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "discountType", rename_all = "lowercase")]
pub enum DiscountRequest {
    /// Statutory 20% + VAT exemption on the eligible diners' share.
    Senior { headcount: i64, total_diners: i64 },
    /// Same computation as Senior, different tag.
    Pwd { headcount: i64, total_diners: i64 },
    /// Flat 10% off the subtotal.
    Employee,
    /// Operator-defined percentage, 0–100.
    Custom { percent: f64 },
    /// Clears any existing discount.
    Remove,
}

impl DiscountRequest {
    /// Builds a request from loosely-typed routing-layer parameters.
    ///
    /// Unknown kinds are rejected with `InvalidInput` — the original behavior
    /// for a bad `discount_type` field.
    pub fn from_parts(
        kind: &str,
        headcount: Option<i64>,
        total_diners: Option<i64>,
        percent: Option<f64>,
    ) -> CoreResult<Self> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "senior" => Ok(DiscountRequest::Senior {
                headcount: headcount.unwrap_or(0),
                total_diners: total_diners.unwrap_or(1),
            }),
            "pwd" => Ok(DiscountRequest::Pwd {
                headcount: headcount.unwrap_or(0),
                total_diners: total_diners.unwrap_or(1),
            }),
            "employee" => Ok(DiscountRequest::Employee),
            "custom" => Ok(DiscountRequest::Custom {
                percent: percent.unwrap_or(0.0),
            }),
            "remove" => Ok(DiscountRequest::Remove),
            other => Err(CoreError::invalid_input(format!(
                "invalid discount type '{other}'"
            ))),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product on the menu.
///
/// The catalog describes seafood-house fare: a product is identified by a
/// combination of descriptive fields (variety, state, cooking style) rather
/// than a single name column, so display names are composed on demand.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Menu category (e.g. "SEAFOOD", "DRINKS").
    pub category: String,

    /// Broad type within the category (e.g. "FISH", "CRAB").
    pub product_type: String,

    /// First variety descriptor (e.g. "TILAPIA").
    pub variety_1: String,

    /// Second variety descriptor; blank when unused.
    pub variety_2: String,

    /// First state descriptor (e.g. "DEAD", "ALIVE"); blank when unused.
    pub state_1: String,

    /// Second state descriptor; blank when unused.
    pub state_2: String,

    /// Cooking style (e.g. "GRILLED", "SINIGANG").
    pub luto: Option<String>,

    /// Whether the product is priced per serving or per kilogram.
    pub uom: Uom,

    /// Unit price: per serving for SERVE, per kilogram for KG.
    pub price: f64,
}

impl Product {
    /// Full display name for receipts and exports: every descriptive field
    /// joined in catalog order, blanks skipped.
    pub fn display_name(&self) -> String {
        join_parts(&[
            self.product_type.as_str(),
            self.variety_1.as_str(),
            self.variety_2.as_str(),
            self.state_1.as_str(),
            self.state_2.as_str(),
            self.luto.as_deref().unwrap_or(""),
        ])
    }

    /// Short name for kitchen tickets: a DEAD/ALIVE state collapses to its
    /// initial ("D. " / "A. ") ahead of variety and cooking style.
    pub fn kitchen_name(&self) -> String {
        let state = if self.state_1.trim().is_empty() {
            self.state_2.as_str()
        } else {
            self.state_1.as_str()
        };

        let prefix = Some(state)
            .filter(|s| {
                let s = s.trim().to_ascii_uppercase();
                s == "DEAD" || s == "ALIVE"
            })
            .and_then(|s| s.trim().chars().next())
            .map(|c| format!("{}.", c.to_ascii_uppercase()));

        join_parts(&[
            prefix.as_deref().unwrap_or(""),
            self.variety_1.as_str(),
            self.variety_2.as_str(),
            self.luto.as_deref().unwrap_or(""),
        ])
    }
}

/// Joins the non-empty parts with single spaces.
fn join_parts(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// Line Item
// =============================================================================

/// One product entry within a transaction's order.
///
/// ## Invariants
/// - `subtotal` is derived from the product price and whichever of
///   {quantity, weight_kg} the unit-of-measure dictates
/// - `total = subtotal - discount`
/// - one line per (transaction, product) while the transaction is ACTIVE;
///   repeated adds merge instead of duplicating rows
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LineItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Opaque transaction token this line belongs to.
    pub transaction_id: String,

    /// Table the order was taken at.
    pub table_id: i64,

    /// Product reference.
    pub product_id: String,

    /// Discrete units ordered (SERVE products).
    pub quantity: i64,

    /// Weight ordered in kilograms (KG products; grams input ÷ 1000).
    pub weight_kg: f64,

    /// Price × quantity or price × weight_kg per the product's UOM.
    pub subtotal: f64,

    /// Proportional share of the transaction discount.
    pub discount: f64,

    /// `subtotal - discount`.
    pub total: f64,

    /// Tag of the discount currently applied, if any.
    pub discount_type: Option<DiscountKind>,

    /// Lifecycle status (shared per transaction, stored per row).
    pub status: OrderStatus,

    /// Dine-in or takeout.
    pub order_mode: OrderMode,

    /// When the line was first added.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Payment
// =============================================================================

/// A payment applied towards a transaction.
///
/// Multiple payments may exist per transaction (partial settlement); the
/// recorded `amount` is always the applied amount — capped at the remaining
/// balance at the time it was taken — never the raw tendered cash.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Payment {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Transaction this payment settles.
    pub transaction_id: String,

    /// Applied amount (≤ remaining balance when recorded).
    pub amount: f64,

    /// Raw cash handed over on this tender; `amount_given - amount` went
    /// back as change.
    pub amount_given: f64,

    /// How the customer paid.
    pub method: PaymentMethod,

    /// When the payment was taken.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
