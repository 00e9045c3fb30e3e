//! # Money Module
//!
//! VAT-inclusive totals and balance arithmetic.
//!
//! ## Why Floats, Rounded Only At Display?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  VAT-INCLUSIVE BACK-CALCULATION                                         │
//! │                                                                         │
//! │  Menu prices already contain 12% VAT, so the tax-exclusive base is     │
//! │  derived by division:                                                   │
//! │                                                                         │
//! │    vat_exclusive = subtotal / 1.12                                      │
//! │    vat_amount    = subtotal - vat_exclusive                             │
//! │                                                                         │
//! │  1000.00 / 1.12 = 892.857142...  ← NOT representable in cents          │
//! │                                                                         │
//! │  Discount ratios chain off these intermediates (senior/PWD shares per   │
//! │  diner), so rounding early would skew every line's proportional        │
//! │  discount. Full f64 precision is kept end to end; rounding to two      │
//! │  decimals happens exactly once, when an amount is formatted for a      │
//! │  receipt or API response.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{LineItem, Payment};

/// VAT rate embedded in every menu price.
pub const VAT_RATE: f64 = 0.12;

/// Divisor that strips the embedded VAT from a VAT-inclusive amount.
pub const VAT_DIVISOR: f64 = 1.0 + VAT_RATE;

// =============================================================================
// VAT Breakdown
// =============================================================================

/// The VAT split of a VAT-inclusive subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VatBreakdown {
    /// Tax-exclusive base (vatable sales).
    pub vat_exclusive: f64,
    /// Embedded tax (subtotal − base).
    pub vat_amount: f64,
}

/// Splits a VAT-inclusive subtotal into base and tax.
///
/// A zero (or negative) subtotal yields a zero split rather than a division
/// artifact.
pub fn vat_breakdown(subtotal: f64) -> VatBreakdown {
    if subtotal <= 0.0 {
        return VatBreakdown {
            vat_exclusive: 0.0,
            vat_amount: 0.0,
        };
    }
    let vat_exclusive = subtotal / VAT_DIVISOR;
    VatBreakdown {
        vat_exclusive,
        vat_amount: subtotal - vat_exclusive,
    }
}

// =============================================================================
// Order Totals
// =============================================================================

/// Aggregated money state of one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    /// Σ line.subtotal.
    pub subtotal: f64,
    /// Σ line.discount.
    pub total_discount: f64,
    /// subtotal − total_discount: what the customer owes.
    pub total: f64,
    /// Tax-exclusive share of the subtotal.
    pub vatable_sales: f64,
    /// Embedded VAT.
    pub vat_amount: f64,
}

/// Sums a transaction's line items into its money state.
pub fn order_totals(items: &[LineItem]) -> OrderTotals {
    let subtotal: f64 = items.iter().map(|line| line.subtotal).sum();
    let total_discount: f64 = items.iter().map(|line| line.discount).sum();
    let vat = vat_breakdown(subtotal);
    OrderTotals {
        subtotal,
        total_discount,
        total: subtotal - total_discount,
        vatable_sales: vat.vat_exclusive,
        vat_amount: vat.vat_amount,
    }
}

/// Σ payments.amount. Payments store applied amounts only, so this can never
/// exceed the post-discount total.
pub fn total_paid(payments: &[Payment]) -> f64 {
    payments.iter().map(|payment| payment.amount).sum()
}

/// Σ payments.amount_given: the cash that actually crossed the counter.
/// Exceeds [`total_paid`] by exactly the change handed back.
pub fn total_tendered(payments: &[Payment]) -> f64 {
    payments.iter().map(|payment| payment.amount_given).sum()
}

/// Outstanding balance: `(subtotal − total_discount) − total_paid`.
pub fn remaining_balance(items: &[LineItem], payments: &[Payment]) -> f64 {
    order_totals(items).total - total_paid(payments)
}

// =============================================================================
// Display Formatting
// =============================================================================

/// Formats an amount with two decimals and comma-grouped thousands, the only
/// place rounding happens.
///
/// ## Example
/// ```rust
/// use paluto_core::money::format_amount;
///
/// assert_eq!(format_amount(1234.5), "1,234.50");
/// assert_eq!(format_amount(892.857142857), "892.86");
/// assert_eq!(format_amount(0.0), "0.00");
/// ```
pub fn format_amount(amount: f64) -> String {
    let rounded = (amount * 100.0).round() / 100.0;
    let negative = rounded < 0.0;
    let cents = (rounded.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped}.{fraction:02}")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::types::{OrderMode, OrderStatus, PaymentMethod};

    fn line(subtotal: f64, discount: f64) -> LineItem {
        LineItem {
            id: "l1".to_string(),
            transaction_id: "TX1".to_string(),
            table_id: 3,
            product_id: "p1".to_string(),
            quantity: 1,
            weight_kg: 0.0,
            subtotal,
            discount,
            total: subtotal - discount,
            discount_type: None,
            status: OrderStatus::Active,
            order_mode: OrderMode::Regular,
            created_at: Utc::now(),
        }
    }

    fn payment(amount: f64) -> Payment {
        Payment {
            id: "pay1".to_string(),
            transaction_id: "TX1".to_string(),
            amount,
            amount_given: amount,
            method: PaymentMethod::Cash,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_vat_breakdown() {
        let vat = vat_breakdown(1000.0);
        assert!((vat.vat_exclusive - 892.8571428571429).abs() < 1e-9);
        assert!((vat.vat_amount - 107.14285714285711).abs() < 1e-9);
        // Split reassembles the subtotal
        assert!((vat.vat_exclusive + vat.vat_amount - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_vat_breakdown_empty_order() {
        let vat = vat_breakdown(0.0);
        assert_eq!(vat.vat_exclusive, 0.0);
        assert_eq!(vat.vat_amount, 0.0);
    }

    #[test]
    fn test_order_totals() {
        let items = vec![line(600.0, 60.0), line(400.0, 40.0)];
        let totals = order_totals(&items);
        assert_eq!(totals.subtotal, 1000.0);
        assert_eq!(totals.total_discount, 100.0);
        assert_eq!(totals.total, 900.0);
        assert!((totals.vatable_sales - 892.8571428571429).abs() < 1e-9);
    }

    #[test]
    fn test_remaining_balance() {
        let items = vec![line(500.0, 0.0)];
        let payments = vec![payment(200.0), payment(100.0)];
        assert_eq!(remaining_balance(&items, &payments), 200.0);
    }

    #[test]
    fn test_total_tendered_tracks_raw_cash() {
        let mut over = payment(100.0);
        over.amount_given = 300.0;
        let payments = vec![payment(200.0), over];

        assert_eq!(total_paid(&payments), 300.0);
        assert_eq!(total_tendered(&payments), 500.0);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(7.5), "7.50");
        assert_eq!(format_amount(1234.567), "1,234.57");
        assert_eq!(format_amount(1_000_000.0), "1,000,000.00");
        assert_eq!(format_amount(-42.125), "-42.13");
    }

    #[test]
    fn test_format_rounds_half_up_at_two_decimals() {
        assert_eq!(format_amount(892.857142857), "892.86");
        assert_eq!(format_amount(0.005), "0.01");
    }
}
