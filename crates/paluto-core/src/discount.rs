//! # Discount Calculator
//!
//! Converts a transaction-level discount request into a single deduction
//! ratio applied uniformly across line items.
//!
//! ## Recompute, Don't Accumulate
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every request recomputes the ratio from the CURRENT subtotal and      │
//! │  fully replaces whatever was applied before:                           │
//! │                                                                         │
//! │    apply(senior)  → ratio 0.1428…   discount = subtotal × 0.1428…      │
//! │    apply(custom 5)→ ratio 0.05      discount = subtotal × 0.05         │
//! │    apply(remove)  → ratio 0         discount = 0                       │
//! │                                                                         │
//! │  Re-applying or removing a discount is therefore idempotent and        │
//! │  order-independent. This is intentional, not a shortcut.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Senior / PWD Computation
//! The statutory discount grants 20% off the eligible diners' share of the
//! tax-exclusive bill AND exempts that share's VAT:
//!
//! ```text
//! vat_exclusive    = subtotal / 1.12
//! eligible_share   = (vat_exclusive / total_diners) × headcount
//! discount_amount  = eligible_share × 0.20
//! vat_exempt_share = (vat_amount / total_diners) × headcount
//! deduction        = discount_amount + vat_exempt_share
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::vat_breakdown;
use crate::types::{DiscountKind, DiscountRequest, LineItem};

/// Rate of the statutory Senior Citizen / PWD discount.
pub const SENIOR_PWD_RATE: f64 = 0.20;

/// Rate of the employee discount.
pub const EMPLOYEE_RATE: f64 = 0.10;

// =============================================================================
// Outcome
// =============================================================================

/// The result of a discount computation: the ratio to apply to every line's
/// subtotal, the tag to save alongside it, and an operator-facing message.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountOutcome {
    /// `deduction / subtotal`, in [0, 1] for valid input.
    pub ratio: f64,
    /// Tag persisted on each line; `None` clears an existing discount.
    pub tag: Option<DiscountKind>,
    /// Confirmation message for the cashier.
    pub message: String,
}

impl DiscountOutcome {
    fn removed() -> Self {
        DiscountOutcome {
            ratio: 0.0,
            tag: None,
            message: "Discount removed.".to_string(),
        }
    }
}

// =============================================================================
// Computation
// =============================================================================

/// Computes the deduction ratio for a discount request against the current
/// subtotal.
///
/// ## Errors
/// - `InvalidState` (`EmptyOrder`) when the subtotal is zero — checked before
///   anything else, so no request can mutate an empty order
/// - `InvalidInput` when headcount exceeds total diners, the party size is
///   not positive, or a custom percent falls outside [0, 100]
pub fn compute_discount(subtotal: f64, request: &DiscountRequest) -> CoreResult<DiscountOutcome> {
    if subtotal <= 0.0 {
        return Err(CoreError::EmptyOrder);
    }

    let outcome = match *request {
        DiscountRequest::Senior {
            headcount,
            total_diners,
        } => per_head_statutory(subtotal, DiscountKind::Senior, headcount, total_diners)?,
        DiscountRequest::Pwd {
            headcount,
            total_diners,
        } => per_head_statutory(subtotal, DiscountKind::Pwd, headcount, total_diners)?,
        DiscountRequest::Employee => DiscountOutcome {
            ratio: EMPLOYEE_RATE,
            tag: Some(DiscountKind::Employee),
            message: "Applied 10% Employee discount.".to_string(),
        },
        DiscountRequest::Custom { percent } => {
            if !percent.is_finite() {
                return Err(ValidationError::NotFinite {
                    field: "percentage".to_string(),
                }
                .into());
            }
            if !(0.0..=100.0).contains(&percent) {
                return Err(ValidationError::OutOfRange {
                    field: "percentage".to_string(),
                    min: 0,
                    max: 100,
                }
                .into());
            }
            DiscountOutcome {
                ratio: percent / 100.0,
                tag: Some(DiscountKind::Custom),
                message: format!("Applied {percent}% custom discount."),
            }
        }
        DiscountRequest::Remove => DiscountOutcome::removed(),
    };

    Ok(outcome)
}

/// Senior/PWD: 20% plus VAT exemption on the eligible diners' share.
///
/// A non-positive headcount means "nobody eligible" and clears the discount
/// rather than erroring — the cashier zeroing the headcount field is the
/// original removal gesture.
fn per_head_statutory(
    subtotal: f64,
    kind: DiscountKind,
    headcount: i64,
    total_diners: i64,
) -> CoreResult<DiscountOutcome> {
    if headcount <= 0 {
        return Ok(DiscountOutcome::removed());
    }
    if total_diners < 1 {
        return Err(ValidationError::MustBePositive {
            field: "total_diners".to_string(),
        }
        .into());
    }
    if headcount > total_diners {
        return Err(ValidationError::HeadcountExceedsDiners {
            headcount,
            total_diners,
        }
        .into());
    }

    let vat = vat_breakdown(subtotal);
    let diners = total_diners as f64;
    let heads = headcount as f64;

    let eligible_share = (vat.vat_exclusive / diners) * heads;
    let discount_amount = eligible_share * SENIOR_PWD_RATE;
    let vat_exempt_share = (vat.vat_amount / diners) * heads;
    let deduction = discount_amount + vat_exempt_share;

    Ok(DiscountOutcome {
        ratio: deduction / subtotal,
        tag: Some(kind),
        message: format!("Applied {headcount} {} discount.", kind.label()),
    })
}

// =============================================================================
// Application
// =============================================================================

/// Writes a computed ratio onto every line item: `discount = subtotal × ratio`,
/// `total = subtotal − discount`, tag replaced wholesale.
pub fn apply_ratio(items: &mut [LineItem], ratio: f64, tag: Option<DiscountKind>) {
    for line in items.iter_mut() {
        line.discount = line.subtotal * ratio;
        line.total = line.subtotal - line.discount;
        line.discount_type = tag;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::types::{OrderMode, OrderStatus};

    fn line(subtotal: f64) -> LineItem {
        LineItem {
            id: "l".to_string(),
            transaction_id: "TX".to_string(),
            table_id: 1,
            product_id: "p".to_string(),
            quantity: 1,
            weight_kg: 0.0,
            subtotal,
            discount: 0.0,
            total: subtotal,
            discount_type: None,
            status: OrderStatus::Active,
            order_mode: OrderMode::Regular,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_senior_discount_reference_scenario() {
        // subtotal=1000, 4 diners, 2 seniors:
        // vat_exclusive = 892.857142..., eligible_share = 446.428571...,
        // discount = 89.285714..., vat_exempt = 53.571428...,
        // deduction = 142.857142..., ratio = 0.142857142...
        let outcome = compute_discount(
            1000.0,
            &DiscountRequest::Senior {
                headcount: 2,
                total_diners: 4,
            },
        )
        .unwrap();

        assert!((outcome.ratio - 0.14285714285714285).abs() < 1e-12);
        assert_eq!(outcome.tag, Some(DiscountKind::Senior));
        assert_eq!(outcome.message, "Applied 2 SENIOR discount.");
        assert!((outcome.ratio * 1000.0 - 142.85714285714286).abs() < 1e-9);
    }

    #[test]
    fn test_pwd_matches_senior_math() {
        let senior = compute_discount(
            750.0,
            &DiscountRequest::Senior {
                headcount: 1,
                total_diners: 3,
            },
        )
        .unwrap();
        let pwd = compute_discount(
            750.0,
            &DiscountRequest::Pwd {
                headcount: 1,
                total_diners: 3,
            },
        )
        .unwrap();
        assert_eq!(senior.ratio, pwd.ratio);
        assert_eq!(pwd.tag, Some(DiscountKind::Pwd));
    }

    #[test]
    fn test_headcount_exceeding_diners_rejected() {
        let err = compute_discount(
            1000.0,
            &DiscountRequest::Senior {
                headcount: 5,
                total_diners: 4,
            },
        )
        .unwrap_err();
        assert!(!err.is_invalid_state());
    }

    #[test]
    fn test_zero_headcount_removes_discount() {
        let outcome = compute_discount(
            1000.0,
            &DiscountRequest::Pwd {
                headcount: 0,
                total_diners: 4,
            },
        )
        .unwrap();
        assert_eq!(outcome.ratio, 0.0);
        assert_eq!(outcome.tag, None);
        assert_eq!(outcome.message, "Discount removed.");
    }

    #[test]
    fn test_employee_flat_ten_percent() {
        let outcome = compute_discount(840.0, &DiscountRequest::Employee).unwrap();
        assert_eq!(outcome.ratio, 0.10);
        assert_eq!(outcome.tag, Some(DiscountKind::Employee));
    }

    #[test]
    fn test_custom_percent_bounds() {
        let ok = compute_discount(500.0, &DiscountRequest::Custom { percent: 25.0 }).unwrap();
        assert_eq!(ok.ratio, 0.25);

        let too_big = compute_discount(500.0, &DiscountRequest::Custom { percent: 150.0 });
        assert!(matches!(
            too_big.unwrap_err(),
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));

        let negative = compute_discount(500.0, &DiscountRequest::Custom { percent: -1.0 });
        assert!(negative.is_err());
    }

    #[test]
    fn test_empty_order_is_invalid_state() {
        let err = compute_discount(0.0, &DiscountRequest::Employee).unwrap_err();
        assert!(err.is_invalid_state());
        // Checked before parameter validation: even Remove fails on empty
        assert!(compute_discount(0.0, &DiscountRequest::Remove).is_err());
    }

    #[test]
    fn test_ratio_always_within_unit_interval() {
        for subtotal in [1.0, 99.99, 1000.0, 123456.78] {
            for request in [
                DiscountRequest::Senior {
                    headcount: 3,
                    total_diners: 3,
                },
                DiscountRequest::Employee,
                DiscountRequest::Custom { percent: 100.0 },
                DiscountRequest::Remove,
            ] {
                let outcome = compute_discount(subtotal, &request).unwrap();
                assert!(
                    (0.0..=1.0).contains(&outcome.ratio),
                    "ratio {} out of range for {:?}",
                    outcome.ratio,
                    request
                );
            }
        }
    }

    #[test]
    fn test_apply_ratio_is_proportional_and_replaces() {
        let mut items = vec![line(600.0), line(400.0)];

        apply_ratio(&mut items, 0.1, Some(DiscountKind::Employee));
        assert_eq!(items[0].discount, 60.0);
        assert_eq!(items[1].discount, 40.0);
        assert_eq!(items[0].total, 540.0);
        let total_discount: f64 = items.iter().map(|l| l.discount).sum();
        assert_eq!(total_discount, 1000.0 * 0.1);

        // Re-application replaces rather than stacks
        apply_ratio(&mut items, 0.25, Some(DiscountKind::Custom));
        assert_eq!(items[0].discount, 150.0);
        assert_eq!(items[0].discount_type, Some(DiscountKind::Custom));

        // Remove restores zero discount
        apply_ratio(&mut items, 0.0, None);
        let total_discount: f64 = items.iter().map(|l| l.discount).sum();
        assert_eq!(total_discount, 0.0);
        assert_eq!(items[0].total, 600.0);
        assert_eq!(items[0].discount_type, None);
    }
}
