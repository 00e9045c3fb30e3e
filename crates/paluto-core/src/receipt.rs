//! # Receipt Formatter
//!
//! Lays out a fixed-width text receipt from settled order state.
//!
//! ## Column Layout (38 characters)
//! ```text
//! ┌─────┬───────────────────────┬──────────┐
//! │ QTY │ DESCRIPTION           │   AMOUNT │
//! │ (5) │ (23)                  │     (10) │
//! ├─────┼───────────────────────┼──────────┤
//! │ 2   │ RICE GARLIC           │   150.00 │
//! │ 750 │ FISH MAYA-MAYA        │   337.50 │
//! │     │ SINIGANG              │          │  ← continuation: qty/amount blank
//! └─────┴───────────────────────┴──────────┘
//! ```
//!
//! Quantity shows a serving count for SERVE items and grams (weight × 1000,
//! no decimals) for KG items. Descriptions longer than the 23-column well are
//! word-wrapped onto continuation lines.
//!
//! The formatter emits logical lines tagged Header (center on print) or Body
//! (fixed columns); the renderer owns the final wrap to printable width.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{format_amount, OrderTotals};
use crate::types::{LineItem, Product, Uom};

/// Default receipt width in characters.
pub const RECEIPT_WIDTH: usize = 38;

/// Quantity column width.
const QTY_WIDTH: usize = 5;
/// Description column width.
const DESC_WIDTH: usize = 23;
/// Amount column width.
const AMOUNT_WIDTH: usize = 10;

// =============================================================================
// Line Model
// =============================================================================

/// How the renderer should treat a formatted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// Centered by measured text width.
    Header,
    /// Fixed-column body content.
    Body,
}

/// One logical receipt line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptLine {
    pub text: String,
    pub kind: LineKind,
}

impl ReceiptLine {
    pub fn header(text: impl Into<String>) -> Self {
        ReceiptLine {
            text: text.into(),
            kind: LineKind::Header,
        }
    }

    pub fn body(text: impl Into<String>) -> Self {
        ReceiptLine {
            text: text.into(),
            kind: LineKind::Body,
        }
    }
}

// =============================================================================
// Input
// =============================================================================

/// One printable item row, resolved from a line item and its product.
#[derive(Debug, Clone)]
pub struct ReceiptEntry {
    pub description: String,
    pub uom: Uom,
    pub quantity: i64,
    pub weight_kg: f64,
    pub total: f64,
}

impl ReceiptEntry {
    pub fn from_line(line: &LineItem, product: &Product) -> Self {
        ReceiptEntry {
            description: product.display_name(),
            uom: product.uom,
            quantity: line.quantity,
            weight_kg: line.weight_kg,
            total: line.total,
        }
    }

    /// Quantity cell: serving count for SERVE, grams for KG.
    fn quantity_cell(&self) -> String {
        match self.uom {
            Uom::Serve => self.quantity.to_string(),
            Uom::Kg => format!("{:.0}", self.weight_kg * 1000.0),
        }
    }
}

/// Everything the formatter needs; assembled by the service layer from the
/// settled transaction plus store settings.
#[derive(Debug, Clone)]
pub struct ReceiptInput {
    pub store_name: String,
    pub address: Vec<String>,
    pub table_id: i64,
    pub cashier: String,
    pub entries: Vec<ReceiptEntry>,
    pub totals: OrderTotals,
    /// Total cash tendered across payments.
    pub tendered: f64,
    /// Change handed back at settlement.
    pub change: f64,
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Formatting
// =============================================================================

/// Formats the full receipt as a sequence of tagged logical lines.
pub fn format_receipt(input: &ReceiptInput) -> Vec<ReceiptLine> {
    let mut lines = Vec::new();
    let rule = "-".repeat(RECEIPT_WIDTH);

    // Centered store header
    lines.push(ReceiptLine::header(input.store_name.to_uppercase()));
    for address_line in &input.address {
        lines.push(ReceiptLine::header(address_line.clone()));
    }
    lines.push(ReceiptLine::header("OFFICIAL RECEIPT"));
    lines.push(ReceiptLine::body(rule.clone()));

    // Item table
    lines.push(ReceiptLine::body(column_row("QTY", "DESCRIPTION", "AMOUNT")));
    for entry in &input.entries {
        for row in item_rows(entry) {
            lines.push(ReceiptLine::body(row));
        }
    }
    lines.push(ReceiptLine::body(rule.clone()));

    // Totals: the total appears twice, matching both historical invoice forms
    lines.push(labeled(
        "TOTAL:",
        &format_amount(input.totals.total),
    ));
    lines.push(labeled(
        "TOTAL AMOUNT DUE:",
        &format_amount(input.totals.total),
    ));
    lines.push(labeled("AMOUNT TENDERED:", &format_amount(input.tendered)));
    lines.push(labeled("CHANGE:", &format_amount(input.change)));
    lines.push(ReceiptLine::body(String::new()));

    // Blank invoice fields the customer may fill in
    lines.push(ReceiptLine::body("CUSTOMER: ____________________"));
    lines.push(ReceiptLine::body("ADDRESS: _____________________"));
    lines.push(ReceiptLine::body("TIN: _________________________"));
    lines.push(ReceiptLine::body("BUS. STYLE: __________________"));
    lines.push(ReceiptLine::body(String::new()));

    // VAT breakdown; exempt sales are always 0.00 (not modeled)
    lines.push(labeled(
        "VATABLE SALES:",
        &format_amount(input.totals.vatable_sales),
    ));
    lines.push(labeled(
        "VAT AMOUNT:",
        &format_amount(input.totals.vat_amount),
    ));
    lines.push(labeled("VAT EXEMPT SALES:", &format_amount(0.0)));
    lines.push(ReceiptLine::body(String::new()));

    lines.push(labeled("NO. OF ITEMS:", &input.entries.len().to_string()));
    lines.push(labeled("TABLE NO:", &input.table_id.to_string()));
    lines.push(labeled("CASHIER:", &input.cashier));
    lines.push(ReceiptLine::body(rule));

    // Closing centered timestamp
    lines.push(ReceiptLine::header(
        input.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
    ));
    lines.push(ReceiptLine::header("THANK YOU PO! COME AGAIN"));

    lines
}

/// One item as its column rows: first row carries qty and amount, wrapped
/// description continuations leave both columns blank.
fn item_rows(entry: &ReceiptEntry) -> Vec<String> {
    let description_lines = wrap_words(&entry.description, DESC_WIDTH);
    let mut rows = Vec::with_capacity(description_lines.len().max(1));

    let mut first = true;
    for chunk in description_lines {
        if first {
            rows.push(column_row(
                &entry.quantity_cell(),
                &chunk,
                &format_amount(entry.total),
            ));
            first = false;
        } else {
            rows.push(column_row("", &chunk, ""));
        }
    }

    if first {
        // Empty description still produces one row
        rows.push(column_row(
            &entry.quantity_cell(),
            "",
            &format_amount(entry.total),
        ));
    }

    rows
}

/// Builds one 38-character row: qty left in 5, description left in 23,
/// amount right in 10.
fn column_row(qty: &str, description: &str, amount: &str) -> String {
    format!(
        "{:<qty$}{:<desc$}{:>amt$}",
        truncate(qty, QTY_WIDTH),
        truncate(description, DESC_WIDTH),
        truncate(amount, AMOUNT_WIDTH),
        qty = QTY_WIDTH,
        desc = DESC_WIDTH,
        amt = AMOUNT_WIDTH,
    )
}

/// A footer row: label left-justified, value right-justified across the width.
fn labeled(label: &str, value: &str) -> ReceiptLine {
    let value_width = RECEIPT_WIDTH.saturating_sub(label.len()).max(1);
    ReceiptLine::body(format!("{label}{value:>value_width$}"))
}

/// Greedy word wrap; words longer than `width` are hard-split.
///
/// Widths are measured in characters, not bytes, so accented menu text
/// splits cleanly.
pub fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let mut word = word;
        let mut word_width = word.chars().count();
        // Hard-split oversized words
        while word_width > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            let (head, tail) = word.split_at(char_offset(word, width));
            lines.push(head.to_string());
            word = tail;
            word_width -= width;
        }

        if current.is_empty() {
            current.push_str(word);
            current_width = word_width;
        } else if current_width + 1 + word_width <= width {
            current.push(' ');
            current.push_str(word);
            current_width += 1 + word_width;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_width = word_width;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn truncate(text: &str, width: usize) -> &str {
    &text[..char_offset(text, width)]
}

/// Byte offset of the `width`-th character, clamped to the string's end.
fn char_offset(text: &str, width: usize) -> usize {
    text.char_indices()
        .nth(width)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}

// =============================================================================
// Unit Tests
// =============================================================================
