//! # Receipt Renderer
//!
//! Converts formatted receipt lines into a paginated printable document
//! sized to its content, tuned for narrow thermal paper.
//!
//! ## Geometry
//! ```text
//! ┌──────────── page width ────────────┐
//! │            ┌ margin ┐              │
//! │       PALUTO SEAFOOD HOUSE         │  ← header: centered by measured
//! │         123 Coastal Road           │     text width
//! │  ┌──────────────────────────────┐  │
//! │  │2    RICE GARLIC        150.00│  │  ← body: the fixed-width block is
//! │  │750  FISH MAYA-MAYA     337.50│  │     centered as a whole, so every
//! │  └──────────────────────────────┘  │     body line shares one x offset
//! │                                    │
//! │  height = lines × line height      │
//! │           + 2 × margin             │
//! └────────────────────────────────────┘
//! ```
//!
//! Body lines are centered even though the formatter justified them into
//! fixed columns; both behaviors are kept as-is from the running system.
//!
//! Every line is wrapped at the configured column count before measuring, so
//! printed width can never exceed the column budget regardless of what the
//! formatter produced.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::receipt::{wrap_words, LineKind, ReceiptLine, RECEIPT_WIDTH};

// =============================================================================
// Configuration
// =============================================================================

/// Render geometry. Defaults fit a 58 mm thermal roll at a ~10pt monospace
/// face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    /// Hard wrap column count; mirrors the formatter width.
    pub columns: usize,
    /// Width of one monospace character in points.
    pub char_width_pt: f64,
    /// Vertical advance per line in points.
    pub line_height_pt: f64,
    /// Margin on all four sides in points.
    pub margin_pt: f64,
    /// Maximum content height per page; `None` means one page sized to the
    /// whole receipt (continuous roll paper).
    pub max_page_height_pt: Option<f64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            columns: RECEIPT_WIDTH,
            char_width_pt: 5.0,
            line_height_pt: 11.0,
            margin_pt: 8.0,
            max_page_height_pt: None,
        }
    }
}

impl RenderConfig {
    /// Printable page width: margins plus the full column budget.
    pub fn page_width_pt(&self) -> f64 {
        self.margin_pt * 2.0 + self.columns as f64 * self.char_width_pt
    }
}

// =============================================================================
// Output Model
// =============================================================================

/// A line positioned on a page, in points from the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PositionedLine {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

/// One page sized to the content it carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub width_pt: f64,
    pub height_pt: f64,
    pub lines: Vec<PositionedLine>,
}

/// The printable document handed to a printing sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RenderedDocument {
    pub pages: Vec<Page>,
}

impl RenderedDocument {
    /// Total line count across pages.
    pub fn line_count(&self) -> usize {
        self.pages.iter().map(|page| page.lines.len()).sum()
    }

    /// Plain-text form for the file-save fallback sink.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        for page in &self.pages {
            for line in &page.lines {
                out.push_str(&line.text);
                out.push('\n');
            }
        }
        out
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Renders formatted lines into a paginated document.
pub fn render_receipt(lines: &[ReceiptLine], config: &RenderConfig) -> RenderedDocument {
    // Wrap first so measurement sees final physical lines
    let physical: Vec<(String, LineKind)> = lines
        .iter()
        .flat_map(|line| wrap_line(line, config.columns))
        .collect();

    let per_page = config
        .max_page_height_pt
        .map(|max| {
            let usable = (max - config.margin_pt * 2.0).max(config.line_height_pt);
            ((usable / config.line_height_pt).floor() as usize).max(1)
        })
        .unwrap_or(usize::MAX);

    let page_width = config.page_width_pt();
    let body_block_x = config.margin_pt;

    let mut pages = Vec::new();
    let mut chunk: Vec<(String, LineKind)> = Vec::new();
    for entry in physical {
        chunk.push(entry);
        if chunk.len() == per_page {
            pages.push(build_page(&chunk, page_width, body_block_x, config));
            chunk.clear();
        }
    }
    if !chunk.is_empty() || pages.is_empty() {
        pages.push(build_page(&chunk, page_width, body_block_x, config));
    }

    RenderedDocument { pages }
}

fn build_page(
    lines: &[(String, LineKind)],
    page_width: f64,
    body_block_x: f64,
    config: &RenderConfig,
) -> Page {
    let height = config.margin_pt * 2.0 + lines.len() as f64 * config.line_height_pt;
    let positioned = lines
        .iter()
        .enumerate()
        .map(|(row, (text, kind))| {
            let y = config.margin_pt + row as f64 * config.line_height_pt;
            let x = match kind {
                // Headers center on their measured width
                LineKind::Header => {
                    let text_width = text.trim().chars().count() as f64 * config.char_width_pt;
                    ((page_width - text_width) / 2.0).max(0.0)
                }
                // The body block is centered as a whole: full column budget
                LineKind::Body => body_block_x,
            };
            PositionedLine {
                x,
                y,
                text: match kind {
                    LineKind::Header => text.trim().to_string(),
                    LineKind::Body => text.clone(),
                },
            }
        })
        .collect();

    Page {
        width_pt: page_width,
        height_pt: height,
        lines: positioned,
    }
}

/// Hard-wraps one logical line at the column budget, preserving its kind.
/// The budget counts characters, not bytes.
fn wrap_line(line: &ReceiptLine, columns: usize) -> Vec<(String, LineKind)> {
    if line.text.chars().count() <= columns {
        return vec![(line.text.clone(), line.kind)];
    }
    match line.kind {
        // Headers re-wrap on word boundaries
        LineKind::Header => wrap_words(&line.text, columns)
            .into_iter()
            .map(|chunk| (chunk, line.kind))
            .collect(),
        // Body lines are already column-formatted; split hard to keep columns
        LineKind::Body => line
            .text
            .chars()
            .collect::<Vec<_>>()
            .chunks(columns)
            .map(|chunk| (chunk.iter().collect(), line.kind))
            .collect(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
