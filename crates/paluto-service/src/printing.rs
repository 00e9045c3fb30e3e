//! # Print Dispatch
//!
//! The printing seam: settlement hands a rendered document to a sink and
//! carries on whether or not the sink succeeds.
//!
//! ## Dispatch Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  complete_payment()                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  format_receipt() ──► render_receipt() ──► PrintSink::print()           │
//! │                                                 │                       │
//! │                      ┌──────────────────────────┴──────────┐            │
//! │                      ▼                                     ▼            │
//! │                  Ok(artifact)                      Err(reason)          │
//! │                  settlement done                   settlement STILL     │
//! │                                                    done; warn + keep    │
//! │                                                    file artifact        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed print never rolls back a payment: the money is already in the
//! drawer. The document is saved to disk so the receipt can be reprinted.

use std::path::PathBuf;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use paluto_core::render::RenderedDocument;

/// Print dispatch failure.
#[derive(Debug, Error)]
pub enum PrintError {
    #[error("Printer unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to save receipt: {0}")]
    SaveFailed(#[from] std::io::Error),
}

/// Where a dispatched receipt ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintArtifact {
    /// Sent to a physical printer.
    Printed,

    /// Written to disk (fallback sink, or printer unavailable).
    SavedTo(PathBuf),
}

/// A destination for rendered receipts.
///
/// Implementations decide what "printing" means: a thermal printer driver,
/// a file on disk, a test capture buffer.
pub trait PrintSink: Send + Sync {
    fn print(&self, transaction_id: &str, document: &RenderedDocument)
        -> Result<PrintArtifact, PrintError>;
}

/// Sink that saves each receipt as a plain-text file.
///
/// This is both the development default and the fallback artifact writer:
/// `{dir}/receipt-{txn}-{timestamp}.txt`.
#[derive(Debug, Clone)]
pub struct FilePrintSink {
    dir: PathBuf,
}

impl FilePrintSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FilePrintSink { dir: dir.into() }
    }
}

impl PrintSink for FilePrintSink {
    fn print(
        &self,
        transaction_id: &str,
        document: &RenderedDocument,
    ) -> Result<PrintArtifact, PrintError> {
        std::fs::create_dir_all(&self.dir)?;

        let filename = format!(
            "receipt-{}-{}.txt",
            transaction_id,
            Utc::now().format("%Y%m%d%H%M%S")
        );
        let path = self.dir.join(filename);

        debug!(path = %path.display(), "Saving receipt to disk");
        std::fs::write(&path, document.to_plain_text())?;

        info!(transaction_id = %transaction_id, path = %path.display(), "Receipt saved");
        Ok(PrintArtifact::SavedTo(path))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
