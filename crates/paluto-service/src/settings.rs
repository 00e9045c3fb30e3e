//! # Service Settings
//!
//! Store identity and printing configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Explicit `Settings` passed to the service
//! 2. JSON file (`settings.json`)
//! 3. Defaults (this file)
//!
//! Settings are read-only after initialization, so no lock is needed.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use paluto_core::render::RenderConfig;
use paluto_core::validation::{HUT_RANGE, TABLE_RANGE};

/// Service configuration.
///
/// Most fields have sensible defaults for development; a real store
/// configures identity and the receipt fallback directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Store name (printed at the top of receipts, uppercased there).
    pub store_name: String,

    /// Store address lines (printed below the name).
    pub store_address: Vec<String>,

    /// Dining table number range, inclusive.
    pub table_range: (i64, i64),

    /// Kubo hut number range, inclusive.
    pub hut_range: (i64, i64),

    /// Receipt render geometry.
    pub render: RenderConfig,

    /// Directory where receipts are saved when printing fails.
    pub receipt_fallback_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            store_name: "Paluto Seafood House".to_string(),
            store_address: vec![
                "123 Coastal Road".to_string(),
                "Dampa Village, Philippines".to_string(),
            ],
            table_range: TABLE_RANGE,
            hut_range: HUT_RANGE,
            render: RenderConfig::default(),
            receipt_fallback_dir: PathBuf::from("./receipts"),
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file, falling back to defaults for any
    /// field the file omits.
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.table_range, (1, 50));
        assert_eq!(settings.hut_range, (101, 106));
        assert_eq!(settings.render.columns, 38);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"storeName": "Test Grill"}"#).unwrap();
        assert_eq!(settings.store_name, "Test Grill");
        assert_eq!(settings.table_range, (1, 50));
    }
}
