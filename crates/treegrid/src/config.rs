//! Table configuration.
//!
//! All keys are optional and use camelCase:
//!
//! ```
//! use treegrid::TableConfig;
//!
//! let config = TableConfig::from_toml_str(r#"
//!     multiSelect = false
//!     transitionDelayMs = 150
//! "#).unwrap();
//!
//! assert!(!config.multi_select);
//! assert!(config.default_expanded);
//! assert_eq!(config.transition_delay().as_millis(), 150);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TableError};

/// Behavior switches of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableConfig {
    /// Whether more than one row may be selected.
    pub multi_select: bool,
    /// Whether rows carry a check state.
    pub checkable: bool,
    /// Whether more than one row may be checked.
    pub multi_check: bool,
    /// Expanded state of inserted rows that do not specify one.
    pub default_expanded: bool,
    /// Delay of expand/collapse transitions, in milliseconds.
    pub transition_delay_ms: u64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            multi_select: true,
            checkable: false,
            multi_check: true,
            default_expanded: true,
            transition_delay_ms: 300,
        }
    }
}

impl TableConfig {
    /// Parses a configuration from TOML.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| TableError::Config(e.to_string()))
    }

    /// Parses a configuration from JSON.
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| TableError::Config(e.to_string()))
    }

    /// Loads a configuration file, choosing the format by extension.
    ///
    /// Files ending in `.json` are parsed as JSON, anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    /// The transition delay as a [`Duration`].
    pub fn transition_delay(&self) -> Duration {
        Duration::from_millis(self.transition_delay_ms)
    }
}
