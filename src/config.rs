//! Application configuration.
//!
//! The configuration is loaded from a JSON file at
//! `$XDG_CONFIG_HOME/gridsnap/config.json`.  Every section is optional and
//! falls back to its compiled-in default, so a minimal `{}` file is valid.
//!
//! # Example
//!
//! ```json
//! {
//!   "grid": { "rows": 4, "columns": 8 },
//!   "hotkey": { "key": "space", "modifiers": ["control", "alt"] },
//!   "overlay": { "settle_delay_ms": 50 }
//! }
//! ```
//!
//! The core never holds on to a [`Config`].  At every trigger the daemon
//! takes a [`ConfigSnapshot`], so a reload between operations takes effect
//! on the next one and never mid-drag.

use crate::hotkey::HotkeyBinding;
use crate::selection::GridDimensions;
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Selection grid size.
    #[serde(default)]
    pub grid: GridConfig,

    /// Key combination that toggles the overlay.
    #[serde(default)]
    pub hotkey: HotkeyBinding,

    /// Overlay timing.
    #[serde(default)]
    pub overlay: OverlayConfig,
}

/// Selection grid size.  Both values are clamped into `[2, 20]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub rows: usize,
    pub columns: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: 6,
            columns: 6,
        }
    }
}

/// Overlay timing.  Durations are in **milliseconds**.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Pause between hiding the overlay and resizing the target window, so
    /// the overlay is fully gone before the target gets focus and geometry
    /// changes.
    pub settle_delay_ms: u64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 50,
        }
    }
}

/// Read-only per-operation view of the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigSnapshot {
    pub dimensions: GridDimensions,
    pub settle_delay: Duration,
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Config::default().snapshot()
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    ///
    /// The result is already [`sanitized`](Self::sanitized).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config.sanitized())
    }

    /// Pull every value back into its accepted range.
    ///
    /// Grid dimensions are clamped into `[2, 20]`; a hotkey without a key or
    /// without modifiers is replaced by the default binding.
    pub fn sanitized(mut self) -> Self {
        let dims = GridDimensions::clamped(self.grid.rows, self.grid.columns);
        if (dims.rows(), dims.columns()) != (self.grid.rows, self.grid.columns) {
            warn!(
                "grid {}×{} out of range, using {}",
                self.grid.rows, self.grid.columns, dims
            );
        }
        self.grid = GridConfig {
            rows: dims.rows(),
            columns: dims.columns(),
        };
        if !self.hotkey.is_valid() {
            warn!(
                "hotkey {:?} needs a key and at least one modifier, using default",
                self.hotkey
            );
            self.hotkey = HotkeyBinding::default();
        }
        self
    }

    /// The values the overlay needs for one operation.
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            dimensions: GridDimensions::clamped(self.grid.rows, self.grid.columns),
            settle_delay: Duration::from_millis(self.overlay.settle_delay_ms),
        }
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
