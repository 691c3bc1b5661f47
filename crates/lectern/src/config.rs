//! Reader configuration.
//!
//! Configuration is plain TOML. Every key is optional and falls back to its
//! default:
//!
//! ```toml
//! [selector]
//! ignore = ["H1", "H2", "H3", "H4", "H5", "H6", "BUTTON", "LABEL", "SPAN", "IMG", "PRE", "SCRIPT"]
//!
//! [hover]
//! debounce_ms = 10
//!
//! [overlay]
//! offset_x = 60.0
//! marker = "data-hover-player"
//!
//! [highlight]
//! class_name = "lectern-hover-highlight"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::hover::{DEFAULT_DEBOUNCE, HoverConfig};
use crate::overlay::DEFAULT_OFFSET_X;
use crate::selector::{DEFAULT_IGNORE, IgnoreSet};

/// Attribute that marks the overlay element by default.
pub const DEFAULT_OVERLAY_MARKER: &str = "data-hover-player";

/// Class name hosts put on the highlighted block by default.
pub const DEFAULT_HIGHLIGHT_CLASS: &str = "lectern-hover-highlight";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub selector: SelectorSettings,
    pub hover: HoverSettings,
    pub overlay: OverlaySettings,
    pub highlight: HighlightSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorSettings {
    /// Categories that are never read. Case-insensitive.
    pub ignore: Vec<String>,
}

impl Default for SelectorSettings {
    fn default() -> Self {
        Self {
            ignore: DEFAULT_IGNORE.iter().map(|c| (*c).to_owned()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverSettings {
    pub debounce_ms: u64,
}

impl Default for HoverSettings {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// Horizontal distance from the block's left edge to the control.
    pub offset_x: f32,
    /// Attribute identifying the overlay element.
    pub marker: String,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            offset_x: DEFAULT_OFFSET_X,
            marker: DEFAULT_OVERLAY_MARKER.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightSettings {
    /// Applied by the host; see [`ReaderSession::highlight_class`](crate::ReaderSession::highlight_class).
    pub class_name: String,
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self {
            class_name: DEFAULT_HIGHLIGHT_CLASS.to_owned(),
        }
    }
}

impl ReaderConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|err| ConfigError::io(path, err))?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(target: "lectern::session", path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let offset = self.overlay.offset_x;
        if !offset.is_finite() || offset < 0.0 {
            return Err(ConfigError::invalid_value(
                "overlay.offset_x",
                format!("must be a finite, non-negative number, got {offset}"),
            ));
        }
        if self.overlay.marker.trim().is_empty() {
            return Err(ConfigError::invalid_value("overlay.marker", "must not be empty"));
        }
        if self.highlight.class_name.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "highlight.class_name",
                "must not be empty",
            ));
        }
        if let Some(empty) = self.selector.ignore.iter().position(|c| c.trim().is_empty()) {
            return Err(ConfigError::invalid_value(
                format!("selector.ignore[{empty}]"),
                "must not be empty",
            ));
        }
        Ok(())
    }

    /// The ignore-set described by `[selector]`.
    pub fn ignore_set(&self) -> IgnoreSet {
        self.selector.ignore.iter().map(String::as_str).collect()
    }

    /// Tracker settings described by `[hover]`.
    pub fn hover_config(&self) -> HoverConfig {
        HoverConfig {
            debounce: Duration::from_millis(self.hover.debounce_ms),
        }
    }
}
