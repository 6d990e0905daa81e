//! Tuned layout and presentation constants.
//!
//! The numbers here have no derivation beyond "they look right"; they are kept as
//! named values so embedders can adjust them without touching the algorithms.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::color::{ColorMode, Palette};
use crate::error::{Error, Result};

/// Gap between a parent rectangle's edge and its children, in pixels.
pub const DEFAULT_MARGIN: f64 = 5.0;
pub const DEFAULT_FONT_SIZE: f64 = 14.0;
pub const DEFAULT_FONT_FAMILY: &str = "Roboto";
/// Band reserved above the children when a label is drawn at full size.
pub const DEFAULT_LABEL_BAND: f64 = DEFAULT_FONT_SIZE + 8.0;
/// Extra space added below a shrunk label.
pub const DEFAULT_LABEL_GAP: f64 = 5.0;
/// Height of the breadcrumb/collapse band at the top of the viewport.
pub const DEFAULT_TOOLBAR_HEIGHT: f64 = DEFAULT_FONT_SIZE + 20.0;
/// Labels scaled below this factor are kept in the model but drawn fully transparent.
pub const DEFAULT_MIN_LABEL_SCALE: f64 = 0.3;

/// How weights are shown to people (tooltips, breadcrumb band, exports).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeightUnit {
    #[default]
    Count,
    Bytes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreemapConfig {
    pub margin: f64,
    pub font_size: f64,
    pub font_family: String,
    pub label_band: f64,
    pub label_gap: f64,
    pub toolbar_height: f64,
    pub min_label_scale: f64,
    pub color_mode: ColorMode,
    pub palette: Palette,
    pub weight_unit: WeightUnit,
}

impl Default for TreemapConfig {
    fn default() -> Self {
        Self {
            margin: DEFAULT_MARGIN,
            font_size: DEFAULT_FONT_SIZE,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            label_band: DEFAULT_LABEL_BAND,
            label_gap: DEFAULT_LABEL_GAP,
            toolbar_height: DEFAULT_TOOLBAR_HEIGHT,
            min_label_scale: DEFAULT_MIN_LABEL_SCALE,
            color_mode: ColorMode::default(),
            palette: Palette::default(),
            weight_unit: WeightUnit::default(),
        }
    }
}

impl TreemapConfig {
    /// Parse a (possibly partial) JSON config; missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(Error::Config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = TreemapConfig::from_json(r#"{"margin": 2, "color_mode": "relative-size"}"#).unwrap();
        assert_eq!(cfg.margin, 2.0);
        assert_eq!(cfg.color_mode, ColorMode::RelativeSize);
        assert_eq!(cfg.font_size, DEFAULT_FONT_SIZE);
        assert_eq!(cfg.palette, Palette::default());
    }

    #[test]
    fn bad_json_is_a_config_error() {
        let err = TreemapConfig::from_json("{ margin: ").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
