//! Decides how a node's label fits its rectangle.

use serde::{Deserialize, Serialize};

use crate::config::TreemapConfig;
use crate::treemap::Rect;

/// Text measurement service. Must be deterministic for a given font.
pub trait TextMeasure {
    /// Pixel width of `text` rendered at `font_size` in `font_family`.
    fn measure(&self, text: &str, font_size: f64, font_family: &str) -> f64;
}

impl<F> TextMeasure for F
where
    F: Fn(&str, f64, &str) -> f64,
{
    fn measure(&self, text: &str, font_size: f64, font_family: &str) -> f64 {
        self(text, font_size, font_family)
    }
}

/// Font-independent estimate: every character advances by a fixed fraction of the
/// font size. Good enough for headless export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageCharMeasure {
    pub advance: f64,
}

impl Default for AverageCharMeasure {
    fn default() -> Self {
        Self { advance: 0.55 }
    }
}

impl TextMeasure for AverageCharMeasure {
    fn measure(&self, text: &str, font_size: f64, _font_family: &str) -> f64 {
        text.chars().count() as f64 * font_size * self.advance
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelFit {
    /// Above 1 the label is drawn unscaled; 0 means it cannot fit at all.
    pub scale: f64,
    /// Invisible labels stay in the model (hover still works) but are drawn transparent.
    pub visible: bool,
    /// Height the label takes off the top of the rectangle's content area.
    pub reserved_height: f64,
}

impl LabelFit {
    pub fn font_size(&self, config: &TreemapConfig) -> f64 {
        config.font_size * self.scale.min(1.0)
    }

    /// Baseline origin of the label inside `rect`.
    pub fn anchor(&self, rect: &Rect, config: &TreemapConfig) -> (f64, f64) {
        if self.scale > 1.0 {
            (rect.x + config.margin, rect.y + config.font_size)
        } else {
            (rect.x, rect.y + self.scale * config.font_size)
        }
    }
}

pub fn fit(text: &str, rect: &Rect, measure: &dyn TextMeasure, config: &TreemapConfig) -> LabelFit {
    let font_size = config.font_size;
    let text_width = measure.measure(text, font_size, &config.font_family) + config.margin;

    let mut scale = if text_width > 0.0 { rect.w / text_width } else { 0.0 };
    if !scale.is_finite() || scale < 0.0 {
        scale = 0.0;
    }
    let too_tall = if scale > 1.0 {
        font_size > rect.h
    } else {
        scale * font_size > rect.h
    };
    if too_tall {
        scale = 0.0;
    }

    let reserved_height = if scale > 1.0 {
        config.label_band
    } else {
        scale * font_size + config.label_gap
    };

    LabelFit {
        scale,
        visible: scale >= config.min_label_scale,
        reserved_height,
    }
}
