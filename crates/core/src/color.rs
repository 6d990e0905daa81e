//! Heat-to-color mapping.
//!
//! A node's metric is normalized against a range, turned into an HSL lightness on a
//! fixed hue, and paired with black or white text depending on how dark the fill is.

use serde::{Deserialize, Serialize};

use crate::model::{HeatRange, Tree, TreeNode};

pub const DEFAULT_HUE: f64 = 240.0;
pub const DEFAULT_SATURATION: f64 = 100.0;
/// Lightness (percent) of the coldest fill.
pub const DEFAULT_MAX_LIGHTNESS: f64 = 95.0;
/// Fills lighter than this get black text, darker ones white.
pub const DEFAULT_CONTRAST_THRESHOLD: f64 = 50.0;
pub const DEFAULT_TOOLBAR_LIGHTNESS: f64 = 92.0;

/// Which metric drives a node's fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorMode {
    /// The node's own heat against the dataset-wide heat range.
    #[default]
    Heat,
    /// The node's weight relative to the dataset root's weight.
    RelativeSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub hue: f64,
    pub saturation: f64,
    pub max_lightness: f64,
    pub contrast_threshold: f64,
    pub toolbar_lightness: f64,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            hue: DEFAULT_HUE,
            saturation: DEFAULT_SATURATION,
            max_lightness: DEFAULT_MAX_LIGHTNESS,
            contrast_threshold: DEFAULT_CONTRAST_THRESHOLD,
            toolbar_lightness: DEFAULT_TOOLBAR_LIGHTNESS,
        }
    }
}

impl Palette {
    fn hsl(&self, lightness: f64) -> Hsl {
        Hsl {
            h: self.hue,
            s: self.saturation,
            l: lightness,
        }
    }

    /// Fill used when there is nothing to compare against.
    pub fn neutral(&self) -> Shade {
        self.shade(self.max_lightness)
    }

    pub fn toolbar(&self) -> Shade {
        self.shade(self.toolbar_lightness)
    }

    fn shade(&self, lightness: f64) -> Shade {
        let foreground = if lightness > self.contrast_threshold {
            Rgb::BLACK
        } else {
            Rgb::WHITE
        };
        Shade {
            fill: self.hsl(lightness),
            foreground,
        }
    }
}

/// Hue in degrees, saturation and lightness in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Hsl {
    pub fn to_rgb(self) -> Rgb {
        let s = (self.s / 100.0).clamp(0.0, 1.0);
        let l = (self.l / 100.0).clamp(0.0, 1.0);
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let h = self.h.rem_euclid(360.0) / 60.0;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Rgb(channel(r), channel(g), channel(b))
    }

    pub fn css(&self) -> String {
        format!("hsl({}, {}%, {}%)", self.h, self.s, self.l)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    pub fn css(&self) -> String {
        format!("rgb({},{},{})", self.0, self.1, self.2)
    }
}

/// Fill plus a foreground that stays readable on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shade {
    pub fill: Hsl,
    pub foreground: Rgb,
}

/// Position of `metric` inside `range`, in `[0, 1]`. A range without spread maps
/// everything to 0.
pub fn normalized(metric: f64, range: HeatRange) -> f64 {
    if range.is_degenerate() {
        return 0.0;
    }
    ((metric - range.min) / range.spread()).clamp(0.0, 1.0)
}

pub fn color_for(metric: f64, range: HeatRange, palette: &Palette) -> Shade {
    let t = normalized(metric, range);
    palette.shade((1.0 - t) * palette.max_lightness)
}

/// Color a node according to `mode`. Nodes without heat get the neutral fill.
pub fn shade_node(tree: &Tree, node: &TreeNode, mode: ColorMode, palette: &Palette) -> Shade {
    match mode {
        ColorMode::Heat => match node.heat {
            Some(heat) => color_for(heat, tree.heat, palette),
            None => palette.neutral(),
        },
        ColorMode::RelativeSize => {
            let root_weight = tree.root_node().map(|r| r.weight).unwrap_or(0.0);
            color_for(node.weight, HeatRange::new(0.0, root_weight), palette)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::model::NodeId;

    #[test]
    fn hotter_is_darker() {
        let palette = Palette::default();
        let range = HeatRange::new(0.0, 100.0);
        let cold = color_for(0.0, range, &palette);
        let mid = color_for(50.0, range, &palette);
        let hot = color_for(100.0, range, &palette);
        assert!(cold.fill.l > mid.fill.l);
        assert!(mid.fill.l > hot.fill.l);
        assert_eq!(cold.fill.l, 95.0);
        assert_eq!(mid.fill.l, 47.5);
        assert_eq!(hot.fill.l, 0.0);
        assert_eq!(cold.foreground, Rgb::BLACK);
        assert_eq!(mid.foreground, Rgb::WHITE);
    }

    #[test]
    fn zero_spread_is_safe() {
        let palette = Palette::default();
        for v in [5.0, -3.0, 1e9] {
            let shade = color_for(v, HeatRange::new(5.0, 5.0), &palette);
            assert_eq!(shade.fill.l, palette.max_lightness);
            assert!(shade.fill.l.is_finite());
        }
        let shade = color_for(0.0, HeatRange::default(), &palette);
        assert_eq!(shade, palette.neutral());
    }

    #[test]
    fn hsl_conversion() {
        assert_eq!(Hsl { h: 240.0, s: 100.0, l: 50.0 }.to_rgb(), Rgb(0, 0, 255));
        assert_eq!(Hsl { h: 240.0, s: 100.0, l: 100.0 }.to_rgb(), Rgb::WHITE);
        assert_eq!(Hsl { h: 0.0, s: 100.0, l: 50.0 }.to_rgb(), Rgb(255, 0, 0));
        assert_eq!(Hsl { h: 240.0, s: 100.0, l: 0.0 }.to_rgb(), Rgb::BLACK);
        assert_eq!(Hsl { h: 240.0, s: 100.0, l: 47.5 }.css(), "hsl(240, 100%, 47.5%)");
    }

    #[test]
    fn both_modes_share_the_pipeline() {
        let tree = build(
            r#"{"name":"r","weight":10,"children":[{"name":"a","weight":5,"heat":8},{"name":"b","weight":5}]}"#,
        )
        .unwrap();
        let palette = Palette::default();
        let a = tree.get(NodeId(1)).unwrap();
        let b = tree.get(NodeId(2)).unwrap();

        assert_eq!(shade_node(&tree, a, ColorMode::Heat, &palette).fill.l, 0.0);
        assert_eq!(shade_node(&tree, b, ColorMode::Heat, &palette), palette.neutral());

        let rel = shade_node(&tree, a, ColorMode::RelativeSize, &palette);
        assert_eq!(rel.fill.l, 47.5);
    }
}
