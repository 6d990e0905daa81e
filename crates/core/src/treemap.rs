//! Squarified treemap layout (Bruls, Huizing, van Wijk).
//!
//! Siblings are packed into strips along the shorter side of the remaining
//! rectangle. A strip keeps growing while the worst aspect ratio inside it does not
//! get worse; then it is frozen, cut off the remaining rectangle, and a new strip
//! starts with the child that was refused.

use serde::{Deserialize, Serialize};
use std::iter;

use crate::model::NodeId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn area(&self) -> f64 {
        self.w.max(0.0) * self.h.max(0.0)
    }

    /// Zero or negative span on either axis, or non-finite geometry. Degenerate
    /// rectangles are neither drawn nor recursed into.
    pub fn is_degenerate(&self) -> bool {
        !(self.w > 0.0 && self.h > 0.0)
            || !(self.x.is_finite() && self.y.is_finite() && self.w.is_finite() && self.h.is_finite())
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    pub fn intersection_area(&self, other: &Rect) -> f64 {
        let w = self.right().min(other.right()) - self.x.max(other.x);
        let h = self.bottom().min(other.bottom()) - self.y.max(other.y);
        w.max(0.0) * h.max(0.0)
    }
}

/// One sibling's placement. `row` numbers the strips in the order they were cut.
#[derive(Clone, Debug, PartialEq)]
pub struct TreemapItem {
    pub id: NodeId,
    pub weight: f64,
    pub rect: Rect,
    pub row: usize,
}

/// Length and direction of the side the next strip runs along.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShortSide {
    pub value: f64,
    /// The strip is a column (stacked along y) cut off the left of the remaining area.
    pub along_height: bool,
}

impl ShortSide {
    pub fn of(area: Rect) -> Self {
        if area.h <= area.w {
            Self {
                value: area.h.max(0.0),
                along_height: true,
            }
        } else {
            Self {
                value: area.w.max(0.0),
                along_height: false,
            }
        }
    }
}

/// `max(side² · max / sum², sum² / (side² · min))` over a candidate strip.
pub fn worst_ratio(weights: impl IntoIterator<Item = f64>, side: f64) -> f64 {
    let mut sum = 0.0;
    let mut max = f64::NEG_INFINITY;
    let mut min = f64::INFINITY;
    for w in weights {
        sum += w;
        max = max.max(w);
        min = min.min(w);
    }
    if !(sum > 0.0 && side > 0.0 && min > 0.0) {
        return f64::INFINITY;
    }
    let side_sq = side * side;
    let sum_sq = sum * sum;
    (side_sq * max / sum_sq).max(sum_sq / (side_sq * min))
}

/// Lay out `weights` (already in area units, size-descending) inside `area`.
///
/// Positive weights come back in input order, followed by every non-positive (or
/// non-finite) weight in its input order. Those never enter a strip; they get a
/// zero-sized rectangle at the corner of whatever space is left.
pub fn squarify(weights: &[(NodeId, f64)], area: Rect) -> Vec<TreemapItem> {
    let mut out = Vec::with_capacity(weights.len());
    let (placed, empty): (Vec<_>, Vec<_>) = weights
        .iter()
        .copied()
        .partition(|&(_, w)| w > 0.0 && w.is_finite());

    let mut remaining = area;
    let mut rows = 0usize;
    let mut side = ShortSide::of(remaining);
    let mut start = 0usize;
    let mut next = 0usize;

    while next < placed.len() {
        let row = &placed[start..next];

        if placed.len() - next == 1 {
            // Nothing left to compare against: close the open strip, then give the
            // last child its own strip in the same direction.
            if !row.is_empty() {
                remaining = layout_row(row, side, remaining, rows, &mut out);
                rows += 1;
            }
            remaining = layout_row(&placed[next..], side, remaining, rows, &mut out);
            rows += 1;
            break;
        }

        let candidate = placed[next].1;
        let current = worst_ratio(row.iter().map(|&(_, w)| w), side.value);
        let grown = worst_ratio(row.iter().map(|&(_, w)| w).chain(iter::once(candidate)), side.value);
        if row.is_empty() || current >= grown {
            next += 1;
            continue;
        }

        tracing::trace!(row = rows, len = row.len(), current, grown, "freezing strip");
        remaining = layout_row(row, side, remaining, rows, &mut out);
        rows += 1;
        start = next;
        side = ShortSide::of(remaining);
    }

    for (id, weight) in empty {
        out.push(TreemapItem {
            id,
            weight,
            rect: Rect::new(remaining.x, remaining.y, 0.0, 0.0),
            row: rows,
        });
    }
    out
}

/// Place one frozen strip and return what is left of `remaining`.
fn layout_row(
    row: &[(NodeId, f64)],
    side: ShortSide,
    remaining: Rect,
    row_index: usize,
    out: &mut Vec<TreemapItem>,
) -> Rect {
    let sum: f64 = row.iter().map(|&(_, w)| w).sum();
    let thickness = if side.value > 0.0 { sum / side.value } else { 0.0 };
    let thickness = if thickness.is_finite() { thickness } else { 0.0 };

    let mut offset = 0.0;
    for &(id, weight) in row {
        let length = if thickness > 0.0 { weight / thickness } else { 0.0 };
        let rect = if side.along_height {
            Rect::new(remaining.x, remaining.y + offset, thickness, length)
        } else {
            Rect::new(remaining.x + offset, remaining.y, length, thickness)
        };
        out.push(TreemapItem {
            id,
            weight,
            rect,
            row: row_index,
        });
        offset += length;
    }

    if side.along_height {
        Rect::new(
            remaining.x + thickness,
            remaining.y,
            (remaining.w - thickness).max(0.0),
            remaining.h,
        )
    } else {
        Rect::new(
            remaining.x,
            remaining.y + thickness,
            remaining.w,
            (remaining.h - thickness).max(0.0),
        )
    }
}
