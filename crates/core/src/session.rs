//! One loaded dataset plus its navigation state.

use crate::builder::{self, RawNode};
use crate::config::TreemapConfig;
use crate::error::Result;
use crate::human;
use crate::label::TextMeasure;
use crate::layout::{layout_frame, Frame};
use crate::model::{NodeId, Tree};
use crate::navigation::{Navigator, Transition};
use crate::treemap::Rect;

/// A drawing target. The surface measures text for the layout pass and then gets
/// the finished frame to paint.
pub trait Surface: TextMeasure {
    fn draw(&mut self, frame: &Frame);
}

/// Loading a new dataset means building a new `Session`; nothing carries over.
#[derive(Debug, Clone)]
pub struct Session {
    tree: Tree,
    nav: Navigator,
    config: TreemapConfig,
}

impl Session {
    /// Parse and build a dataset. Fails only on malformed input.
    pub fn load(raw: &str, config: TreemapConfig) -> Result<Self> {
        Ok(Self::from_raw(builder::parse(raw)?, config))
    }

    pub fn from_raw(raw: RawNode, config: TreemapConfig) -> Self {
        let tree = builder::build_tree(raw);
        let nav = Navigator::new(&tree);
        Self { tree, nav, config }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    pub fn config(&self) -> &TreemapConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut TreemapConfig {
        &mut self.config
    }

    pub fn active(&self) -> NodeId {
        self.nav.active()
    }

    pub fn expand(&mut self, id: NodeId) -> Transition {
        self.nav.expand(&self.tree, id)
    }

    pub fn collapse(&mut self) -> Transition {
        self.nav.collapse()
    }

    pub fn trail(&self) -> String {
        self.nav.trail_label(&self.tree, self.config.weight_unit)
    }

    pub fn tooltip(&self, id: NodeId) -> Option<Vec<String>> {
        self.tree
            .get(id)
            .map(|n| human::tooltip_lines(n, self.config.weight_unit))
    }

    /// Lay out the active subtree into `viewport`.
    pub fn frame(&self, viewport: Rect, measure: &dyn TextMeasure) -> Frame {
        layout_frame(
            &self.tree,
            self.nav.active(),
            self.trail(),
            viewport,
            measure,
            &self.config,
        )
    }

    /// Lay out with the surface's text metrics and hand it the result.
    pub fn render_into<S: Surface>(&self, surface: &mut S, viewport: Rect) -> Frame {
        let frame = self.frame(viewport, &*surface);
        surface.draw(&frame);
        frame
    }
}
