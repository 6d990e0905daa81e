pub mod builder;
pub mod color;
pub mod config;
pub mod error;
pub mod export;
pub mod history;
pub mod human;
pub mod label;
pub mod layout;
pub mod model;
pub mod navigation;
pub mod progress;
pub mod scanner;
pub mod search;
pub mod session;
pub mod treemap;

pub use builder::{build, build_tree, parse, RawNode};
pub use color::{ColorMode, Palette, Shade};
pub use config::{TreemapConfig, WeightUnit};
pub use error::{Error, Result};
pub use history::{FileChurn, History};
pub use label::{AverageCharMeasure, LabelFit, TextMeasure};
pub use layout::{layout_frame, Frame, NodeView};
pub use model::*;
pub use navigation::{BreadcrumbEntry, Navigator, Transition};
pub use progress::*;
pub use scanner::*;
pub use session::{Session, Surface};
pub use treemap::{squarify, Rect, TreemapItem};
