//! Radial bubble chart layout.
//!
//! A weighted hierarchy is split into ring sectors, one per visible top-level
//! segment. Each segment's subtree is circle-packed, projected into its
//! sector and shrunk until every bubble sits inside the sector bounds.

pub mod error;
pub mod hierarchy;
pub mod layout;
pub mod output;
mod wasm;

pub use error::LayoutError;
pub use hierarchy::{VisibilityState, WeightPolicy, WeightedNode};
pub use layout::{layout_chart, ChartLayout, ChartSize, LayoutConfig, SectorLayout};
pub use output::ChartOutput;
