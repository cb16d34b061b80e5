mod builder;
mod node;
pub mod sample;
mod visibility;

pub use builder::{build, ROOT_ID};
pub use node::{WeightPolicy, WeightedNode};
pub use visibility::VisibilityState;
