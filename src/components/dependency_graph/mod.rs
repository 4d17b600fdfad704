mod component;
pub mod layout;
mod render;
mod state;
pub mod style;
pub mod types;

pub use component::DependencyGraphCanvas;
pub use layout::{SourceGraph, filter_by_layer};
pub use types::{GraphNode, GraphResponse, Layer, NodeId};
