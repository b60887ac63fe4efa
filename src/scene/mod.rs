//! Scene graph: named nodes, parent/child links and cached matrices.

mod graph;
mod node;

pub use graph::SceneGraph;
pub use node::{Node, NodeId};
