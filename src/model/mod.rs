mod edge;
mod graph;
mod node;

pub use edge::{Edge, EdgeCondition, strict_eq};
pub use graph::{Graph, GraphState};
pub(crate) use node::SYSTEM_FIELDS;
pub use node::{ERROR_PROPERTY, Node, NodeId, NodeState};
