use std::collections::HashMap;

use crate::model::{Node, NodeId};

pub struct StateMerger;

impl StateMerger {
    /// Replaces every original node that was executed in this tick by its
    /// executed version. Node order and untouched nodes are preserved;
    /// executed nodes unknown to the original list are dropped.
    pub fn merge_node_states(
        original: Vec<Node>,
        executed: Vec<Node>,
    ) -> Vec<Node> {
        let mut executed: HashMap<NodeId, Node> = executed.into_iter().map(|n| (n.id.clone(), n)).collect();
        original.into_iter().map(|node| executed.remove(&node.id).unwrap_or(node)).collect()
    }
}
