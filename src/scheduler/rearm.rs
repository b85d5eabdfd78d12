//! Re-arming of downstream nodes after a batch ran.
//!
//! This is the only step that mutates existing nodes in place, and the only
//! way a node runs more than once: loops are expressed as edges back to an
//! already completed node, which is reset to `pending` when the edge fires.

use tracing::trace;

use crate::model::{Edge, Node, NodeId, NodeState};

/// Resets the target of every active outgoing edge of the executed nodes to
/// `pending`. A target executed in the same batch is reset in `executed`, so
/// merging the batch back cannot undo it; any other target is reset in
/// `nodes`. Returns the ids whose state actually changed.
pub fn rearm_dependents(
    executed: &mut [Node],
    nodes: &mut [Node],
    edges: &[Edge],
) -> Vec<NodeId> {
    let mut targets: Vec<NodeId> = Vec::new();
    for source in executed.iter() {
        for edge in edges.iter().filter(|e| e.from == source.id && e.is_active(source)) {
            if !targets.contains(&edge.to) {
                targets.push(edge.to.clone());
            }
        }
    }

    let mut rearmed = Vec::new();
    for target in targets {
        let node = match executed.iter_mut().find(|n| n.id == target) {
            Some(node) => Some(node),
            None => nodes.iter_mut().find(|n| n.id == target),
        };
        let Some(node) = node else {
            continue;
        };
        if node.state != NodeState::Pending {
            trace!("rearm::reset({}, {})", node.id, node.state.as_ref());
            node.state = NodeState::Pending;
            rearmed.push(target);
        }
    }
    rearmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconditional_target_is_reset() {
        let mut executed = vec![Node::new("a", "t").succeed()];
        let mut nodes = vec![Node::new("a", "t").with_state(NodeState::Running), Node::new("b", "t").succeed()];
        let edges = vec![Edge::new("a", "b")];

        let rearmed = rearm_dependents(&mut executed, &mut nodes, &edges);
        assert_eq!(rearmed, vec!["b".to_string()]);
        assert_eq!(nodes[1].state, NodeState::Pending);
    }

    #[test]
    fn test_conditional_target_only_when_matched() {
        let edges = vec![Edge::new("a", "b").when("hasNext", true)];
        let mut nodes = vec![Node::new("a", "t"), Node::new("b", "t").succeed()];

        let mut done = vec![Node::new("a", "t").with("hasNext", false).succeed()];
        assert!(rearm_dependents(&mut done, &mut nodes, &edges).is_empty());
        assert_eq!(nodes[1].state, NodeState::Success);

        let mut more = vec![Node::new("a", "t").with("hasNext", true).succeed()];
        assert_eq!(rearm_dependents(&mut more, &mut nodes, &edges), vec!["b".to_string()]);
        assert_eq!(nodes[1].state, NodeState::Pending);
    }

    #[test]
    fn test_target_in_batch_is_reset_in_batch() {
        let mut executed = vec![Node::new("a", "t").succeed(), Node::new("b", "t").succeed()];
        let mut nodes = vec![Node::new("a", "t"), Node::new("b", "t")];
        let edges = vec![Edge::new("a", "b")];

        rearm_dependents(&mut executed, &mut nodes, &edges);
        assert_eq!(executed[1].state, NodeState::Pending);
        assert_eq!(executed[0].state, NodeState::Success);
    }

    #[test]
    fn test_failed_source_still_fires_unconditional_edges() {
        let mut executed = vec![Node::new("a", "t").fail("boom")];
        let mut nodes = vec![Node::new("a", "t"), Node::new("b", "t").fail("old")];
        let edges = vec![Edge::new("a", "b"), Edge::new("a", "c").when("ok", true)];

        assert_eq!(rearm_dependents(&mut executed, &mut nodes, &edges), vec!["b".to_string()]);
    }
}
