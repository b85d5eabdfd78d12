//! Readiness and completion analysis over a node/edge snapshot.
//!
//! Executability is optimistic about conditional edges that have not been
//! resolved yet: a conditionally fed node may start before its branches
//! resolve. Reachability only follows branches that were actually taken.

use std::collections::{HashMap, HashSet};

use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
    visit::{Bfs, EdgeFiltered, EdgeRef},
};
use tracing::warn;

use crate::model::{Edge, GraphState, Node, NodeState};

/// Index graph: node weights are positions in the node slice, edge weights
/// are positions in the edge slice.
struct GraphIndex {
    graph: DiGraph<usize, usize>,
}

impl GraphIndex {
    fn build(
        nodes: &[Node],
        edges: &[Edge],
    ) -> Self {
        let mut graph = DiGraph::with_capacity(nodes.len(), edges.len());
        let mut by_id: HashMap<&str, NodeIndex> = HashMap::new();
        for (pos, node) in nodes.iter().enumerate() {
            by_id.insert(node.id.as_str(), graph.add_node(pos));
        }
        for (pos, edge) in edges.iter().enumerate() {
            match (by_id.get(edge.from.as_str()), by_id.get(edge.to.as_str())) {
                (Some(from), Some(to)) => {
                    graph.add_edge(*from, *to, pos);
                }
                _ => warn!(from = %edge.from, to = %edge.to, "edge refers to an unknown node, ignored"),
            }
        }
        Self {
            graph,
        }
    }

    /// Incoming edges of the node at `idx`, paired with their source node.
    fn incoming<'a>(
        &self,
        idx: NodeIndex,
        nodes: &'a [Node],
        edges: &'a [Edge],
    ) -> Vec<(&'a Edge, &'a Node)> {
        self.graph.edges_directed(idx, Direction::Incoming).map(|e| (&edges[*e.weight()], &nodes[self.graph[e.source()]])).collect()
    }

    fn is_start(
        &self,
        idx: NodeIndex,
    ) -> bool {
        self.graph.neighbors_directed(idx, Direction::Incoming).next().is_none()
    }
}

pub struct DependencyAnalyzer;

impl DependencyAnalyzer {
    /// Pending nodes that may run in this tick.
    pub fn find_executable_nodes<'a>(
        nodes: &'a [Node],
        edges: &[Edge],
    ) -> Vec<&'a Node> {
        let index = GraphIndex::build(nodes, edges);
        index
            .graph
            .node_indices()
            .filter(|idx| {
                let node = &nodes[index.graph[*idx]];
                node.state == NodeState::Pending && Self::is_ready(&index.incoming(*idx, nodes, edges))
            })
            .map(|idx| &nodes[index.graph[idx]])
            .collect()
    }

    fn is_ready(incoming: &[(&Edge, &Node)]) -> bool {
        if incoming.is_empty() {
            return true;
        }

        let (conditional, unconditional): (Vec<_>, Vec<_>) = incoming.iter().partition(|(edge, _)| edge.is_conditional());

        // AND-join
        if !unconditional.iter().all(|(_, source)| source.state == NodeState::Success) {
            return false;
        }
        if conditional.is_empty() {
            return true;
        }

        // no branch has resolved yet
        if conditional.iter().all(|(_, source)| source.state == NodeState::Pending) {
            return true;
        }

        // OR-join
        conditional.iter().any(|(edge, source)| edge.is_active(source))
    }

    /// Nodes reachable from the start nodes through unconditional edges and
    /// conditional edges whose source succeeded with a matching value.
    /// Returned in node list order.
    pub fn find_reachable_nodes<'a>(
        nodes: &'a [Node],
        edges: &[Edge],
    ) -> Vec<&'a Node> {
        let index = GraphIndex::build(nodes, edges);
        let graph = &index.graph;
        let taken = EdgeFiltered::from_fn(graph, |e| edges[*e.weight()].is_active(&nodes[graph[e.source()]]));

        let mut reachable: HashSet<NodeIndex> = HashSet::new();
        for start in graph.node_indices().filter(|idx| index.is_start(*idx)) {
            let mut bfs = Bfs::new(&taken, start);
            while let Some(idx) = bfs.next(&taken) {
                reachable.insert(idx);
            }
        }

        graph.node_indices().filter(|idx| reachable.contains(idx)).map(|idx| &nodes[graph[idx]]).collect()
    }

    /// Every reachable node is `success` or `fail`.
    pub fn are_all_reachable_nodes_completed(
        nodes: &[Node],
        edges: &[Edge],
    ) -> bool {
        Self::find_reachable_nodes(nodes, edges).iter().all(|n| n.state.is_completed())
    }

    /// Overall state after a tick: `fail` as soon as a reachable node failed,
    /// `success` once every reachable node completed, `running` otherwise.
    pub fn graph_state(
        nodes: &[Node],
        edges: &[Edge],
    ) -> GraphState {
        let reachable = Self::find_reachable_nodes(nodes, edges);
        if reachable.iter().any(|n| n.state == NodeState::Fail) {
            GraphState::Fail
        } else if reachable.iter().all(|n| n.state.is_completed()) {
            GraphState::Success
        } else {
            GraphState::Running
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(
        id: &str,
        state: NodeState,
    ) -> Node {
        Node::new(id, "test").with_state(state)
    }

    fn ids(nodes: Vec<&Node>) -> Vec<&str> {
        nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_start_nodes_are_executable() {
        let nodes = vec![node("a", NodeState::Pending), node("b", NodeState::Pending), node("c", NodeState::Success)];
        let edges = vec![Edge::new("a", "b")];
        assert_eq!(ids(DependencyAnalyzer::find_executable_nodes(&nodes, &edges)), vec!["a"]);
    }

    #[test]
    fn test_and_join() {
        let edges = vec![Edge::new("b", "d"), Edge::new("c", "d")];
        let half = vec![node("b", NodeState::Success), node("c", NodeState::Running), node("d", NodeState::Pending)];
        assert!(DependencyAnalyzer::find_executable_nodes(&half, &edges).is_empty());

        let both = vec![node("b", NodeState::Success), node("c", NodeState::Success), node("d", NodeState::Pending)];
        assert_eq!(ids(DependencyAnalyzer::find_executable_nodes(&both, &edges)), vec!["d"]);
    }

    #[test]
    fn test_failed_source_blocks() {
        let nodes = vec![node("a", NodeState::Fail), node("b", NodeState::Pending)];
        let edges = vec![Edge::new("a", "b")];
        assert!(DependencyAnalyzer::find_executable_nodes(&nodes, &edges).is_empty());
    }

    #[test]
    fn test_unresolved_conditional_sources_are_eligible() {
        let nodes = vec![node("a", NodeState::Pending), node("b", NodeState::Pending)];
        let edges = vec![Edge::new("a", "b").when("flag", true)];
        assert_eq!(ids(DependencyAnalyzer::find_executable_nodes(&nodes, &edges)), vec!["a", "b"]);
    }

    #[test]
    fn test_or_join() {
        let edges = vec![Edge::new("x", "t").when("go", true), Edge::new("y", "t").when("go", true)];

        // y is a start node of its own, t waits for a matching branch
        let none = vec![node("x", NodeState::Success).with("go", false), node("y", NodeState::Pending), node("t", NodeState::Pending)];
        assert_eq!(ids(DependencyAnalyzer::find_executable_nodes(&none, &edges)), vec!["y"]);

        let neither = vec![node("x", NodeState::Success).with("go", false), node("y", NodeState::Fail), node("t", NodeState::Pending)];
        assert!(DependencyAnalyzer::find_executable_nodes(&neither, &edges).is_empty());

        let one = vec![node("x", NodeState::Success).with("go", false), node("y", NodeState::Success).with("go", true), node("t", NodeState::Pending)];
        assert_eq!(ids(DependencyAnalyzer::find_executable_nodes(&one, &edges)), vec!["t"]);
    }

    #[test]
    fn test_false_is_a_valid_match_value() {
        let edges = vec![Edge::new("a", "b").when("flag", false)];
        let nodes = vec![node("a", NodeState::Success).with("flag", false), node("b", NodeState::Pending)];
        assert_eq!(ids(DependencyAnalyzer::find_executable_nodes(&nodes, &edges)), vec!["b"]);

        let nodes = vec![node("a", NodeState::Success).with("flag", true), node("b", NodeState::Pending)];
        assert!(DependencyAnalyzer::find_executable_nodes(&nodes, &edges).is_empty());
    }

    #[test]
    fn test_conditional_needs_unconditional_first() {
        let edges = vec![Edge::new("s", "t"), Edge::new("c", "t").when("ok", true)];
        let nodes = vec![node("s", NodeState::Pending), node("c", NodeState::Success).with("ok", true), node("t", NodeState::Pending)];
        assert_eq!(ids(DependencyAnalyzer::find_executable_nodes(&nodes, &edges)), vec!["s"]);
    }

    #[test]
    fn test_reachability_prunes_unresolved_branches() {
        let edges = vec![Edge::new("a", "b").when("flag", true), Edge::new("b", "c")];

        let pending = vec![node("a", NodeState::Pending), node("b", NodeState::Pending), node("c", NodeState::Pending)];
        assert_eq!(ids(DependencyAnalyzer::find_reachable_nodes(&pending, &edges)), vec!["a"]);

        let taken = vec![node("a", NodeState::Success).with("flag", true), node("b", NodeState::Pending), node("c", NodeState::Pending)];
        assert_eq!(ids(DependencyAnalyzer::find_reachable_nodes(&taken, &edges)), vec!["a", "b", "c"]);

        let skipped = vec![node("a", NodeState::Success).with("flag", false), node("b", NodeState::Pending), node("c", NodeState::Pending)];
        assert_eq!(ids(DependencyAnalyzer::find_reachable_nodes(&skipped, &edges)), vec!["a"]);
        assert!(DependencyAnalyzer::are_all_reachable_nodes_completed(&skipped, &edges));
    }

    #[test]
    fn test_isolated_nodes_must_complete() {
        let nodes = vec![node("a", NodeState::Success), node("lonely", NodeState::Pending)];
        assert_eq!(ids(DependencyAnalyzer::find_reachable_nodes(&nodes, &[])), vec!["a", "lonely"]);
        assert!(!DependencyAnalyzer::are_all_reachable_nodes_completed(&nodes, &[]));
    }

    #[test]
    fn test_graph_state() {
        let edges = vec![Edge::new("a", "b")];
        let running = vec![node("a", NodeState::Success), node("b", NodeState::Pending)];
        assert_eq!(DependencyAnalyzer::graph_state(&running, &edges), GraphState::Running);

        let failed = vec![node("a", NodeState::Fail), node("b", NodeState::Pending)];
        assert_eq!(DependencyAnalyzer::graph_state(&failed, &edges), GraphState::Fail);

        let done = vec![node("a", NodeState::Success), node("b", NodeState::Fail)];
        assert_eq!(DependencyAnalyzer::graph_state(&done, &edges), GraphState::Fail);

        assert_eq!(DependencyAnalyzer::graph_state(&[], &[]), GraphState::Success);
    }

    #[test]
    fn test_unknown_edge_endpoints_are_ignored() {
        let nodes = vec![node("a", NodeState::Pending)];
        let edges = vec![Edge::new("ghost", "a")];
        assert_eq!(ids(DependencyAnalyzer::find_executable_nodes(&nodes, &edges)), vec!["a"]);
    }
}
