use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    Result, TickflowError,
    model::{Edge, Node, NodeId},
};

/// Overall state of a graph. `success` and `fail` are terminal.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GraphState {
    #[default]
    Pending,
    Running,
    Success,
    Fail,
}

impl GraphState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GraphState::Success | GraphState::Fail)
    }
}

/// The persisted state of a DAG between ticks.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Graph {
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub state: GraphState,
}

impl Graph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn node(
        mut self,
        node: Node,
    ) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn edge(
        mut self,
        edge: Edge,
    ) -> Self {
        self.edges.push(edge);
        self
    }

    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str::<Graph>(s).map_err(|e| TickflowError::Graph(format!("{}", e)))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn get_node(
        &self,
        id: &str,
    ) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Checks the construction-time contract: unique node ids and edges
    /// that only refer to existing nodes. The scheduler never calls this.
    pub fn validate(&self) -> Result<()> {
        let mut ids: HashSet<&NodeId> = HashSet::new();
        for node in self.nodes.iter() {
            if !ids.insert(&node.id) {
                return Err(TickflowError::Node(format!("duplicated node id {}", node.id)));
            }
        }
        for edge in self.edges.iter() {
            if !ids.contains(&edge.from) {
                return Err(TickflowError::Edge(format!("source node {} not found", edge.from)));
            }
            if !ids.contains(&edge.to) {
                return Err(TickflowError::Edge(format!("target node {} not found", edge.to)));
            }
        }
        Ok(())
    }
}
