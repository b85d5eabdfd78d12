use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Result, TickflowError, common::Vars, kinds::NodeKind};

/// node id
pub type NodeId = String;

/// Property names owned by the scheduler, never part of a node's data.
pub(crate) const SYSTEM_FIELDS: [&str; 3] = ["id", "state", "type"];

/// Property carrying the error payload of a failed node.
pub const ERROR_PROPERTY: &str = "error";

/// Lifecycle of a single node: `pending -> running -> {success|fail}`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NodeState {
    #[default]
    Pending,
    Running,
    Success,
    Fail,
}

impl NodeState {
    /// `success` or `fail`.
    pub fn is_completed(&self) -> bool {
        matches!(self, NodeState::Success | NodeState::Fail)
    }
}

/// A typed bag of state.
///
/// `kind` is the type discriminator used to look up metadata and handlers;
/// every other property lives in `props` and is addressed by name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Node {
    /// node id, unique within a graph
    pub id: NodeId,
    /// node execution state
    #[serde(default)]
    pub state: NodeState,
    /// node type
    #[serde(rename = "type")]
    pub kind: String,
    /// declared and undeclared properties
    #[serde(flatten)]
    pub props: Vars,
}

impl Node {
    pub fn new(
        id: impl Into<NodeId>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            state: NodeState::Pending,
            kind: kind.into(),
            props: Vars::new(),
        }
    }

    pub fn with<V: Into<Value>>(
        mut self,
        key: &str,
        value: V,
    ) -> Self {
        self.props.set(key, value);
        self
    }

    pub fn with_state(
        mut self,
        state: NodeState,
    ) -> Self {
        self.state = state;
        self
    }

    pub fn get(
        &self,
        key: &str,
    ) -> Option<&Value> {
        self.props.get_value(key)
    }

    pub fn set<V: Into<Value>>(
        &mut self,
        key: &str,
        value: V,
    ) {
        self.props.set(key, value);
    }

    /// Marks the node as succeeded.
    pub fn succeed(mut self) -> Self {
        self.state = NodeState::Success;
        self
    }

    /// Marks the node as failed with an error payload. This is how a handler
    /// reports a business failure.
    pub fn fail(
        mut self,
        error: impl Into<String>,
    ) -> Self {
        self.state = NodeState::Fail;
        self.props.set(ERROR_PROPERTY, error.into());
        self
    }

    /// Reads the properties into the strongly typed struct of a node kind.
    pub fn decode<K: NodeKind>(&self) -> Result<K> {
        if self.kind != K::TYPE {
            return Err(TickflowError::Node(format!("node {} has type {}, expected {}", self.id, self.kind, K::TYPE)));
        }
        let value: Value = self.props.clone().into();
        serde_json::from_value(value).map_err(|e| TickflowError::Node(format!("invalid properties on node {}: {}", self.id, e)))
    }

    /// Writes the declared inputs and outputs of a typed struct back onto
    /// the node. Declared properties the struct leaves undefined are removed.
    pub fn encode<K: NodeKind>(
        &mut self,
        kind: &K,
    ) -> Result<()> {
        let values = Vars::from(serde_json::to_value(kind)?);
        for name in K::inputs().iter().chain(K::outputs().iter()) {
            match values.get_value(name) {
                Some(v) => self.props.set(name, v.clone()),
                None => {
                    self.props.remove(name);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_node_json_shape() {
        let node: Node = serde_json::from_value(json!({
            "id": "a",
            "type": "echo",
            "message": "hi",
            "count": 0
        }))
        .unwrap();
        assert_eq!(node.state, NodeState::Pending);
        assert_eq!(node.kind, "echo");
        assert_eq!(node.get("message"), Some(&json!("hi")));
        assert!(!node.props.contains_key("id"));

        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value, json!({"id": "a", "state": "pending", "type": "echo", "message": "hi", "count": 0}));
    }

    #[test]
    fn test_fail_carries_error() {
        let node = Node::new("a", "echo").fail("boom");
        assert_eq!(node.state, NodeState::Fail);
        assert_eq!(node.get(ERROR_PROPERTY), Some(&json!("boom")));
    }

    #[test]
    fn test_state_strings() {
        assert_eq!(NodeState::Success.as_ref(), "success");
        assert!(NodeState::Fail.is_completed());
        assert!(!NodeState::Running.is_completed());
    }
}
