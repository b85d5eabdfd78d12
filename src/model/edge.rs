//! Edges between nodes.
//!
//! An edge without property names transfers the whole output object of its
//! source; an edge with property names copies exactly one value. A
//! condition gates the edge on a property of the source node.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Node, NodeId, NodeState};

/// Gate on a source property.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EdgeCondition {
    pub property: String,
    pub value: Value,
}

impl EdgeCondition {
    /// Active when the source has succeeded and the named property strictly
    /// equals the expected value.
    pub fn matches(
        &self,
        source: &Node,
    ) -> bool {
        source.state == NodeState::Success && source.get(&self.property).is_some_and(|actual| strict_eq(actual, &self.value))
    }
}

/// Strict equality between two property values.
///
/// Primitives compare by value, numbers numerically. Arrays and objects
/// never compare equal: they would have to be the same instance.
pub fn strict_eq(
    a: &Value,
    b: &Value,
) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => false,
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// ID of the source node.
    pub from: NodeId,
    /// ID of the target node.
    pub to: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_property: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_property: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<EdgeCondition>,
    /// Ordering hint for aggregated inputs, ascending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl Edge {
    /// Whole-object edge.
    pub fn new(
        from: impl Into<NodeId>,
        to: impl Into<NodeId>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            from_property: None,
            to_property: None,
            condition: None,
            weight: None,
        }
    }

    /// Property-level edge.
    pub fn mapped(
        from: impl Into<NodeId>,
        from_property: impl Into<String>,
        to: impl Into<NodeId>,
        to_property: impl Into<String>,
    ) -> Self {
        Self {
            from_property: Some(from_property.into()),
            to_property: Some(to_property.into()),
            ..Self::new(from, to)
        }
    }

    pub fn when<V: Into<Value>>(
        mut self,
        property: impl Into<String>,
        value: V,
    ) -> Self {
        self.condition = Some(EdgeCondition {
            property: property.into(),
            value: value.into(),
        });
        self
    }

    pub fn weight(
        mut self,
        weight: f64,
    ) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }

    /// Source and target property names of a property-level edge. A side
    /// left unset takes the name of the other side.
    pub fn mapping(&self) -> Option<(&str, &str)> {
        match (self.from_property.as_deref(), self.to_property.as_deref()) {
            (None, None) => None,
            (Some(f), Some(t)) => Some((f, t)),
            (Some(f), None) => Some((f, f)),
            (None, Some(t)) => Some((t, t)),
        }
    }

    /// Whether this edge writes the given property of its target. Edges
    /// without a target property write every property.
    pub fn targets_property(
        &self,
        property: &str,
    ) -> bool {
        match self.to_property.as_deref() {
            None => true,
            Some(p) => p == property,
        }
    }

    /// Unconditional edges are always active; conditional ones only once
    /// the source satisfies the condition.
    pub fn is_active(
        &self,
        source: &Node,
    ) -> bool {
        match &self.condition {
            None => true,
            Some(condition) => condition.matches(source),
        }
    }
}
