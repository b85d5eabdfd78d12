//! Moves data between nodes along edges.
//!
//! Outputs are read through the declared output properties of a node's
//! type, inputs are written by edge rules, and root inputs are seeded once
//! from the external context.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use serde_json::Value;
use tracing::trace;

use crate::{
    common::Vars,
    model::{Edge, Node, NodeId, NodeState, SYSTEM_FIELDS},
    registry::Registry,
    runtime::Context,
};

pub struct DataFlowManager {
    registry: Arc<Registry>,
}

impl DataFlowManager {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
        }
    }

    /// Declared outputs that are currently defined. Nodes of an unregistered
    /// type expose every property except the system fields.
    pub fn extract_node_outputs(
        &self,
        node: &Node,
    ) -> Vars {
        match self.registry.outputs(&node.kind) {
            Some(outputs) => outputs.iter().filter_map(|name| node.get(name).map(|v| (name.clone(), v.clone()))).collect(),
            None => node.props.iter().filter(|(k, _)| !SYSTEM_FIELDS.contains(&k.as_str())).map(|(k, v)| (k.clone(), v.clone())).collect(),
        }
    }

    /// Outputs of every `success` node, keyed by node id.
    pub fn collect_outputs(
        &self,
        nodes: &[Node],
    ) -> HashMap<NodeId, Vars> {
        nodes.iter().filter(|n| n.state == NodeState::Success).map(|n| (n.id.clone(), self.extract_node_outputs(n))).collect()
    }

    /// Writes the target's inputs from the recorded outputs of its sources.
    ///
    /// Unconditional edges are applied before conditional ones, each group in
    /// declaration order, so a conditional edge wins when both write the same
    /// property. Aggregated inputs collect every active property-mapped edge
    /// into an array ordered by ascending weight.
    pub fn assign_inputs_to_node(
        &self,
        target: &mut Node,
        outputs: &HashMap<NodeId, Vars>,
        edges: &[Edge],
        nodes: &[Node],
    ) {
        let mut incoming: Vec<&Edge> = edges.iter().filter(|e| e.to == target.id).collect();
        incoming.sort_by_key(|e| e.is_conditional());

        let metadata = self.registry.metadata(&target.kind);
        let mut gathered: BTreeMap<String, Vec<(f64, Value)>> = BTreeMap::new();

        for edge in incoming {
            let Some(source_outputs) = outputs.get(&edge.from) else {
                continue;
            };

            if let Some(condition) = &edge.condition {
                let matched = nodes.iter().find(|n| n.id == edge.from).is_some_and(|source| condition.matches(source));
                if !matched {
                    continue;
                }
            }

            match edge.mapping() {
                Some((from_property, to_property)) => {
                    // an undefined source value never clobbers the target
                    let Some(value) = source_outputs.get_value(from_property) else {
                        continue;
                    };
                    if metadata.is_some_and(|m| m.is_aggregated(to_property)) {
                        gathered.entry(to_property.to_string()).or_default().push((edge.weight.unwrap_or(0.0), value.clone()));
                    } else {
                        target.set(to_property, value.clone());
                    }
                }
                None => target.props.extend(source_outputs),
            }
        }

        for (property, mut values) in gathered {
            values.sort_by(|a, b| a.0.total_cmp(&b.0));
            target.set(&property, Value::Array(values.into_iter().map(|(_, v)| v).collect()));
        }
    }

    /// Seeds the still-open declared inputs of every node from the context,
    /// trying `"<nodeId>.<property>"` before `"<property>"`. Only called when
    /// the graph leaves `pending`.
    pub fn initialize_input_nodes(
        &self,
        nodes: &mut [Node],
        edges: &[Edge],
        ctx: &Context,
    ) {
        for node in nodes.iter_mut() {
            let Some(inputs) = self.registry.inputs(&node.kind) else {
                continue;
            };
            for property in inputs {
                if !Self::is_input_property(node, property, edges) {
                    continue;
                }
                if let Some(value) = ctx.resolve(&node.id, property) {
                    trace!("dataflow::seed({}.{})", node.id, property);
                    node.set(property, value);
                }
            }
        }
    }

    /// A property can be seeded from the context unless an unconditional
    /// edge writes it. Edges without a target property write every property.
    pub fn is_input_property(
        node: &Node,
        property: &str,
        edges: &[Edge],
    ) -> bool {
        !edges.iter().any(|e| e.to == node.id && !e.is_conditional() && e.targets_property(property))
    }
}
