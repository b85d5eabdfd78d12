//! Events published by the scheduler while a graph advances.
//!
//! Subscribers receive node-level transitions (running, succeeded, failed,
//! re-armed) and graph-level transitions (running, succeeded, failed).

mod graph;
mod node;

pub use graph::GraphEvent;
pub use node::NodeEvent;

use crate::model::{GraphState, NodeId};

/// Generic event wrapper.
#[derive(Debug, Clone)]
pub struct Event<T> {
    inner: T,
}

/// Top-level event type.
#[derive(Debug, Clone, PartialEq)]
pub enum TickEvent {
    /// Graph-level transitions.
    Graph(GraphEvent),
    /// Node-level transitions.
    Node(NodeEvent),
}

/// Event message with the run it belongs to.
#[derive(Debug, Clone)]
pub struct Message {
    /// Context id of the run that generated this event.
    pub run: String,
    /// Name of the graph.
    pub graph: String,
    /// Node that generated this event (empty for graph events).
    pub nid: NodeId,
    /// The actual event data.
    pub event: TickEvent,
    /// Timestamp in milliseconds.
    pub timestamp: i64,
}

impl<T> std::ops::Deref for Event<T>
where
    T: std::fmt::Debug + Clone,
{
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T> Event<T>
where
    T: std::fmt::Debug + Clone,
{
    pub fn new(inner: &T) -> Self {
        Self {
            inner: inner.clone(),
        }
    }
}

impl TickEvent {
    /// Terminal graph event for a graph state, if the state is terminal.
    pub fn finished(state: GraphState) -> Option<Self> {
        match state {
            GraphState::Success => Some(TickEvent::Graph(GraphEvent::Succeeded)),
            GraphState::Fail => Some(TickEvent::Graph(GraphEvent::Failed)),
            GraphState::Pending | GraphState::Running => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, TickEvent::Graph(GraphEvent::Succeeded))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, TickEvent::Graph(GraphEvent::Failed))
    }
}
