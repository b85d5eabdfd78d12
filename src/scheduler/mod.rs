//! Tick driver.
//!
//! One call to [`WorkflowScheduler::schedule`] advances a graph by exactly
//! one batch: find the runnable nodes, wire their inputs, run them
//! concurrently, re-arm what they feed, fold the results back and recompute
//! the graph state. [`WorkflowScheduler::execute`] repeats that until the
//! graph is terminal.

mod analyzer;
mod dataflow;
mod merger;
mod rearm;

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::broadcast;
use tracing::{debug, info, trace};

use crate::{
    Result, TickflowError,
    common::BroadcastQueue,
    config::SchedulerConfig,
    dispatcher::VisitorExecutor,
    events::{Event, GraphEvent, Message, NodeEvent, TickEvent},
    model::{ERROR_PROPERTY, Graph, GraphState, Node, NodeState},
    registry::Registry,
    runtime::Context,
    utils::time::time_millis,
};

pub use analyzer::DependencyAnalyzer;
pub use dataflow::DataFlowManager;
pub use merger::StateMerger;
pub use rearm::rearm_dependents;

const EVENT_CAPACITY: usize = 1024;

pub struct WorkflowScheduler {
    registry: Arc<Registry>,
    dataflow: DataFlowManager,
    executor: VisitorExecutor,
    config: SchedulerConfig,
    events: Arc<BroadcastQueue<Event<Message>>>,
}

impl WorkflowScheduler {
    pub fn new(registry: Registry) -> Self {
        Self::with_config(registry, SchedulerConfig::default())
    }

    pub fn with_config(
        registry: Registry,
        config: SchedulerConfig,
    ) -> Self {
        let registry = Arc::new(registry);
        Self {
            dataflow: DataFlowManager::new(registry.clone()),
            executor: VisitorExecutor::new(registry.clone()).with_timeout(config.handler_timeout()),
            registry,
            config,
            events: BroadcastQueue::new(EVENT_CAPACITY),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Receives every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event<Message>> {
        self.events.subscribe()
    }

    /// Empty context sized by the configured capacity.
    pub fn context(&self) -> Context {
        Context::with_capacity(self.config.context_capacity)
    }

    /// Advances `graph` by one tick and returns the updated copy. On error
    /// the caller's graph is left as it was.
    pub async fn schedule(
        &self,
        graph: &Graph,
        ctx: Arc<Context>,
    ) -> Result<Graph> {
        let (graph, _) = self.tick(graph, ctx).await?;
        Ok(graph)
    }

    /// Ticks until the graph is terminal.
    pub async fn execute(
        &self,
        mut graph: Graph,
        ctx: Arc<Context>,
    ) -> Result<Graph> {
        let mut ticks: u64 = 0;
        while !graph.state.is_terminal() {
            if ticks >= self.config.max_ticks {
                return Err(TickflowError::Runtime(format!("graph {} did not finish within {} ticks", graph.name, self.config.max_ticks)));
            }

            let (next, executed) = self.tick(&graph, ctx.clone()).await?;
            ticks += 1;
            if executed == 0 && !next.state.is_terminal() {
                return Err(TickflowError::Runtime(format!("graph {} stalled at tick {}: no node can run", next.name, ticks)));
            }
            graph = next;
        }

        debug!(graph = %graph.name, ticks, state = graph.state.as_ref(), "execute finished");
        Ok(graph)
    }

    /// One tick. Also returns how many nodes ran.
    async fn tick(
        &self,
        graph: &Graph,
        ctx: Arc<Context>,
    ) -> Result<(Graph, usize)> {
        if graph.state.is_terminal() {
            trace!("scheduler::tick({}) already {}", graph.name, graph.state.as_ref());
            return Ok((graph.clone(), 0));
        }

        let mut graph = graph.clone();
        if graph.state == GraphState::Pending {
            self.dataflow.initialize_input_nodes(&mut graph.nodes, &graph.edges, &ctx);
            graph.state = GraphState::Running;
            self.publish(&graph, &ctx, "", TickEvent::Graph(GraphEvent::Running));
        }

        let outputs = self.dataflow.collect_outputs(&graph.nodes);
        let mut batch: Vec<Node> = DependencyAnalyzer::find_executable_nodes(&graph.nodes, &graph.edges).into_iter().cloned().collect();
        for node in batch.iter_mut() {
            self.dataflow.assign_inputs_to_node(node, &outputs, &graph.edges, &graph.nodes);
            self.publish(&graph, &ctx, &node.id, TickEvent::Node(NodeEvent::Running));
        }

        let count = batch.len();
        let results = join_all(batch.into_iter().map(|node| self.executor.execute(node, ctx.clone()))).await;
        let mut executed = results.into_iter().collect::<Result<Vec<Node>>>()?;

        for node in executed.iter() {
            let event = match node.state {
                NodeState::Fail => NodeEvent::Failed(node.get(ERROR_PROPERTY).map(|v| v.as_str().map(String::from).unwrap_or_else(|| v.to_string()))),
                _ => NodeEvent::Succeeded,
            };
            self.publish(&graph, &ctx, &node.id, TickEvent::Node(event));
        }

        let rearmed = rearm_dependents(&mut executed, &mut graph.nodes, &graph.edges);
        for nid in rearmed.iter() {
            self.publish(&graph, &ctx, nid, TickEvent::Node(NodeEvent::Rearmed));
        }

        graph.nodes = StateMerger::merge_node_states(std::mem::take(&mut graph.nodes), executed);
        graph.state = DependencyAnalyzer::graph_state(&graph.nodes, &graph.edges);
        debug!(graph = %graph.name, executed = count, rearmed = rearmed.len(), state = graph.state.as_ref(), "tick");

        if let Some(event) = TickEvent::finished(graph.state) {
            if event.is_error() {
                info!("graph {} failed", graph.name);
            } else {
                info!("graph {} succeeded", graph.name);
            }
            self.publish(&graph, &ctx, "", event);
        }

        Ok((graph, count))
    }

    fn publish(
        &self,
        graph: &Graph,
        ctx: &Context,
        nid: &str,
        event: TickEvent,
    ) {
        let message = Message {
            run: ctx.id().to_string(),
            graph: graph.name.clone(),
            nid: nid.to_string(),
            event,
            timestamp: time_millis(),
        };
        // nobody listening
        if self.events.send(Event::new(&message)).is_err() {
            trace!("scheduler::publish({}) dropped", graph.name);
        }
    }
}
