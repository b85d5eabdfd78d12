//! # Tickflow
//!
//! Tickflow is a tick-based DAG scheduler written in Rust.
//! Each tick finds the nodes whose dependencies are satisfied, wires their
//! inputs from upstream outputs, runs them concurrently and folds the
//! results back into the graph.
//!
//! ## Core Features
//!
//! - **Step Control**: `schedule` advances a graph by one batch, `execute` runs it to completion
//! - **Conditional Edges**: OR-joined branches gated on a source property
//! - **Loops Without Cycles**: completed nodes are re-armed when an active edge feeds them again
//! - **Explicit Registry**: node types, their inputs/outputs and handlers are registered by exact type name
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use tickflow::{Context, Graph, SchedulerBuilder};
//!
//! let scheduler = SchedulerBuilder::new().build()?;
//! let graph = Graph::from_json(json_str)?;
//! let ctx = Arc::new(Context::new().with("items", vec![1, 2, 3]));
//! let done = scheduler.execute(graph, ctx).await?;
//! ```

mod builder;
mod common;
mod config;
mod dispatcher;
mod error;
mod events;
mod model;
mod runtime;
mod utils;

pub mod kinds;
pub mod registry;
pub mod scheduler;

pub use builder::SchedulerBuilder;
pub use common::Vars;
pub use config::{Config, SchedulerConfig};
pub use dispatcher::VisitorExecutor;
pub use error::TickflowError;
pub use events::{Event, GraphEvent, Message, NodeEvent, TickEvent};
pub use model::*;
pub use runtime::Context;
pub use scheduler::WorkflowScheduler;

/// Result type alias for Tickflow operations.
pub type Result<T> = std::result::Result<T, TickflowError>;
