//! Handler contracts.
//!
//! A method handler is one function bound to exactly one node type,
//! usually a method of a service instance. A class handler is a service
//! whose generic `visit` handles one node type.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::{Result, model::Node, runtime::Context};

pub type HandlerFuture = BoxFuture<'static, Result<Node>>;

pub(crate) type MethodFn = Arc<dyn Fn(Node, Arc<Context>) -> HandlerFuture + Send + Sync>;

/// Executes a node and returns it with its new state.
///
/// Return the node with `state: fail` to report a business failure.
/// Returning an error aborts the whole tick.
#[async_trait]
pub trait Visitor: Send + Sync {
    async fn visit(
        &self,
        node: Node,
        ctx: Arc<Context>,
    ) -> Result<Node>;
}

/// A service class registered as the handler of a node type.
pub trait Service: Send + Sync {
    /// Name used in logs and configuration errors.
    fn name(&self) -> &str;

    /// The generic `visit` entry point, if the service has one.
    fn visitor(&self) -> Option<&dyn Visitor> {
        None
    }
}

/// A single function bound to one node type.
#[derive(Clone)]
pub struct MethodHandler {
    pub(crate) kind: String,
    pub(crate) name: String,
    pub(crate) call: MethodFn,
}

impl MethodHandler {
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn invoke(
        &self,
        node: Node,
        ctx: Arc<Context>,
    ) -> HandlerFuture {
        (self.call)(node, ctx)
    }
}

/// A service bound to one node type.
#[derive(Clone)]
pub struct ClassHandler {
    pub(crate) kind: String,
    pub(crate) service: Arc<dyn Service>,
}

impl ClassHandler {
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn service(&self) -> Arc<dyn Service> {
        self.service.clone()
    }
}
