//! Dispatches a node to the handler registered for its exact type.
//!
//! Resolution order:
//! - a method handler bound to the type
//! - a class handler bound to the type, through its `visit`
//!
//! Resolution failures are configuration errors and abort the tick. The
//! fatal error kind raised by a handler is returned unchanged, any other
//! handler error is wrapped with the node id.

use std::{sync::Arc, time::Duration};

use tracing::{trace, warn};

use crate::{
    Result, TickflowError,
    model::{Node, NodeState},
    registry::{HandlerFuture, Registry},
    runtime::Context,
};

/// Error payload of a node whose handler missed its deadline.
pub const TIMEOUT_ERROR: &str = "timeout";

pub struct VisitorExecutor {
    registry: Arc<Registry>,
    /// Deadline for a single handler invocation.
    timeout: Option<Duration>,
}

impl VisitorExecutor {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            timeout: None,
        }
    }

    pub fn with_timeout(
        mut self,
        timeout: Option<Duration>,
    ) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs the handler of `node` and returns the node with its new state.
    pub async fn execute(
        &self,
        mut node: Node,
        ctx: Arc<Context>,
    ) -> Result<Node> {
        let nid = node.id.clone();
        node.state = NodeState::Running;

        let started = node.clone();
        let future = self.dispatch(node, ctx)?;

        let ret = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, future).await {
                Ok(ret) => ret,
                Err(_) => {
                    warn!(nid = %nid, timeout_ms = timeout.as_millis() as u64, "handler timed out");
                    return Ok(started.fail(TIMEOUT_ERROR));
                }
            },
            None => future.await,
        };

        match ret {
            Ok(mut executed) => {
                executed.id = nid;
                if executed.state == NodeState::Running {
                    executed.state = NodeState::Success;
                }
                Ok(executed)
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => Err(TickflowError::Handler {
                nid,
                message: e.to_string(),
            }),
        }
    }

    /// Resolves the handler for the node's type into a ready-to-await call.
    fn dispatch(
        &self,
        node: Node,
        ctx: Arc<Context>,
    ) -> Result<HandlerFuture> {
        if let Some(method) = self.registry.method_handler(&node.kind) {
            trace!("dispatch::method({}, {})", node.kind, method.name());
            return Ok(method.invoke(node, ctx));
        }

        if let Some(class) = self.registry.class_handler(&node.kind) {
            let service = class.service();
            if service.visitor().is_none() {
                return Err(missing_visit(service.name()));
            }
            trace!("dispatch::visit({}, {})", node.kind, service.name());
            return Ok(Box::pin(async move {
                match service.visitor() {
                    Some(visitor) => visitor.visit(node, ctx).await,
                    None => Err(missing_visit(service.name())),
                }
            }));
        }

        Err(TickflowError::HandlerNotFound(node.kind))
    }
}

fn missing_visit(name: &str) -> TickflowError {
    TickflowError::Config(format!("Handler {} has no visit method or a registered handler method", name))
}
