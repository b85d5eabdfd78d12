//! Node type registry.
//!
//! Associates each node type with its declared inputs and outputs, its
//! handlers and, for strongly typed kinds, the constructor used to rebuild a
//! node from its plain JSON shape. Matching is by exact type string; there
//! is no inheritance.

mod handler;
mod metadata;

use std::{collections::HashMap, future::Future, sync::Arc};

use serde_json::{Map, Value};
use tracing::trace;

use crate::{
    Result, TickflowError,
    common::Vars,
    kinds::{self, NodeKind},
    model::{ERROR_PROPERTY, Node},
    runtime::Context,
};

pub use handler::{ClassHandler, HandlerFuture, MethodHandler, Service, Visitor};
pub use metadata::KindMetadata;

type Hydrator = Arc<dyn Fn(&Node) -> Result<Node> + Send + Sync>;

#[derive(Default)]
pub struct Registry {
    kinds: HashMap<String, KindMetadata>,
    methods: Vec<MethodHandler>,
    services: Vec<ClassHandler>,
    hydrators: HashMap<String, Hydrator>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in node kinds and their handlers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        kinds::register_builtins(&mut registry);
        registry
    }

    /// Declares the inputs and outputs of an untyped node type.
    pub fn register_metadata(
        &mut self,
        kind: &str,
        metadata: KindMetadata,
    ) -> &mut Self {
        trace!("registry::register_metadata({})", kind);
        self.kinds.insert(kind.to_string(), metadata);
        self
    }

    /// Declares a strongly typed node kind, including its constructor.
    pub fn register_kind<K: NodeKind>(&mut self) -> &mut Self {
        self.register_metadata(K::TYPE, K::metadata());
        self.hydrators.insert(K::TYPE.to_string(), Arc::new(|plain: &Node| hydrate::<K>(plain)));
        self
    }

    /// Binds a method of a service instance to one node type.
    pub fn register_method<S, F, Fut>(
        &mut self,
        kind: &str,
        service: Arc<S>,
        method: &str,
        f: F,
    ) -> &mut Self
    where
        S: Send + Sync + 'static,
        F: Fn(Arc<S>, Node, Arc<Context>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Node>> + Send + 'static,
    {
        self.register_fn(kind, method, move |node, ctx| f(service.clone(), node, ctx))
    }

    /// Binds a free function to one node type.
    pub fn register_fn<F, Fut>(
        &mut self,
        kind: &str,
        name: &str,
        f: F,
    ) -> &mut Self
    where
        F: Fn(Node, Arc<Context>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Node>> + Send + 'static,
    {
        trace!("registry::register_method({}, {})", kind, name);
        self.methods.push(MethodHandler {
            kind: kind.to_string(),
            name: name.to_string(),
            call: Arc::new(move |node, ctx| Box::pin(f(node, ctx))),
        });
        self
    }

    /// Binds a service class to one node type. Its `visit` handles the node.
    pub fn register_service(
        &mut self,
        kind: &str,
        service: Arc<dyn Service>,
    ) -> &mut Self {
        trace!("registry::register_service({}, {})", kind, service.name());
        self.services.push(ClassHandler {
            kind: kind.to_string(),
            service,
        });
        self
    }

    pub fn metadata(
        &self,
        kind: &str,
    ) -> Option<&KindMetadata> {
        self.kinds.get(kind)
    }

    pub fn inputs(
        &self,
        kind: &str,
    ) -> Option<&[String]> {
        self.metadata(kind).map(|m| m.inputs.as_slice())
    }

    pub fn outputs(
        &self,
        kind: &str,
    ) -> Option<&[String]> {
        self.metadata(kind).map(|m| m.outputs.as_slice())
    }

    /// First method handler registered for exactly this type.
    pub fn method_handler(
        &self,
        kind: &str,
    ) -> Option<&MethodHandler> {
        self.methods.iter().find(|h| h.kind == kind)
    }

    /// First class handler registered for exactly this type.
    pub fn class_handler(
        &self,
        kind: &str,
    ) -> Option<&ClassHandler> {
        self.services.iter().find(|h| h.kind == kind)
    }

    /// Rebuilds a live node from its plain shape through the constructor
    /// registered for its `type`.
    pub fn from_json(
        &self,
        value: &Value,
    ) -> Result<Node> {
        let plain: Node = serde_json::from_value(value.clone())?;
        let hydrator = self.hydrators.get(&plain.kind).ok_or_else(|| TickflowError::Convert(format!("not found node type {}", plain.kind)))?;
        hydrator(&plain)
    }

    /// Plain shape of a node: system fields, declared properties and the
    /// error payload, or every property for an unregistered type.
    pub fn to_json(
        &self,
        node: &Node,
    ) -> Result<Value> {
        let Some(metadata) = self.metadata(&node.kind) else {
            return Ok(serde_json::to_value(node)?);
        };

        let mut map = Map::new();
        map.insert("id".to_string(), Value::String(node.id.clone()));
        map.insert("state".to_string(), serde_json::to_value(node.state)?);
        map.insert("type".to_string(), Value::String(node.kind.clone()));
        for name in metadata.declared().into_iter().chain([ERROR_PROPERTY]) {
            if let Some(v) = node.get(name) {
                map.insert(name.to_string(), v.clone());
            }
        }
        Ok(Value::Object(map))
    }
}

/// Starts from the kind's default instance, re-hydrates the declared
/// properties and copies back id and state.
fn hydrate<K: NodeKind>(plain: &Node) -> Result<Node> {
    let metadata = K::metadata();
    let declared: Vars = metadata.declared().into_iter().filter_map(|name| plain.get(name).map(|v| (name.to_string(), v.clone()))).collect();

    let instance: Value = declared.clone().into();
    jsonschema::validate(&K::schema(), &instance)?;

    let mut values = Vars::from(serde_json::to_value(K::default())?);
    values.extend(&declared);
    let typed: K = serde_json::from_value(values.into()).map_err(|e| TickflowError::Convert(format!("invalid {} node {}: {}", K::TYPE, plain.id, e)))?;

    let mut node = Node::new(plain.id.clone(), K::TYPE).with_state(plain.state);
    node.encode(&typed)?;
    if let Some(error) = plain.get(ERROR_PROPERTY) {
        node.set(ERROR_PROPERTY, error.clone());
    }
    Ok(node)
}
