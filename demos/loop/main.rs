use std::sync::Arc;

use serde_json::{Value, json};
use tickflow::{
    Context, Graph, Node, Result, SchedulerBuilder,
    kinds::{ArrayIterator, NodeKind},
    registry::{KindMetadata, Registry},
};

async fn source(
    node: Node,
    _: Arc<Context>,
) -> Result<Node> {
    Ok(node.succeed())
}

async fn collect(
    node: Node,
    _: Arc<Context>,
) -> Result<Node> {
    let mut collected = node.get("collected").and_then(|v| v.as_array().cloned()).unwrap_or_default();
    if let Some(item) = node.get("currentItem") {
        collected.push(item.clone());
    }
    Ok(node.with("collected", collected).succeed())
}

#[tokio::main]
async fn main() {
    let mut registry = Registry::with_builtins();
    registry.register_metadata("source", KindMetadata::new().inputs(["items"]).outputs(["items"]));
    registry.register_fn("source", "source", source);
    registry.register_metadata("collect", KindMetadata::new().inputs(["currentItem", "hasNext"]).outputs(["collected", "hasNext"]));
    registry.register_fn("collect", "collect", collect);

    let scheduler = SchedulerBuilder::new().registry(registry).build().unwrap();

    let text = include_str!("./graph.json");
    let mut graph = Graph::from_json(text).unwrap();
    graph.validate().unwrap();

    let ctx = scheduler.context().with("items", json!(["apple", "banana", "cherry"]));
    let ctx = Arc::new(ctx);

    let mut tick = 0;
    while !graph.state.is_terminal() {
        graph = scheduler.schedule(&graph, ctx.clone()).await.unwrap();
        tick += 1;

        let states: Vec<String> = graph.nodes.iter().map(|n| format!("{}={}", n.id, n.state.as_ref())).collect();
        println!("tick {}: graph {} [{}]", tick, graph.state.as_ref(), states.join(", "));
    }

    let collected = graph.get_node("collect").and_then(|n| n.get("collected")).cloned().unwrap_or(Value::Null);
    let index = graph.get_node("iterate").and_then(|n| n.get("currentIndex")).cloned().unwrap_or(Value::Null);
    println!("{} items: {}, iterator stopped at {}", ArrayIterator::TYPE, collected, index);
}
