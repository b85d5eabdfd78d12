//! Array iterator node.
//!
//! Emits one element per execution. Paired with a conditional loop-back
//! edge gated on `hasNext` and the scheduler's re-arming, it forms a bounded
//! loop without any looping primitive in the scheduler.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};

use crate::{
    Result,
    kinds::NodeKind,
    model::Node,
    registry::{Registry, Service, Visitor},
    runtime::Context,
};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ArrayIterator {
    pub array: Vec<Value>,
    pub current_index: usize,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub current_item: Option<Value>,
    pub has_next: bool,
    pub is_done: bool,
}

/// Keeps an explicit `null` element distinct from an absent item.
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl ArrayIterator {
    pub fn new(array: Vec<Value>) -> Self {
        Self {
            array,
            ..Default::default()
        }
    }

    /// Moves to the next element, or marks the iteration done.
    pub fn advance(&mut self) {
        if self.current_index >= self.array.len() {
            self.is_done = true;
            self.has_next = false;
            self.current_item = None;
            return;
        }

        self.current_item = Some(self.array[self.current_index].clone());
        self.has_next = self.current_index + 1 < self.array.len();
        self.current_index += 1;
        self.is_done = false;
    }
}

impl NodeKind for ArrayIterator {
    const TYPE: &'static str = "array_iterator";

    fn inputs() -> &'static [&'static str] {
        &["array", "currentIndex"]
    }

    fn outputs() -> &'static [&'static str] {
        &["currentItem", "hasNext", "isDone", "currentIndex"]
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "array": { "type": "array" },
                "currentIndex": { "type": "integer", "minimum": 0 },
                "hasNext": { "type": "boolean" },
                "isDone": { "type": "boolean" }
            }
        })
    }
}

/// Class handler of [`ArrayIterator`] nodes.
pub struct ArrayIteratorService;

impl Service for ArrayIteratorService {
    fn name(&self) -> &str {
        "ArrayIteratorService"
    }

    fn visitor(&self) -> Option<&dyn Visitor> {
        Some(self)
    }
}

#[async_trait]
impl Visitor for ArrayIteratorService {
    async fn visit(
        &self,
        mut node: Node,
        _ctx: Arc<Context>,
    ) -> Result<Node> {
        let mut iterator = match node.decode::<ArrayIterator>() {
            Ok(it) => it,
            Err(e) => return Ok(node.fail(e.to_string())),
        };
        iterator.advance();
        node.encode(&iterator)?;
        Ok(node.succeed())
    }
}

pub(crate) fn register(registry: &mut Registry) {
    registry.register_kind::<ArrayIterator>();
    registry.register_service(ArrayIterator::TYPE, Arc::new(ArrayIteratorService));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeState;

    fn iterator_node(
        array: Value,
        index: usize,
    ) -> Node {
        Node::new("it", ArrayIterator::TYPE).with("array", array).with("currentIndex", index)
    }

    #[test]
    fn test_advance_single_element() {
        let mut it = ArrayIterator::new(vec![json!("only")]);
        it.advance();
        assert_eq!(it.current_item, Some(json!("only")));
        assert!(!it.has_next);
        assert!(!it.is_done);

        it.advance();
        assert!(it.is_done);
        assert!(!it.has_next);
        assert_eq!(it.current_item, None);
    }

    #[test]
    fn test_out_of_bounds_is_done() {
        let mut it = ArrayIterator {
            array: vec![json!(1), json!(2)],
            current_index: 5,
            ..Default::default()
        };
        it.advance();
        assert!(it.is_done);
        assert!(!it.has_next);
        assert_eq!(it.current_index, 5);
    }

    #[test]
    fn test_null_element_is_kept() {
        let mut node = Node::new("it", ArrayIterator::TYPE);
        let mut it = ArrayIterator::new(vec![Value::Null, json!(1)]);
        it.advance();
        node.encode(&it).unwrap();
        assert_eq!(node.get("currentItem"), Some(&Value::Null));

        let decoded = node.decode::<ArrayIterator>().unwrap();
        assert_eq!(decoded.current_item, Some(Value::Null));
    }

    #[tokio::test]
    async fn test_visit_walks_array() {
        let ctx = Arc::new(Context::new());
        let service = ArrayIteratorService;

        let node = service.visit(iterator_node(json!(["a", "b"]), 0), ctx.clone()).await.unwrap();
        assert_eq!(node.state, NodeState::Success);
        assert_eq!(node.get("currentItem"), Some(&json!("a")));
        assert_eq!(node.get("hasNext"), Some(&json!(true)));
        assert_eq!(node.get("currentIndex"), Some(&json!(1)));

        let node = service.visit(node, ctx.clone()).await.unwrap();
        assert_eq!(node.get("currentItem"), Some(&json!("b")));
        assert_eq!(node.get("hasNext"), Some(&json!(false)));

        let node = service.visit(node, ctx).await.unwrap();
        assert_eq!(node.get("isDone"), Some(&json!(true)));
        assert!(node.get("currentItem").is_none());
    }

    #[tokio::test]
    async fn test_visit_reports_bad_array_as_failure() {
        let node = ArrayIteratorService.visit(iterator_node(json!("not an array"), 0), Arc::new(Context::new())).await.unwrap();
        assert_eq!(node.state, NodeState::Fail);
        assert!(node.get("error").is_some());
    }
}
