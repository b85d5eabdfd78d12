//! Strongly typed node kinds.
//!
//! A kind keeps its business fields in a struct and declares which of them
//! are inputs and outputs. The scheduler only ever sees the property bag.

pub mod array_iterator;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::json;

use crate::registry::{KindMetadata, Registry};

pub use array_iterator::{ArrayIterator, ArrayIteratorService};

pub trait NodeKind: Serialize + DeserializeOwned + Default + Send + Sync + 'static {
    /// Type discriminator stored in `Node::kind`.
    const TYPE: &'static str;

    /// Properties read by the handler.
    fn inputs() -> &'static [&'static str];

    /// Properties written by the handler.
    fn outputs() -> &'static [&'static str];

    /// Inputs that collect several edges into one array.
    fn aggregated_inputs() -> &'static [&'static str] {
        &[]
    }

    /// JSON schema of the declared properties.
    fn schema() -> serde_json::Value {
        json!({ "type": "object" })
    }

    fn metadata() -> KindMetadata {
        KindMetadata::new().inputs(Self::inputs().iter().copied()).outputs(Self::outputs().iter().copied()).aggregated(Self::aggregated_inputs().iter().copied())
    }
}

pub(crate) fn register_builtins(registry: &mut Registry) {
    array_iterator::register(registry);
}
