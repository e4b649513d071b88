//! Mock data synthesis.
//!
//! Produces fake values shaped like a [`SchemaNode`]. Only the structural
//! type is honored; formats, patterns, enums, and bounds are ignored.

use crate::spec::SchemaNode;
use fake::faker::boolean::en::Boolean;
use fake::faker::lorem::en::Word;
use fake::Fake;
use rand::Rng;
use serde_json::{json, Map, Value};

/// Upper bound (inclusive) for synthesized integers.
pub const MAX_INTEGER: i64 = 9999;

/// Synthesize a value for an optional schema.
///
/// Returns `None` when there is no schema or its type is unknown. Callers
/// serialize `None` as JSON `null`.
pub fn synthesize(schema: Option<&SchemaNode>) -> Option<Value> {
    match schema? {
        SchemaNode::String => Some(json!(Word().fake::<String>())),
        SchemaNode::Integer => {
            let mut rng = rand::thread_rng();
            Some(json!(rng.gen_range(0..=MAX_INTEGER)))
        }
        SchemaNode::Boolean => Some(json!(Boolean(50).fake::<bool>())),
        SchemaNode::Array(items) => {
            let item = synthesize(Some(items.as_ref())).unwrap_or(Value::Null);
            Some(Value::Array(vec![item]))
        }
        SchemaNode::Object(properties) => {
            let object: Map<String, Value> = properties
                .iter()
                .map(|(name, schema)| {
                    (name.clone(), synthesize(Some(schema)).unwrap_or(Value::Null))
                })
                .collect();
            Some(Value::Object(object))
        }
        SchemaNode::Unknown => None,
    }
}
