//! Descriptors for `type: "array"` nodes: homogeneous arrays and tuples.

use serde_json::{Map, Value};

use crate::context::RefContext;
use crate::descriptor::{Descriptor, Shape};
use crate::schema_utils::build_path;

use super::dispatch::parse_schema;

/// Compile a `type: "array"` node.
///
/// A list-valued `items` is positional and becomes a tuple; any other
/// `items` value is the element schema of a homogeneous array, defaulting to
/// accept-anything when absent. `minItems`/`maxItems` apply to the array
/// form only; a tuple's length is fixed by its item count.
pub(crate) fn parse_array(obj: &Map<String, Value>, refs: &mut RefContext, path: &str) -> Descriptor {
    if let Some(items) = obj.get("items").and_then(Value::as_array) {
        let items = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                parse_schema(item, refs, &build_path(path, &["items", &i.to_string()]), false)
            })
            .collect();
        return Shape::Tuple { items }.into();
    }

    let element = match obj.get("items") {
        Some(items) => parse_schema(items, refs, &build_path(path, &["items"]), false),
        None => Descriptor::any(),
    };
    Shape::Array {
        element: Box::new(element),
        min_length: obj.get("minItems").and_then(Value::as_u64),
        max_length: obj.get("maxItems").and_then(Value::as_u64),
    }
    .into()
}

// ===========================================================================
// Tests
// ===========================================================================
