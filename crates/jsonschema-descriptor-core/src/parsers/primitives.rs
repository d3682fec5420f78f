//! Leaf emitters: stateless mappings from one keyword shape to one
//! descriptor, no recursion back into the dispatcher.

use regex::Regex;
use serde_json::{Map, Number, Value};

use crate::descriptor::{Descriptor, Shape};

pub(crate) fn parse_string(obj: &Map<String, Value>) -> Descriptor {
    let pattern = obj.get("pattern").and_then(Value::as_str);
    if let Some(pattern) = pattern {
        if let Err(error) = Regex::new(pattern) {
            tracing::warn!(pattern, error = %error, "pattern keyword is not a valid regex");
        }
    }
    Shape::String {
        min_length: obj.get("minLength").and_then(Value::as_u64),
        max_length: obj.get("maxLength").and_then(Value::as_u64),
        pattern: pattern.map(str::to_string),
        format: obj.get("format").and_then(Value::as_str).map(str::to_string),
    }
    .into()
}

/// Numbers and integers share one shape; `integer` adds the `int` marker.
///
/// Bounds accept both dialects: the draft-4 form where
/// `exclusiveMinimum: true` modifies `minimum`, and the draft-2020 form where
/// `exclusiveMinimum` is itself the bound. A numeric `minimum` always wins
/// over a numeric `exclusiveMinimum` when both are present. Same for the
/// upper bound.
pub(crate) fn parse_number(obj: &Map<String, Value>) -> Descriptor {
    let (minimum, exclusive_minimum) = bound(obj, "minimum", "exclusiveMinimum");
    let (maximum, exclusive_maximum) = bound(obj, "maximum", "exclusiveMaximum");
    Shape::Number {
        int: obj.get("type").and_then(Value::as_str) == Some("integer"),
        minimum,
        exclusive_minimum,
        maximum,
        exclusive_maximum,
        multiple_of: number_keyword(obj, "multipleOf"),
    }
    .into()
}

/// Resolve one side's inclusive/exclusive pair.
fn bound(
    obj: &Map<String, Value>,
    inclusive: &str,
    exclusive: &str,
) -> (Option<Number>, Option<Number>) {
    match number_keyword(obj, inclusive) {
        Some(n) if obj.get(exclusive).and_then(Value::as_bool) == Some(true) => (None, Some(n)),
        Some(n) => (Some(n), None),
        None => (None, number_keyword(obj, exclusive)),
    }
}

fn number_keyword(obj: &Map<String, Value>, key: &str) -> Option<Number> {
    obj.get(key).and_then(Value::as_number).cloned()
}

pub(crate) fn parse_boolean() -> Descriptor {
    Shape::Boolean.into()
}

pub(crate) fn parse_null() -> Descriptor {
    Shape::Null.into()
}

/// `enum` values pass through in declaration order. A non-list value is
/// treated as a one-element list; an empty list can match nothing.
pub(crate) fn parse_enum(obj: &Map<String, Value>) -> Descriptor {
    let values: Vec<Value> = match obj.get("enum") {
        Some(Value::Array(values)) => values.clone(),
        Some(other) => vec![other.clone()],
        None => Vec::new(),
    };
    if values.is_empty() {
        return Descriptor::never();
    }
    Shape::Enum { values }.into()
}

/// `const` admits exactly one value, of any JSON type. `null` included.
pub(crate) fn parse_const(obj: &Map<String, Value>) -> Descriptor {
    Shape::Literal {
        value: obj.get("const").cloned().unwrap_or(Value::Null),
    }
    .into()
}

/// The fallback emitter for nodes no other predicate claims.
pub(crate) fn parse_default() -> Descriptor {
    Descriptor::any()
}

// ===========================================================================
// Tests
// ===========================================================================
