//! Wrapper emitters: descriptors that enclose a re-dispatched sub-schema.
//!
//! `not` and the conditional dispatch nested keyword values directly. The
//! nullable flag and multi-type lists have no nested schema to descend into,
//! so they dispatch synthesized copies of the node itself (flag stripped,
//! type narrowed); the copies are owned by the context arena and dispatched
//! with annotations suppressed so the node's annotations land on the wrapper
//! exactly once.

use serde_json::{Map, Value};

use crate::context::RefContext;
use crate::descriptor::{Descriptor, Shape};
use crate::schema_utils::build_path;

use super::dispatch::parse_schema;

pub(crate) fn parse_nullable(
    obj: &Map<String, Value>,
    refs: &mut RefContext,
    path: &str,
) -> Descriptor {
    let mut copy = obj.clone();
    copy.remove("nullable");
    let copy = refs.hold(Value::Object(copy));
    let inner = parse_schema(&copy, refs, path, true);
    Shape::Nullable {
        inner: Box::new(inner),
    }
    .into()
}

pub(crate) fn parse_not(obj: &Map<String, Value>, refs: &mut RefContext, path: &str) -> Descriptor {
    let schema = match obj.get("not") {
        Some(sub) => parse_schema(sub, refs, &build_path(path, &["not"]), false),
        None => Descriptor::any(),
    };
    Shape::Not {
        schema: Box::new(schema),
    }
    .into()
}

pub(crate) fn parse_if_then_else(
    obj: &Map<String, Value>,
    refs: &mut RefContext,
    path: &str,
) -> Descriptor {
    Shape::Conditional {
        when: Box::new(branch(obj, "if", refs, path)),
        then: Box::new(branch(obj, "then", refs, path)),
        otherwise: Box::new(branch(obj, "else", refs, path)),
    }
    .into()
}

fn branch(
    obj: &Map<String, Value>,
    keyword: &str,
    refs: &mut RefContext,
    path: &str,
) -> Descriptor {
    match obj.get(keyword) {
        Some(sub) => parse_schema(sub, refs, &build_path(path, &[keyword]), false),
        None => Descriptor::any(),
    }
}

/// A `type` list compiles to the union of the node narrowed to each listed
/// type in turn, so sibling constraints stay in force per member
/// (`{"type": ["string", "null"], "minLength": 1}` keeps `minLength` on the
/// string option).
pub(crate) fn parse_multiple_type(
    obj: &Map<String, Value>,
    refs: &mut RefContext,
    path: &str,
) -> Descriptor {
    let Some(entries) = obj.get("type").and_then(Value::as_array) else {
        return Descriptor::any();
    };

    let mut options = Vec::new();
    for entry in entries {
        let Some(name) = entry.as_str() else {
            tracing::debug!(path, "skipping non-string entry in type list");
            continue;
        };
        let mut copy = obj.clone();
        copy.insert("type".to_string(), Value::String(name.to_string()));
        let copy = refs.hold(Value::Object(copy));
        options.push(parse_schema(&copy, refs, path, true));
    }

    if options.is_empty() {
        return Descriptor::any();
    }
    Shape::Union {
        options,
        exclusive: false,
    }
    .into()
}

// ===========================================================================
// Tests
// ===========================================================================
