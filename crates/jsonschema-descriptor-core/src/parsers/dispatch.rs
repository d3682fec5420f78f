//! The dispatcher: entry point for every schema node.
//!
//! Owns the seen-table protocol (identity memoization, bounded re-entry for
//! self-referential graphs), consults the override hook, selects an emitter
//! by keyword priority, and appends annotations to the finished shape.

use serde_json::{Map, Value};

use crate::context::{node_id, RefContext, Seen};
use crate::descriptor::Descriptor;
use crate::schema_utils::{
    has_shaped_type, is_conditional, is_multi_type, is_nullable_flagged, type_is,
};

use super::array::parse_array;
use super::combinators::{parse_all_of, parse_any_of, parse_one_of};
use super::object::parse_object;
use super::primitives::{
    parse_boolean, parse_const, parse_default, parse_enum, parse_null, parse_number, parse_string,
};
use super::wrappers::{parse_if_then_else, parse_multiple_type, parse_not, parse_nullable};

/// Compile one schema node into a descriptor.
///
/// `path` is the JSON-Pointer-style location of the node, used for
/// diagnostics only. `skip_annotations` suppresses the
/// `description`/`defaultValue`/`readonly` post-processing; wrapper emitters
/// use it when re-dispatching a synthesized copy of the node so the
/// annotations land on the wrapper instead of the copy.
///
/// This function never fails: malformed keyword shapes degrade to the
/// accept-anything descriptor.
pub fn parse_schema(
    schema: &Value,
    refs: &mut RefContext,
    path: &str,
    skip_annotations: bool,
) -> Descriptor {
    let obj = match schema {
        Value::Bool(true) => return Descriptor::any(),
        Value::Bool(false) => return Descriptor::never(),
        Value::Object(obj) => obj,
        _ => {
            tracing::debug!(path, "schema node is neither boolean nor mapping, accepting anything");
            return Descriptor::any();
        }
    };

    // The hook outranks everything, including the seen table: its output is
    // verbatim text, never annotated, never cached.
    if let Some(hook) = refs.parser_override.clone() {
        if let Some(text) = hook.call(schema, refs, path) {
            return Descriptor::raw(text);
        }
    }

    let id = node_id(schema);
    match refs.seen.get_mut(&id) {
        Some(entry) => {
            if let Some(cached) = &entry.cached {
                return cached.clone();
            }
            // Reached again while an enclosing call is still computing this
            // node: spend one unit of the re-entry budget or cut the cycle.
            match refs.depth_limit {
                Some(limit) if entry.visits < limit => entry.visits += 1,
                _ => {
                    tracing::debug!(path, "re-entry budget exhausted, accepting anything");
                    return Descriptor::any();
                }
            }
        }
        None => {
            refs.seen.insert(id, Seen::default());
        }
    }

    let mut parsed = select_emitter(obj, refs, path);
    if !skip_annotations {
        apply_annotations(obj, refs, &mut parsed);
    }
    if let Some(entry) = refs.seen.get_mut(&id) {
        entry.cached = Some(parsed.clone());
    }
    parsed
}

/// Emitter selection, in strict priority order — first match wins.
///
/// The order matters: `enum` must outrank generic primitive typing so an
/// enum-constrained string emits as an enum, and the three combinator
/// keywords yield to `type: "object"`/`"array"` because those emitters fuse
/// sibling combinators themselves.
fn select_emitter(obj: &Map<String, Value>, refs: &mut RefContext, path: &str) -> Descriptor {
    if is_nullable_flagged(obj) {
        parse_nullable(obj, refs, path)
    } else if obj.contains_key("anyOf") && !has_shaped_type(obj) {
        keyword_members(obj, "anyOf", path)
            .map_or_else(Descriptor::any, |members| parse_any_of(members, refs, path))
    } else if obj.contains_key("oneOf") && !has_shaped_type(obj) {
        keyword_members(obj, "oneOf", path)
            .map_or_else(Descriptor::any, |members| parse_one_of(members, refs, path))
    } else if obj.contains_key("allOf") && !has_shaped_type(obj) {
        keyword_members(obj, "allOf", path)
            .map_or_else(Descriptor::any, |members| parse_all_of(members, refs, path))
    } else if obj.contains_key("not") {
        parse_not(obj, refs, path)
    } else if type_is(obj, "array") {
        parse_array(obj, refs, path)
    } else if type_is(obj, "object") {
        parse_object(obj, refs, path)
    } else if obj.contains_key("enum") {
        parse_enum(obj)
    } else if obj.contains_key("const") {
        parse_const(obj)
    } else if is_multi_type(obj) {
        parse_multiple_type(obj, refs, path)
    } else if type_is(obj, "string") {
        parse_string(obj)
    } else if type_is(obj, "number") || type_is(obj, "integer") {
        parse_number(obj)
    } else if type_is(obj, "boolean") {
        parse_boolean()
    } else if type_is(obj, "null") {
        parse_null()
    } else if is_conditional(obj) {
        parse_if_then_else(obj, refs, path)
    } else {
        parse_default()
    }
}

/// Member list of a combinator keyword, or `None` (logged) when the keyword
/// holds something other than a list.
fn keyword_members<'a>(
    obj: &'a Map<String, Value>,
    keyword: &str,
    path: &str,
) -> Option<&'a Vec<Value>> {
    let members = obj.get(keyword).and_then(Value::as_array);
    if members.is_none() {
        tracing::debug!(path, keyword, "combinator keyword is not a list, accepting anything");
    }
    members
}

/// Append `description`, `defaultValue` and `readonly` from the node onto the
/// finished descriptor, honoring the suppression switches.
fn apply_annotations(obj: &Map<String, Value>, refs: &RefContext, parsed: &mut Descriptor) {
    if !refs.suppress_descriptions {
        if let Some(description) = obj.get("description").and_then(Value::as_str) {
            if !description.is_empty() {
                parsed.meta.description = Some(description.to_string());
            }
        }
    }
    if !refs.suppress_defaults {
        if let Some(default) = obj.get("default") {
            parsed.meta.default_value = Some(default.clone());
        }
    }
    if obj.get("readOnly").and_then(Value::as_bool) == Some(true) {
        parsed.meta.readonly = true;
    }
}

// ===========================================================================
// Tests
// ===========================================================================
