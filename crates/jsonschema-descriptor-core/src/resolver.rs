//! Caller-side reference plumbing.
//!
//! The dispatcher never resolves `$ref`: callers pre-resolve references into
//! shared node identities. These helpers implement that contract for the
//! common case — local JSON-Pointer references inside one shared document —
//! by way of the override hook, so repeated and cyclic targets flow through
//! the seen table like any other shared node.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use crate::config::ParserOverride;
use crate::context::node_id;
use crate::parsers::parse_schema;
use crate::schema_utils::{build_path, split_path};

/// Resolve a JSON Pointer against a document root.
///
/// Accepts `#/$defs/Address`-style paths with or without the leading `#`,
/// RFC 6901 escapes, array indices, and bare `#` for the whole document.
/// Returns `None` when any segment fails to resolve.
///
/// # Example
/// ```
/// use jsonschema_descriptor_core::resolve_pointer;
/// use serde_json::json;
///
/// let doc = json!({ "$defs": { "a/b": { "type": "string" } } });
/// let node = resolve_pointer(&doc, "#/$defs/a~1b").unwrap();
/// assert_eq!(node["type"], "string");
/// ```
pub fn resolve_pointer<'a>(root: &'a Value, pointer: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in split_path(pointer) {
        current = match current {
            Value::Object(map) => map.get(&segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Enumerate component JSON Pointers in a schema document.
///
/// Lists every entry under `$defs` (Draft 2019-09+) and `definitions`
/// (Draft 4-7), including components nested inside other components
/// (`#/$defs/Outer/$defs/Inner`). Returns a sorted, deduplicated list.
///
/// # Example
/// ```
/// use jsonschema_descriptor_core::list_components;
/// use serde_json::json;
///
/// let schema = json!({ "$defs": { "Pet": { "type": "object" } } });
/// assert_eq!(list_components(&schema), vec!["#/$defs/Pet"]);
/// ```
pub fn list_components(schema: &Value) -> Vec<String> {
    let mut pointers: Vec<String> = Vec::new();
    collect_components(schema, "#", &mut pointers);
    pointers.sort();
    pointers.dedup();
    pointers
}

fn collect_components(node: &Value, path: &str, out: &mut Vec<String>) {
    let Some(obj) = node.as_object() else {
        return;
    };
    for keyword in ["$defs", "definitions"] {
        if let Some(Value::Object(defs)) = obj.get(keyword) {
            for (key, component) in defs {
                let pointer = build_path(path, &[keyword, key]);
                out.push(pointer.clone());
                collect_components(component, &pointer, out);
            }
        }
    }
}

/// The standard override hook: resolve local `$ref` pointers inside a shared
/// document.
///
/// Nodes carrying a `$ref` whose value is a `#…` JSON Pointer are replaced
/// by dispatching the pointer's target inside `document`. A target that is
/// itself a local `$ref` node is an alias, and the chain is followed before
/// dispatching. Every ref to one schema therefore dispatches the same node
/// instance: targets are memoized, and a cycle that runs through a real
/// schema hits the dispatcher's re-entry control. Non-local and
/// unresolvable refs decline, leaving the node to normal dispatch. An alias
/// chain that loops back on itself declines too, so cycles made only of
/// `$ref` nodes degrade to the accept-anything descriptor.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use jsonschema_descriptor_core::{compile, ref_resolving_override, CompileOptions};
/// use serde_json::json;
///
/// let doc = Arc::new(json!({
///     "$defs": { "name": { "type": "string" } },
///     "$ref": "#/$defs/name"
/// }));
/// let options = CompileOptions {
///     parser_override: Some(ref_resolving_override(doc.clone())),
///     ..CompileOptions::default()
/// };
/// assert_eq!(compile(&doc, &options), r#"{"type": "string"}"#);
/// ```
pub fn ref_resolving_override(document: Arc<Value>) -> ParserOverride {
    ParserOverride::new(move |node, refs, path| {
        let mut reference = node.get("$ref").and_then(Value::as_str)?;
        if !reference.starts_with('#') {
            return None;
        }

        // Hook consultation precedes the seen table, so a chain of pure
        // `$ref` nodes would re-enter this closure without ever creating a
        // seen entry. Walk the chain iteratively instead, and decline when
        // it revisits a node.
        let mut visited = HashSet::from([node_id(node)]);
        let target = loop {
            let Some(target) = resolve_pointer(&document, reference) else {
                tracing::debug!(path, reference, "local reference does not resolve, leaving node as-is");
                return None;
            };
            if !visited.insert(node_id(target)) {
                tracing::debug!(path, reference, "reference chain loops back on itself, leaving node as-is");
                return None;
            }
            match target.get("$ref").and_then(Value::as_str) {
                Some(next) if next.starts_with('#') => reference = next,
                _ => break target,
            }
        };
        Some(parse_schema(target, refs, path, false).to_string())
    })
}

// ===========================================================================
// Tests
// ===========================================================================
