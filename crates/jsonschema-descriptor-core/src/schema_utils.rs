//! Shared schema utilities: JSON Pointer paths and keyword detection.
//!
//! Provides two concerns used across the compiler:
//! 1. **JSON Pointer escaping** (RFC 6901) for the diagnostic paths threaded
//!    through dispatch and for component lookup
//! 2. **Keyword detection** predicates that emitter selection and the object
//!    assembler share

use std::borrow::Cow;

use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// JSON Pointer escaping (RFC 6901)
// ---------------------------------------------------------------------------

/// Escape a single path segment per RFC 6901.
///
/// - `~` → `~0`
/// - `/` → `~1`
///
/// Returns `Cow::Borrowed` when no escaping is needed (the common case).
pub fn escape_pointer_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains('~') || segment.contains('/') {
        Cow::Owned(segment.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Build a JSON Pointer path by appending segments to a parent path.
///
/// Each segment is escaped per RFC 6901 before joining.
///
/// # Example
/// ```
/// use jsonschema_descriptor_core::build_path;
/// assert_eq!(build_path("#", &["properties", "a/b"]), "#/properties/a~1b");
/// ```
pub fn build_path(parent: &str, segments: &[&str]) -> String {
    let mut path = parent.to_string();
    for segment in segments {
        path.push('/');
        path.push_str(&escape_pointer_segment(segment));
    }
    path
}

/// Unescape a single path segment per RFC 6901.
///
/// - `~1` → `/`
/// - `~0` → `~`
///
/// Order matters: unescape `~1` first to avoid double-unescaping.
/// Returns `Cow::Borrowed` when no unescaping is needed (the common case).
pub fn unescape_pointer_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains("~0") || segment.contains("~1") {
        Cow::Owned(segment.replace("~1", "/").replace("~0", "~"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Split a JSON Pointer path into decoded segments.
///
/// Strips the leading `#` fragment identifier (if present), splits on `/`,
/// and unescapes each segment per RFC 6901.
///
/// # Example
/// ```
/// use jsonschema_descriptor_core::split_path;
/// assert_eq!(split_path("#/properties/a~1b/items"), vec!["properties", "a/b", "items"]);
/// assert_eq!(split_path("#"), Vec::<String>::new());
/// ```
pub fn split_path(path: &str) -> Vec<String> {
    let stripped = path.strip_prefix('#').unwrap_or(path);

    // An empty fragment ("#" or "") refers to the whole document.
    if stripped.is_empty() {
        return Vec::new();
    }

    let mut segments_iter = stripped.split('/');

    // A leading "/" produces an initial empty segment from split('/') that
    // represents the root — skip it. Subsequent empty segments are significant
    // per RFC 6901 (e.g. "#/" → [""] refers to the empty-string key).
    if stripped.starts_with('/') {
        segments_iter.next();
    }

    segments_iter
        .map(|s| unescape_pointer_segment(s).into_owned())
        .collect()
}

// ---------------------------------------------------------------------------
// Keyword detection
// ---------------------------------------------------------------------------

/// `type` keyword equals the given primitive name.
pub(crate) fn type_is(obj: &Map<String, Value>, name: &str) -> bool {
    obj.get("type").and_then(Value::as_str) == Some(name)
}

/// `type` is `"object"` or `"array"` — the shapes whose emitters handle
/// sibling combinator keywords themselves.
pub(crate) fn has_shaped_type(obj: &Map<String, Value>) -> bool {
    type_is(obj, "object") || type_is(obj, "array")
}

/// OpenAPI-style `nullable: true` flag.
pub(crate) fn is_nullable_flagged(obj: &Map<String, Value>) -> bool {
    obj.get("nullable").and_then(Value::as_bool) == Some(true)
}

/// `type` holds a list of primitive names.
pub(crate) fn is_multi_type(obj: &Map<String, Value>) -> bool {
    obj.get("type").is_some_and(Value::is_array)
}

/// All three conditional keywords are present.
pub(crate) fn is_conditional(obj: &Map<String, Value>) -> bool {
    obj.contains_key("if") && obj.contains_key("then") && obj.contains_key("else")
}

/// Object-shape keywords without an explicit `type` — combinator members of
/// this shape are retagged `type: "object"` before recursing.
pub(crate) fn is_untyped_object_shape(obj: &Map<String, Value>) -> bool {
    !obj.contains_key("type")
        && (obj.contains_key("properties")
            || obj.contains_key("additionalProperties")
            || obj.contains_key("patternProperties"))
}

// ===========================================================================
// Tests
// ===========================================================================
