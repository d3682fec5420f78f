//! The object assembler: descriptors for `type: "object"` nodes.
//!
//! Handles property optionality, the catch-all / strict composition of
//! `additionalProperties`, the refine step for `patternProperties`, and the
//! fusion of sibling combinator keywords into an intersection.

use std::rc::Rc;

use regex::Regex;
use serde_json::{Map, Value};

use crate::context::RefContext;
use crate::descriptor::{Descriptor, Refine, Shape};
use crate::schema_utils::{build_path, is_untyped_object_shape};

use super::combinators::{all_of, any_of, one_of};
use super::dispatch::parse_schema;

type CombinatorEngine = fn(&[&Value], &mut RefContext, &str) -> Descriptor;

/// Combinator keywords an object node can carry as siblings, in fusion
/// order.
const SIBLING_COMBINATORS: [(&str, CombinatorEngine); 3] =
    [("anyOf", any_of), ("oneOf", one_of), ("allOf", all_of)];

/// Compile a `type: "object"` node.
///
/// The declared-shape descriptor is built first; when the node also carries
/// `anyOf`/`oneOf`/`allOf`, each present combinator is compiled and folded in
/// as `{"type": "intersection", "left": <so far>, "right": <combinator>}`,
/// since JSON Schema treats the object keywords and the combinator as
/// independent constraints that must all hold.
pub fn parse_object(obj: &Map<String, Value>, refs: &mut RefContext, path: &str) -> Descriptor {
    let mut output = object_shape(obj, refs, path);

    for (keyword, engine) in SIBLING_COMBINATORS {
        let Some(members) = obj.get(keyword).and_then(Value::as_array) else {
            continue;
        };
        // Members that carry object-shape keywords without a type are
        // retagged as objects on synthesized copies, so nested object
        // detection applies to them consistently. The copies live in the
        // context arena; the caller's nodes are never touched.
        let held: Vec<Option<Rc<Value>>> = members
            .iter()
            .map(|member| match member.as_object() {
                Some(map) if is_untyped_object_shape(map) => {
                    let mut copy = map.clone();
                    copy.insert("type".to_string(), Value::String("object".to_string()));
                    Some(refs.hold(Value::Object(copy)))
                }
                _ => None,
            })
            .collect();
        let resolved: Vec<&Value> = members
            .iter()
            .zip(&held)
            .map(|(member, copy)| match copy {
                Some(rc) => &**rc,
                None => member,
            })
            .collect();
        output = Descriptor::intersection(output, engine(&resolved, refs, path));
    }

    output
}

/// The declared shape of the object: properties, catch-all, strictness,
/// refine. Sibling combinators are not this function's concern.
fn object_shape(obj: &Map<String, Value>, refs: &mut RefContext, path: &str) -> Descriptor {
    let declared = obj.get("properties").and_then(Value::as_object);
    if obj.contains_key("properties") && declared.is_none() {
        tracing::debug!(path, "properties keyword is not a mapping, ignoring it");
    }

    let properties = declared.map(|map| {
        parse_properties(map, obj.get("required").and_then(Value::as_array), refs, path)
    });

    let additional = obj
        .get("additionalProperties")
        .map(|node| parse_schema(node, refs, &build_path(path, &["additionalProperties"]), false));

    let patterns = parse_pattern_properties(obj, refs, path);

    match properties {
        Some(properties) if patterns.is_empty() => match additional {
            // additionalProperties: false closes the object instead of
            // typing a catch-all.
            Some(never) if never == Descriptor::never() => Shape::Object {
                properties,
                strict: true,
                catchall: None,
                refine: None,
            }
            .into(),
            Some(catchall) => Shape::Object {
                properties,
                strict: false,
                catchall: Some(Box::new(catchall)),
                refine: None,
            }
            .into(),
            None => Shape::Object {
                properties,
                strict: false,
                catchall: None,
                refine: None,
            }
            .into(),
        },
        Some(properties) => {
            let keys = properties.iter().map(|(key, _)| key.clone()).collect();
            let fallback = additional.clone().map(Box::new);
            let catchall = value_union(&patterns, additional);
            Shape::Object {
                properties,
                strict: false,
                catchall: Some(Box::new(catchall)),
                refine: Some(Refine {
                    keys,
                    patterns,
                    fallback,
                }),
            }
            .into()
        }
        None if patterns.is_empty() => match additional {
            // No declared keys and no extra keys allowed: a closed empty
            // object.
            Some(never) if never == Descriptor::never() => Shape::Object {
                properties: Vec::new(),
                strict: true,
                catchall: None,
                refine: None,
            }
            .into(),
            Some(value) => Shape::Record {
                value: Box::new(value),
                refine: None,
            }
            .into(),
            None => Shape::Record {
                value: Box::new(Descriptor::any()),
                refine: None,
            }
            .into(),
        },
        None => {
            let fallback = additional.clone().map(Box::new);
            let value = value_union(&patterns, additional);
            Shape::Record {
                value: Box::new(value),
                refine: Some(Refine {
                    keys: Vec::new(),
                    patterns,
                    fallback,
                }),
            }
            .into()
        }
    }
}

fn parse_properties(
    map: &Map<String, Value>,
    required: Option<&Vec<Value>>,
    refs: &mut RefContext,
    path: &str,
) -> Vec<(String, Descriptor)> {
    map.iter()
        .map(|(key, sub)| {
            let mut parsed =
                parse_schema(sub, refs, &build_path(path, &["properties", key]), false);
            if is_optional_property(key, sub, required) {
                parsed.meta.is_optional = true;
            }
            (key.clone(), parsed)
        })
        .collect()
}

/// A property is optional unless the node's `required` list names it, or no
/// such list exists and the property schema says `required: true`, or the
/// property carries a default (a defaulted key never has to be supplied).
fn is_optional_property(key: &str, sub: &Value, required: Option<&Vec<Value>>) -> bool {
    if sub.get("default").is_some() {
        return false;
    }
    let explicitly_required = match required {
        Some(names) => names.iter().any(|name| name.as_str() == Some(key)),
        None => sub.get("required").and_then(Value::as_bool) == Some(true),
    };
    !explicitly_required
}

/// Dispatch every `patternProperties` entry in declaration order. An absent,
/// empty or non-mapping keyword yields no entries. Pattern strings are
/// checked against the regex engine here so a bad pattern surfaces in the
/// logs at compile time rather than silently at validation time.
fn parse_pattern_properties(
    obj: &Map<String, Value>,
    refs: &mut RefContext,
    path: &str,
) -> Vec<(String, Descriptor)> {
    let map = match obj.get("patternProperties").and_then(Value::as_object) {
        Some(map) if !map.is_empty() => map,
        _ => return Vec::new(),
    };
    map.iter()
        .map(|(pattern, sub)| {
            if let Err(error) = Regex::new(pattern) {
                tracing::warn!(pattern, error = %error, "patternProperties pattern is not a valid regex");
            }
            let parsed = parse_schema(
                sub,
                refs,
                &build_path(path, &["patternProperties", pattern]),
                false,
            );
            (pattern.clone(), parsed)
        })
        .collect()
}

/// The value type covering undeclared keys: the union of every pattern
/// descriptor plus the `additionalProperties` descriptor, except that a
/// single pattern with no catch-all stands alone.
fn value_union(patterns: &[(String, Descriptor)], additional: Option<Descriptor>) -> Descriptor {
    let mut options: Vec<Descriptor> = patterns.iter().map(|(_, parsed)| parsed.clone()).collect();
    options.extend(additional);
    if options.len() == 1 {
        options.remove(0)
    } else {
        Shape::Union {
            options,
            exclusive: false,
        }
        .into()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompileOptions;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn run(schema: &Value) -> String {
        let obj = schema.as_object().expect("object fixture");
        let mut refs = RefContext::new(&CompileOptions::default());
        parse_object(obj, &mut refs, "#").to_string()
    }

    // Test 1: properties without a required list are all optional
    #[test]
    fn test_properties_optional_by_default() {
        let schema = json!({
            "type": "object",
            "properties": { "a": { "type": "string" } }
        });
        assert_eq!(
            run(&schema),
            r#"{"type": "object", "properties": {"a": {"type": "string", "isOptional": true}}}"#
        );
    }

    // Test 2: a required list removes the optional marker for its names only
    #[test]
    fn test_required_list() {
        let schema = json!({
            "type": "object",
            "properties": {
                "a": { "type": "string" },
                "b": { "type": "number" }
            },
            "required": ["a"]
        });
        assert_eq!(
            run(&schema),
            r#"{"type": "object", "properties": {"a": {"type": "string"}, "b": {"type": "number", "isOptional": true}}}"#
        );
    }

    // Test 3: without a required list, required: true on the property
    // schema itself counts
    #[test]
    fn test_property_level_required_flag() {
        let schema = json!({
            "type": "object",
            "properties": { "a": { "type": "string", "required": true } }
        });
        assert_eq!(
            run(&schema),
            r#"{"type": "object", "properties": {"a": {"type": "string"}}}"#
        );
    }

    // Test 4: a required list overrides property-level flags entirely
    #[test]
    fn test_required_list_overrides_property_flag() {
        let schema = json!({
            "type": "object",
            "properties": { "a": { "type": "string", "required": true } },
            "required": ["b"]
        });
        assert_eq!(
            run(&schema),
            r#"{"type": "object", "properties": {"a": {"type": "string", "isOptional": true}}}"#
        );
    }

    // Test 5: a default makes a property non-optional and rides along
    #[test]
    fn test_default_implies_supplied() {
        let schema = json!({
            "type": "object",
            "properties": { "a": { "type": "string", "default": "x" } }
        });
        assert_eq!(
            run(&schema),
            r#"{"type": "object", "properties": {"a": {"type": "string", "defaultValue": "x"}}}"#
        );
    }

    // Test 6: property emission order is declaration order, not sorted
    #[test]
    fn test_declaration_order() {
        let schema = json!({
            "type": "object",
            "properties": {
                "zulu": { "type": "string" },
                "alpha": { "type": "number" }
            },
            "required": ["zulu", "alpha"]
        });
        assert_eq!(
            run(&schema),
            r#"{"type": "object", "properties": {"zulu": {"type": "string"}, "alpha": {"type": "number"}}}"#
        );
    }

    // Test 7: an empty properties mapping still emits the object form
    #[test]
    fn test_empty_properties_mapping() {
        let schema = json!({ "type": "object", "properties": {} });
        assert_eq!(run(&schema), r#"{"type": "object", "properties": {}}"#);
    }

    // Test 8: additionalProperties: false closes the object
    #[test]
    fn test_additional_properties_false_is_strict() {
        let schema = json!({
            "type": "object",
            "properties": { "a": { "type": "string" } },
            "required": ["a"],
            "additionalProperties": false
        });
        assert_eq!(
            run(&schema),
            r#"{"type": "object", "properties": {"a": {"type": "string"}}, "unknownKeys": "strict"}"#
        );
    }

    // Test 9: a schema-valued additionalProperties becomes the catch-all
    #[test]
    fn test_additional_properties_catchall() {
        let schema = json!({
            "type": "object",
            "properties": { "a": { "type": "string" } },
            "required": ["a"],
            "additionalProperties": { "type": "number" }
        });
        assert_eq!(
            run(&schema),
            r#"{"type": "object", "properties": {"a": {"type": "string"}}, "catchall": {"type": "number"}}"#
        );
    }

    // Test 10: additionalProperties: true is an accept-anything catch-all,
    // not strictness
    #[test]
    fn test_additional_properties_true() {
        let schema = json!({
            "type": "object",
            "properties": { "a": { "type": "string" } },
            "required": ["a"],
            "additionalProperties": true
        });
        assert_eq!(
            run(&schema),
            r#"{"type": "object", "properties": {"a": {"type": "string"}}, "catchall": {"type": "any"}}"#
        );
    }

    // Test 11: properties plus one pattern, no catch-all: the pattern
    // descriptor stands alone, and the refine skips declared keys
    #[test]
    fn test_properties_with_single_pattern() {
        let schema = json!({
            "type": "object",
            "properties": { "id": { "type": "string" } },
            "required": ["id"],
            "patternProperties": { "^x-": { "type": "number" } }
        });
        assert_eq!(
            run(&schema),
            r#"{"type": "object", "properties": {"id": {"type": "string"}}, "catchall": {"type": "number"}, "refine": {"keys": ["id"], "patterns": [{"pattern": "^x-", "schema": {"type": "number"}}]}}"#
        );
    }

    // Test 12: several patterns union in declaration order
    #[test]
    fn test_properties_with_several_patterns() {
        let schema = json!({
            "type": "object",
            "properties": { "id": { "type": "string" } },
            "required": ["id"],
            "patternProperties": {
                "^x-": { "type": "number" },
                "^y-": { "type": "boolean" }
            }
        });
        assert_eq!(
            run(&schema),
            r#"{"type": "object", "properties": {"id": {"type": "string"}}, "catchall": {"type": "union", "options": [{"type": "number"}, {"type": "boolean"}]}, "refine": {"keys": ["id"], "patterns": [{"pattern": "^x-", "schema": {"type": "number"}}, {"pattern": "^y-", "schema": {"type": "boolean"}}]}}"#
        );
    }

    // Test 13: additionalProperties joins the pattern union and becomes the
    // refine fallback, even as the never descriptor
    #[test]
    fn test_patterns_with_additional_properties() {
        let schema = json!({
            "type": "object",
            "properties": { "id": { "type": "string" } },
            "required": ["id"],
            "patternProperties": { "^x-": { "type": "number" } },
            "additionalProperties": false
        });
        assert_eq!(
            run(&schema),
            r#"{"type": "object", "properties": {"id": {"type": "string"}}, "catchall": {"type": "union", "options": [{"type": "number"}, {"type": "never"}]}, "refine": {"keys": ["id"], "patterns": [{"pattern": "^x-", "schema": {"type": "number"}}], "fallback": {"type": "never"}}}"#
        );
    }

    // Test 14: one pattern and no properties: record over the pattern's
    // descriptor directly, no union wrapper
    #[test]
    fn test_record_single_pattern() {
        let schema = json!({
            "type": "object",
            "patternProperties": { "^a": { "type": "string" } }
        });
        assert_eq!(
            run(&schema),
            r#"{"type": "record", "key": {"type": "string"}, "value": {"type": "string"}, "refine": {"patterns": [{"pattern": "^a", "schema": {"type": "string"}}]}}"#
        );
    }

    // Test 15: several patterns and no properties: record over their union
    #[test]
    fn test_record_pattern_union() {
        let schema = json!({
            "type": "object",
            "patternProperties": {
                "^a": { "type": "string" },
                "^b": { "type": "number" }
            },
            "additionalProperties": { "type": "null" }
        });
        assert_eq!(
            run(&schema),
            r#"{"type": "record", "key": {"type": "string"}, "value": {"type": "union", "options": [{"type": "string"}, {"type": "number"}, {"type": "null"}]}, "refine": {"patterns": [{"pattern": "^a", "schema": {"type": "string"}}, {"pattern": "^b", "schema": {"type": "number"}}], "fallback": {"type": "null"}}}"#
        );
    }

    // Test 16: no properties and additionalProperties: false is a closed
    // empty object
    #[test]
    fn test_closed_empty_object() {
        let schema = json!({ "type": "object", "additionalProperties": false });
        assert_eq!(
            run(&schema),
            r#"{"type": "object", "properties": {}, "unknownKeys": "strict"}"#
        );
    }

    // Test 17: additionalProperties alone types an open record
    #[test]
    fn test_record_of_additional() {
        let schema = json!({ "type": "object", "additionalProperties": { "type": "boolean" } });
        assert_eq!(
            run(&schema),
            r#"{"type": "record", "key": {"type": "string"}, "value": {"type": "boolean"}}"#
        );
    }

    // Test 18: no rules at all accepts any mapping
    #[test]
    fn test_bare_object() {
        let schema = json!({ "type": "object" });
        assert_eq!(
            run(&schema),
            r#"{"type": "record", "key": {"type": "string"}, "value": {"type": "any"}}"#
        );
    }

    // Test 19: an empty patternProperties mapping is treated as absent
    #[test]
    fn test_empty_pattern_properties() {
        let schema = json!({ "type": "object", "patternProperties": {} });
        assert_eq!(
            run(&schema),
            r#"{"type": "record", "key": {"type": "string"}, "value": {"type": "any"}}"#
        );
    }

    // Test 20: an invalid regex pattern still emits its rule
    #[test]
    fn test_invalid_pattern_still_emits() {
        let schema = json!({
            "type": "object",
            "patternProperties": { "(unclosed": { "type": "string" } }
        });
        assert_eq!(
            run(&schema),
            r#"{"type": "record", "key": {"type": "string"}, "value": {"type": "string"}, "refine": {"patterns": [{"pattern": "(unclosed", "schema": {"type": "string"}}]}}"#
        );
    }

    // Test 21: a sibling anyOf intersects with the object shape, and
    // untyped object fragments inside it are retagged as objects
    #[test]
    fn test_sibling_any_of_with_retag() {
        let schema = json!({
            "type": "object",
            "properties": { "a": { "type": "string" } },
            "required": ["a"],
            "anyOf": [
                { "properties": { "b": { "type": "number" } }, "required": ["b"] },
                { "type": "null" }
            ]
        });
        assert_eq!(
            run(&schema),
            r#"{"type": "intersection", "left": {"type": "object", "properties": {"a": {"type": "string"}}}, "right": {"type": "union", "options": [{"type": "object", "properties": {"b": {"type": "number"}}}, {"type": "null"}]}}"#
        );
    }

    // Test 22: several sibling combinators fold left to right
    #[test]
    fn test_sibling_combinators_fold() {
        let schema = json!({
            "type": "object",
            "properties": {},
            "anyOf": [{ "type": "string" }],
            "oneOf": [{ "type": "number" }],
            "allOf": [{ "type": "boolean" }]
        });
        assert_eq!(
            run(&schema),
            r#"{"type": "intersection", "left": {"type": "intersection", "left": {"type": "intersection", "left": {"type": "object", "properties": {}}, "right": {"type": "string"}}, "right": {"type": "number"}}, "right": {"type": "boolean"}}"#
        );
    }

    // Test 23: a boolean property schema is accepted as-is
    #[test]
    fn test_boolean_property_schema() {
        let schema = json!({
            "type": "object",
            "properties": { "free": true },
            "required": ["free"]
        });
        assert_eq!(
            run(&schema),
            r#"{"type": "object", "properties": {"free": {"type": "any"}}}"#
        );
    }

    // Test 24: a malformed properties keyword degrades to the record form
    #[test]
    fn test_malformed_properties_keyword() {
        let schema = json!({ "type": "object", "properties": "oops" });
        assert_eq!(
            run(&schema),
            r#"{"type": "record", "key": {"type": "string"}, "value": {"type": "any"}}"#
        );
    }
}
