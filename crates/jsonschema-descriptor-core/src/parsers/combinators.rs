//! Intersection and union trees for `allOf`, `anyOf` and `oneOf`.
//!
//! `anyOf`/`oneOf` map member-for-member onto a union descriptor. `allOf` is
//! lowered into a balanced binary tree of pairwise intersections, because the
//! descriptor grammar only expresses intersection two at a time; balancing
//! keeps recursion depth logarithmic in the member count.

use std::rc::Rc;

use serde_json::{json, Value};

use crate::context::RefContext;
use crate::descriptor::{Descriptor, Shape};
use crate::schema_utils::build_path;

use super::dispatch::parse_schema;

/// Compile an `allOf` member list into an intersection descriptor.
///
/// No members is unsatisfiable here and yields the accept-nothing
/// descriptor; a single member compiles exactly as if dispatched directly.
pub fn parse_all_of(members: &[Value], refs: &mut RefContext, path: &str) -> Descriptor {
    let members: Vec<&Value> = members.iter().collect();
    all_of(&members, refs, path)
}

/// Compile an `anyOf` member list into a union descriptor.
pub fn parse_any_of(members: &[Value], refs: &mut RefContext, path: &str) -> Descriptor {
    let members: Vec<&Value> = members.iter().collect();
    any_of(&members, refs, path)
}

/// Compile a `oneOf` member list into an exclusive union descriptor.
pub fn parse_one_of(members: &[Value], refs: &mut RefContext, path: &str) -> Descriptor {
    let members: Vec<&Value> = members.iter().collect();
    one_of(&members, refs, path)
}

pub(crate) fn all_of(members: &[&Value], refs: &mut RefContext, path: &str) -> Descriptor {
    match members {
        [] => Descriptor::never(),
        [only] => parse_schema(only, refs, &build_path(path, &["allOf", "0"]), false),
        _ => {
            // Boolean members become object-shaped stand-ins so the halves
            // compose uniformly. The stand-ins are pinned in the context:
            // the seen table is keyed by address, and a freed allocation
            // could hand its address to an unrelated node.
            let held: Vec<Option<Rc<Value>>> = members
                .iter()
                .map(|member| match member {
                    Value::Bool(true) => Some(refs.hold(json!({}))),
                    Value::Bool(false) => Some(refs.hold(json!({ "not": {} }))),
                    _ => None,
                })
                .collect();
            let indexed: Vec<(usize, &Value)> = members
                .iter()
                .zip(&held)
                .enumerate()
                .map(|(ordinal, (member, stand_in))| match stand_in {
                    Some(rc) => (ordinal, &**rc),
                    None => (ordinal, *member),
                })
                .collect();
            reduce_intersection(&indexed, refs, path)
        }
    }
}

/// Halve-and-recurse reduction over members paired with their original
/// ordinal, so the diagnostic path reports each leaf's position in the
/// member list as written, not its position inside some half.
fn reduce_intersection(
    members: &[(usize, &Value)],
    refs: &mut RefContext,
    path: &str,
) -> Descriptor {
    match members {
        [] => Descriptor::never(),
        [(ordinal, member)] => parse_schema(
            member,
            refs,
            &build_path(path, &["allOf", &ordinal.to_string()]),
            false,
        ),
        _ => {
            // Equal halves, the left one taking the extra member when odd.
            let (left, right) = members.split_at(members.len().div_ceil(2));
            Descriptor::intersection(
                reduce_intersection(left, refs, path),
                reduce_intersection(right, refs, path),
            )
        }
    }
}

pub(crate) fn any_of(members: &[&Value], refs: &mut RefContext, path: &str) -> Descriptor {
    union_of(members, "anyOf", false, refs, path)
}

pub(crate) fn one_of(members: &[&Value], refs: &mut RefContext, path: &str) -> Descriptor {
    union_of(members, "oneOf", true, refs, path)
}

/// Shared body of `anyOf` and `oneOf`: an empty member list accepts
/// anything, one member dispatches directly, two or more become a union.
/// `oneOf` additionally marks the union exclusive so the executing validator
/// rejects values matching more than one option.
fn union_of(
    members: &[&Value],
    keyword: &str,
    exclusive: bool,
    refs: &mut RefContext,
    path: &str,
) -> Descriptor {
    match members {
        [] => Descriptor::any(),
        [only] => parse_schema(only, refs, &build_path(path, &[keyword, "0"]), false),
        _ => {
            let options = members
                .iter()
                .enumerate()
                .map(|(i, member)| {
                    parse_schema(
                        member,
                        refs,
                        &build_path(path, &[keyword, &i.to_string()]),
                        false,
                    )
                })
                .collect();
            Shape::Union { options, exclusive }.into()
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
