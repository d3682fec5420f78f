//! Configuration for descriptor compilation.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::RefContext;

/// Signature of an override hook: `(node, context, current path)` → optional
/// descriptor text.
pub type OverrideFn = dyn Fn(&Value, &mut RefContext, &str) -> Option<String> + Send + Sync;

/// A per-node override hook, consulted before normal dispatch.
///
/// When the hook returns `Some(text)`, that text is emitted verbatim for the
/// node — no emitter selection, no memoization, no annotations. Returning
/// `None` declines the node and dispatch proceeds normally. The hook receives
/// the mutable [`RefContext`], so it may re-enter
/// [`parse_schema`](crate::parse_schema) — this is how `$ref` targets with
/// shared identity are fed back through the compiler (see
/// [`ref_resolving_override`](crate::ref_resolving_override)).
#[derive(Clone)]
pub struct ParserOverride(Arc<OverrideFn>);

impl ParserOverride {
    pub fn new<F>(hook: F) -> Self
    where
        F: Fn(&Value, &mut RefContext, &str) -> Option<String> + Send + Sync + 'static,
    {
        Self(Arc::new(hook))
    }

    pub fn call(&self, node: &Value, refs: &mut RefContext, path: &str) -> Option<String> {
        (self.0)(node, refs, path)
    }
}

impl fmt::Debug for ParserOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ParserOverride(..)")
    }
}

/// Options for descriptor compilation.
///
/// ## Serialization Format
///
/// Data fields are serialized in `kebab-case` (e.g., `depth-limit`). The
/// override hook is a runtime-only extension point and is never serialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CompileOptions {
    /// Re-entry budget for a node that is reached again while its descriptor
    /// is still being computed. `Some(k)` unrolls such a cycle `k` times
    /// before degrading to the accept-anything descriptor; `None` degrades on
    /// the first re-entry.
    pub depth_limit: Option<usize>,
    /// Drop `description` annotations from the output.
    pub suppress_descriptions: bool,
    /// Drop `defaultValue` annotations from the output.
    pub suppress_defaults: bool,
    /// Per-node override hook. Default: none.
    #[serde(skip)]
    pub parser_override: Option<ParserOverride>,
}
