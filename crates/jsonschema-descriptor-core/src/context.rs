//! Per-call bookkeeping for the dispatcher.
//!
//! A [`RefContext`] lives for exactly one top-level compilation: it carries
//! the identity-keyed seen table (memoization and cycle control), the arena of
//! synthesized schema nodes, and a snapshot of the configuration. It is
//! threaded through the recursion as `&mut` and never shared across calls.

use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use crate::config::{CompileOptions, ParserOverride};
use crate::descriptor::Descriptor;

/// Identity key for a schema node.
///
/// Nodes are compared by address, not by structure: two structurally equal
/// nodes at different positions in the input tree are different schemas.
/// Addresses stay valid because the caller's tree outlives the context and
/// every node fabricated during dispatch is kept alive in the context arena
/// (never recycled within a call).
pub(crate) fn node_id(node: &Value) -> usize {
    node as *const Value as *const () as usize
}

/// Memoization entry for one schema node.
///
/// The entry is inserted *before* the node's children are visited, so a
/// descent that reaches the node again observes `cached: None` and applies
/// the re-entry rules instead of recursing unboundedly.
#[derive(Debug, Default)]
pub(crate) struct Seen {
    /// The finished descriptor, once the computing call has completed.
    pub cached: Option<Descriptor>,
    /// Number of bounded re-entries granted while the node was in flight.
    pub visits: usize,
}

/// Shared state for one top-level compilation.
#[derive(Debug)]
pub struct RefContext {
    pub(crate) seen: HashMap<usize, Seen>,
    /// Arena of synthesized nodes (boolean stand-ins, retagged combinator
    /// members, flag-stripped copies). Holding them here keeps their
    /// identity keys valid for the life of the context.
    held: Vec<Rc<Value>>,
    /// Re-entry budget for in-flight nodes; `None` degrades immediately.
    pub depth_limit: Option<usize>,
    pub suppress_descriptions: bool,
    pub suppress_defaults: bool,
    pub(crate) parser_override: Option<ParserOverride>,
}

impl RefContext {
    pub fn new(options: &CompileOptions) -> Self {
        Self {
            seen: HashMap::new(),
            held: Vec::new(),
            depth_limit: options.depth_limit,
            suppress_descriptions: options.suppress_descriptions,
            suppress_defaults: options.suppress_defaults,
            parser_override: options.parser_override.clone(),
        }
    }

    /// Take ownership of a synthesized schema node for the rest of the call.
    ///
    /// The returned handle is what callers dispatch through; the clone stored
    /// here pins the allocation so its address is never reused for another
    /// node while this context can still look it up.
    pub(crate) fn hold(&mut self, node: Value) -> Rc<Value> {
        let node = Rc::new(node);
        self.held.push(Rc::clone(&node));
        node
    }
}

// ===========================================================================
// Tests
// ===========================================================================
