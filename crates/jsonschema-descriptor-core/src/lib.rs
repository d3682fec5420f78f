//! Compile JSON Schema documents into textual runtime-validator descriptors.
//!
//! The compiler is a recursive tree transformer, not a validator: it walks a
//! schema and emits one self-contained descriptor expression in a small JSON
//! micro-grammar, suitable for driving a downstream validator runtime. Its
//! two load-bearing pieces are
//!
//! - termination-safe descent over possibly self-referential schema graphs,
//!   via identity-keyed memoization and an optional re-entry budget, and
//! - combinator composition: `allOf`/`anyOf`/`oneOf`, object shapes with
//!   pattern/additional properties, and their fusion under JSON Schema's
//!   "all constraints apply simultaneously" semantics.
//!
//! `$ref` resolution is deliberately not part of the core. Callers
//! pre-resolve references into shared node identities, typically by
//! installing [`ref_resolving_override`] (which [`compile_pointer`] does for
//! you).
//!
//! ## Usage
//!
//! ```rust
//! use jsonschema_descriptor_core::{compile, CompileOptions};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": { "name": { "type": "string" } },
//!     "required": ["name"]
//! });
//! let descriptor = compile(&schema, &CompileOptions::default());
//! assert_eq!(
//!     descriptor,
//!     r#"{"type": "object", "properties": {"name": {"type": "string"}}}"#
//! );
//! ```

mod config;
mod context;
mod descriptor;
mod error;
mod parsers;
mod resolver;
mod schema_utils;

use std::sync::Arc;

use serde_json::Value;

pub use config::{CompileOptions, OverrideFn, ParserOverride};
pub use context::RefContext;
pub use descriptor::Descriptor;
pub use error::CompileError;
pub use parsers::{parse_all_of, parse_any_of, parse_object, parse_one_of, parse_schema};
pub use resolver::{list_components, ref_resolving_override, resolve_pointer};
pub use schema_utils::{build_path, escape_pointer_segment, split_path, unescape_pointer_segment};

/// Compile a schema document into its descriptor text.
///
/// This never fails: malformed constructs degrade to accept-anything per the
/// dispatcher's rules, and the result is always one syntactically complete
/// descriptor.
pub fn compile(schema: &Value, options: &CompileOptions) -> String {
    let mut refs = RefContext::new(options);
    parsers::parse_schema(schema, &mut refs, "#", false).to_string()
}

/// Compile a schema supplied as JSON text.
pub fn compile_str(schema_json: &str, options: &CompileOptions) -> Result<String, CompileError> {
    let schema: Value = serde_json::from_str(schema_json)?;
    Ok(compile(&schema, options))
}

/// Compile one component of a document, identified by JSON Pointer, with
/// local `$ref`s resolved against the whole document.
///
/// The document is cloned into shared ownership and
/// [`ref_resolving_override`] is installed for it; a hook already present in
/// `options` keeps precedence and the ref hook only sees nodes the
/// configured hook declined.
pub fn compile_pointer(
    document: &Value,
    pointer: &str,
    options: &CompileOptions,
) -> Result<String, CompileError> {
    let document = Arc::new(document.clone());
    let target =
        resolve_pointer(&document, pointer).ok_or_else(|| CompileError::PointerNotFound {
            pointer: pointer.to_string(),
        })?;

    let ref_hook = ref_resolving_override(document.clone());
    let hook = match options.parser_override.clone() {
        Some(configured) => ParserOverride::new(move |node, refs, path| {
            configured
                .call(node, refs, path)
                .or_else(|| ref_hook.call(node, refs, path))
        }),
        None => ref_hook,
    };
    let options = CompileOptions {
        parser_override: Some(hook),
        ..options.clone()
    };

    let root_path = if pointer.starts_with('#') {
        pointer.to_string()
    } else {
        format!("#{pointer}")
    };
    let mut refs = RefContext::new(&options);
    Ok(parsers::parse_schema(target, &mut refs, &root_path, false).to_string())
}
