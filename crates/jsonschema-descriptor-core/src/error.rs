//! Error types for descriptor compilation.
//!
//! Compilation itself never fails: malformed keyword shapes degrade to the
//! accept-anything descriptor. Errors exist only at the outer surfaces that
//! deal with JSON text and component pointers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("no schema component at pointer {pointer}")]
    PointerNotFound { pointer: String },
}
