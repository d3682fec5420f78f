//! The schema-dispatch engine.
//!
//! [`parse_schema`] is the entry point for every node; it selects one of the
//! specialized emitters in this module by keyword priority. The combinator
//! engine and the object assembler recurse back through [`parse_schema`] for
//! their sub-schemas; the leaf emitters are one-shot mappings.

mod array;
mod combinators;
mod dispatch;
mod object;
mod primitives;
mod wrappers;

pub use combinators::{parse_all_of, parse_any_of, parse_one_of};
pub use dispatch::parse_schema;
pub use object::parse_object;
