//! The structured descriptor value and its text serializer.
//!
//! Emitters build [`Descriptor`] values; nothing in the pipeline concatenates
//! descriptor text by hand. The micro-grammar form
//! `{"type": <kind>, <kind fields>, <annotations>}` is produced in one place,
//! by the [`Display`](fmt::Display) impl, so every non-raw descriptor is
//! guaranteed to be well-formed JSON.

use std::fmt;

use serde_json::{Number, Value};

/// One validator expression: a shape plus the annotations the dispatcher
/// appends (`description`, `defaultValue`, `readonly`, `isOptional`).
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    pub(crate) shape: Shape,
    pub(crate) meta: Annotations,
}

/// Kind-specific payload of a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Shape {
    Any,
    Never,
    Boolean,
    Null,
    String {
        min_length: Option<u64>,
        max_length: Option<u64>,
        pattern: Option<String>,
        format: Option<String>,
    },
    Number {
        int: bool,
        minimum: Option<Number>,
        exclusive_minimum: Option<Number>,
        maximum: Option<Number>,
        exclusive_maximum: Option<Number>,
        multiple_of: Option<Number>,
    },
    Literal {
        value: Value,
    },
    Enum {
        values: Vec<Value>,
    },
    Array {
        element: Box<Descriptor>,
        min_length: Option<u64>,
        max_length: Option<u64>,
    },
    Tuple {
        items: Vec<Descriptor>,
    },
    Object {
        properties: Vec<(String, Descriptor)>,
        strict: bool,
        catchall: Option<Box<Descriptor>>,
        refine: Option<Refine>,
    },
    Record {
        value: Box<Descriptor>,
        refine: Option<Refine>,
    },
    Union {
        options: Vec<Descriptor>,
        exclusive: bool,
    },
    Intersection {
        left: Box<Descriptor>,
        right: Box<Descriptor>,
    },
    Nullable {
        inner: Box<Descriptor>,
    },
    Not {
        schema: Box<Descriptor>,
    },
    Conditional {
        when: Box<Descriptor>,
        then: Box<Descriptor>,
        otherwise: Box<Descriptor>,
    },
    /// Verbatim text from an override hook. Emitted unchanged, never
    /// annotated.
    Raw(String),
}

/// Fields the dispatcher appends after an emitter has produced the shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Annotations {
    pub description: Option<String>,
    pub default_value: Option<Value>,
    pub readonly: bool,
    pub is_optional: bool,
}

/// Structured post-validation data for pattern-property objects: the executing
/// validator skips `keys`, tries `patterns` in order (first match wins), and
/// falls back to `fallback` for keys no pattern matched.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Refine {
    pub keys: Vec<String>,
    pub patterns: Vec<(String, Descriptor)>,
    pub fallback: Option<Box<Descriptor>>,
}

impl Descriptor {
    /// The accept-anything descriptor, `{"type": "any"}`.
    pub fn any() -> Self {
        Shape::Any.into()
    }

    /// The accept-nothing descriptor, `{"type": "never"}`.
    pub fn never() -> Self {
        Shape::Never.into()
    }

    pub(crate) fn raw(text: String) -> Self {
        Shape::Raw(text).into()
    }

    pub(crate) fn intersection(left: Descriptor, right: Descriptor) -> Self {
        Shape::Intersection {
            left: Box::new(left),
            right: Box::new(right),
        }
        .into()
    }
}

impl From<Shape> for Descriptor {
    fn from(shape: Shape) -> Self {
        Self {
            shape,
            meta: Annotations::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

/// Write a JSON-encoded value (compact form) into a formatter.
fn write_json(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    let encoded = serde_json::to_string(value).map_err(|_| fmt::Error)?;
    f.write_str(&encoded)
}

/// Write a JSON string literal (quoted, escaped) into a formatter.
fn write_json_str(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    let encoded = serde_json::to_string(text).map_err(|_| fmt::Error)?;
    f.write_str(&encoded)
}

fn write_refine(f: &mut fmt::Formatter<'_>, refine: &Refine) -> fmt::Result {
    f.write_str(", \"refine\": {")?;
    if !refine.keys.is_empty() {
        f.write_str("\"keys\": [")?;
        for (i, key) in refine.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write_json_str(f, key)?;
        }
        f.write_str("], ")?;
    }
    f.write_str("\"patterns\": [")?;
    for (i, (pattern, schema)) in refine.patterns.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        f.write_str("{\"pattern\": ")?;
        write_json_str(f, pattern)?;
        write!(f, ", \"schema\": {schema}}}")?;
    }
    f.write_str("]")?;
    if let Some(fallback) = &refine.fallback {
        write!(f, ", \"fallback\": {fallback}")?;
    }
    f.write_str("}")
}

impl Shape {
    /// Write the `"type": <kind>` field and the kind-specific fields, without
    /// the enclosing braces.
    fn write_fields(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Any => f.write_str("\"type\": \"any\""),
            Shape::Never => f.write_str("\"type\": \"never\""),
            Shape::Boolean => f.write_str("\"type\": \"boolean\""),
            Shape::Null => f.write_str("\"type\": \"null\""),
            Shape::String {
                min_length,
                max_length,
                pattern,
                format,
            } => {
                f.write_str("\"type\": \"string\"")?;
                if let Some(min) = min_length {
                    write!(f, ", \"minLength\": {min}")?;
                }
                if let Some(max) = max_length {
                    write!(f, ", \"maxLength\": {max}")?;
                }
                if let Some(pattern) = pattern {
                    f.write_str(", \"pattern\": ")?;
                    write_json_str(f, pattern)?;
                }
                if let Some(format) = format {
                    f.write_str(", \"format\": ")?;
                    write_json_str(f, format)?;
                }
                Ok(())
            }
            Shape::Number {
                int,
                minimum,
                exclusive_minimum,
                maximum,
                exclusive_maximum,
                multiple_of,
            } => {
                f.write_str("\"type\": \"number\"")?;
                if *int {
                    f.write_str(", \"int\": true")?;
                }
                if let Some(n) = minimum {
                    write!(f, ", \"minimum\": {n}")?;
                }
                if let Some(n) = exclusive_minimum {
                    write!(f, ", \"exclusiveMinimum\": {n}")?;
                }
                if let Some(n) = maximum {
                    write!(f, ", \"maximum\": {n}")?;
                }
                if let Some(n) = exclusive_maximum {
                    write!(f, ", \"exclusiveMaximum\": {n}")?;
                }
                if let Some(n) = multiple_of {
                    write!(f, ", \"multipleOf\": {n}")?;
                }
                Ok(())
            }
            Shape::Literal { value } => {
                f.write_str("\"type\": \"literal\", \"value\": ")?;
                write_json(f, value)
            }
            Shape::Enum { values } => {
                f.write_str("\"type\": \"enum\", \"values\": [")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_json(f, value)?;
                }
                f.write_str("]")
            }
            Shape::Array {
                element,
                min_length,
                max_length,
            } => {
                write!(f, "\"type\": \"array\", \"element\": {element}")?;
                if let Some(min) = min_length {
                    write!(f, ", \"minLength\": {min}")?;
                }
                if let Some(max) = max_length {
                    write!(f, ", \"maxLength\": {max}")?;
                }
                Ok(())
            }
            Shape::Tuple { items } => {
                // Tuple items are joined with a bare comma, unlike every
                // other list in the grammar.
                f.write_str("\"type\": \"tuple\", \"items\": [")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Shape::Object {
                properties,
                strict,
                catchall,
                refine,
            } => {
                f.write_str("\"type\": \"object\", \"properties\": {")?;
                for (i, (key, prop)) in properties.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_json_str(f, key)?;
                    write!(f, ": {prop}")?;
                }
                f.write_str("}")?;
                if *strict {
                    f.write_str(", \"unknownKeys\": \"strict\"")?;
                } else if let Some(catchall) = catchall {
                    write!(f, ", \"catchall\": {catchall}")?;
                }
                if let Some(refine) = refine {
                    write_refine(f, refine)?;
                }
                Ok(())
            }
            Shape::Record { value, refine } => {
                write!(
                    f,
                    "\"type\": \"record\", \"key\": {{\"type\": \"string\"}}, \"value\": {value}"
                )?;
                if let Some(refine) = refine {
                    write_refine(f, refine)?;
                }
                Ok(())
            }
            Shape::Union { options, exclusive } => {
                f.write_str("\"type\": \"union\", \"options\": [")?;
                for (i, option) in options.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{option}")?;
                }
                f.write_str("]")?;
                if *exclusive {
                    f.write_str(", \"exclusive\": true")?;
                }
                Ok(())
            }
            Shape::Intersection { left, right } => {
                write!(f, "\"type\": \"intersection\", \"left\": {left}, \"right\": {right}")
            }
            Shape::Nullable { inner } => {
                write!(f, "\"type\": \"nullable\", \"inner\": {inner}")
            }
            Shape::Not { schema } => {
                write!(f, "\"type\": \"not\", \"schema\": {schema}")
            }
            Shape::Conditional {
                when,
                then,
                otherwise,
            } => {
                write!(
                    f,
                    "\"type\": \"conditional\", \"if\": {when}, \"then\": {then}, \"else\": {otherwise}"
                )
            }
            Shape::Raw(_) => Ok(()),
        }
    }
}

impl Annotations {
    fn write_fields(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(description) = &self.description {
            f.write_str(", \"description\": ")?;
            write_json_str(f, description)?;
        }
        if let Some(default) = &self.default_value {
            f.write_str(", \"defaultValue\": ")?;
            write_json(f, default)?;
        }
        if self.readonly {
            f.write_str(", \"readonly\": true")?;
        }
        if self.is_optional {
            f.write_str(", \"isOptional\": true")?;
        }
        Ok(())
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Shape::Raw(text) = &self.shape {
            return f.write_str(text);
        }
        f.write_str("{")?;
        self.shape.write_fields(f)?;
        self.meta.write_fields(f)?;
        f.write_str("}")
    }
}

// ===========================================================================
// Tests
// ===========================================================================
