//! The **type algebra** both schema producers understand.
//!
//! A [`Type`] is what the host hands us: either the static type of a
//! declaration (build time) or the type behind a runtime descriptor. The set
//! of shapes is closed; anything the host cannot express with the regular
//! variants arrives as [`Type::Other`] and fails synthesis with a message
//! naming it.
//!
//! ```rust
//! use artificial_core::types::{Primitive, Type};
//!
//! let tags = Type::array(Type::Primitive(Primitive::String));
//! assert_eq!(tags.to_string(), "string[]");
//! ```
use std::fmt::{self, Display};

use indexmap::IndexMap;
use serde_json::Value;

/// Module namespace whose annotations carry a precomputed schema.
pub const SCHEMA_ANNOTATION_NAMESPACE: &str = "ballerina/ai";

/// Identifier of the schema annotation inside [`SCHEMA_ANNOTATION_NAMESPACE`].
pub const SCHEMA_ANNOTATION_IDENTIFIER: &str = "JsonSchema";

/// Ordered key → value metadata attached to a named type.
pub type Metadata = IndexMap<String, Value>;

/// Ordered record fields.
pub type Fields = IndexMap<String, Type>;

/// Scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Boolean,
    Integer,
    Float,
    Decimal,
    String,
    Byte,
    Null,
}

impl Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Boolean => write!(f, "boolean"),
            Primitive::Integer => write!(f, "int"),
            Primitive::Float => write!(f, "float"),
            Primitive::Decimal => write!(f, "decimal"),
            Primitive::String => write!(f, "string"),
            Primitive::Byte => write!(f, "byte"),
            Primitive::Null => write!(f, "()"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Primitive(Primitive),
    /// Any JSON value.
    Json,
    Array(Box<Type>),
    /// Members in declaration order.
    Union(Vec<Type>),
    /// Anonymous record. Only the build-time synthesizer expands it.
    Record(Fields),
    Named(NamedType),
    /// The host's error type.
    Error,
    /// Any shape outside the algebra, carried by name for diagnostics.
    Other { name: String },
}

impl Type {
    pub fn array(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    pub fn union(members: impl IntoIterator<Item = Type>) -> Self {
        Type::Union(members.into_iter().collect())
    }

    pub fn record<K: Into<String>>(fields: impl IntoIterator<Item = (K, Type)>) -> Self {
        Type::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn other(name: impl Into<String>) -> Self {
        Type::Other { name: name.into() }
    }

    /// `T?` shorthand: `T | ()`.
    pub fn optional(inner: Type) -> Self {
        Type::Union(vec![inner, Type::Primitive(Primitive::Null)])
    }

    /// Follow named references down to the first structural shape.
    pub fn implied(&self) -> &Type {
        let mut current = self;
        while let Type::Named(named) = current {
            current = &named.referred;
        }
        current
    }

    /// Whether this type is the error type, possibly behind names.
    pub fn is_error(&self) -> bool {
        matches!(self.implied(), Type::Error)
    }

    /// Whether `()` is a member of this type.
    pub fn is_nilable(&self) -> bool {
        match self.implied() {
            Type::Primitive(Primitive::Null) | Type::Json => true,
            Type::Union(members) => members.iter().any(Type::is_nilable),
            _ => false,
        }
    }

    pub fn as_named(&self) -> Option<&NamedType> {
        match self {
            Type::Named(named) => Some(named),
            _ => None,
        }
    }
}

impl From<Primitive> for Type {
    fn from(value: Primitive) -> Self {
        Type::Primitive(value)
    }
}

impl From<NamedType> for Type {
    fn from(value: NamedType) -> Self {
        Type::Named(value)
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(primitive) => write!(f, "{primitive}"),
            Type::Json => write!(f, "json"),
            Type::Array(element) => match element.as_ref() {
                Type::Union(members) if members.len() > 1 => write!(f, "({element})[]"),
                _ => write!(f, "{element}[]"),
            },
            Type::Union(members) if members.is_empty() => write!(f, "never"),
            Type::Union(members) => {
                for (idx, member) in members.iter().enumerate() {
                    if idx > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
            Type::Record(fields) => {
                write!(f, "record {{")?;
                for (name, ty) in fields {
                    write!(f, " {ty} {name};")?;
                }
                write!(f, " }}")
            }
            Type::Named(named) => write!(f, "{}", named.identifier),
            Type::Error => write!(f, "error"),
            Type::Other { name } => write!(f, "{name}"),
        }
    }
}

/// A reference to a declared type, together with whatever metadata the
/// declaration carries.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedType {
    pub identifier: String,
    pub referred: Box<Type>,
    pub metadata: Metadata,
}

impl NamedType {
    pub fn new(identifier: impl Into<String>, referred: Type) -> Self {
        Self {
            identifier: identifier.into(),
            referred: Box::new(referred),
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Attach `schema` under the canonical schema key.
    pub fn with_schema(self, schema: Value) -> Self {
        self.with_metadata(schema_metadata_key(), schema)
    }

    /// The previously attached schema, if any.
    ///
    /// Any key inside [`SCHEMA_ANNOTATION_NAMESPACE`] ending with
    /// [`SCHEMA_ANNOTATION_IDENTIFIER`] counts, as long as its value is a JSON
    /// object; other values under such a key are ignored.
    pub fn attached_schema(&self) -> Option<&Value> {
        self.metadata.iter().find_map(|(key, value)| {
            (key.starts_with(SCHEMA_ANNOTATION_NAMESPACE)
                && key.ends_with(SCHEMA_ANNOTATION_IDENTIFIER)
                && value.is_object())
            .then_some(value)
        })
    }
}

/// `ballerina/ai:JsonSchema`
pub fn schema_metadata_key() -> String {
    format!("{SCHEMA_ANNOTATION_NAMESPACE}:{SCHEMA_ANNOTATION_IDENTIFIER}")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn display_names_shapes() {
        let person = NamedType::new("Person", Type::record([("name", Primitive::String.into())]));
        let ty = Type::union([Type::array(Type::Named(person)), Type::Error]);
        assert_eq!(ty.to_string(), "Person[]|error");

        let nested = Type::array(Type::optional(Primitive::Integer.into()));
        assert_eq!(nested.to_string(), "(int|())[]");

        let record = Type::record([("age", Primitive::Integer.into())]);
        assert_eq!(record.to_string(), "record { int age; }");
        assert_eq!(Type::Union(vec![]).to_string(), "never");
    }

    #[test]
    fn error_detection_follows_names() {
        let custom = Type::Named(NamedType::new("MyError", Type::Error));
        assert!(custom.is_error());
        assert!(!Type::Json.is_error());
    }

    #[test]
    fn nilable_members() {
        assert!(Type::optional(Primitive::String.into()).is_nilable());
        assert!(Type::Json.is_nilable());
        assert!(!Type::array(Primitive::Null.into()).is_nilable());
    }

    #[test]
    fn attached_schema_requires_namespace_and_object() {
        let named = NamedType::new("Person", Type::Json)
            .with_metadata("ballerina/ai:1:JsonSchema", json!({"type": "object"}))
            .with_metadata("other/module:JsonSchema", json!({"type": "string"}));
        assert_eq!(named.attached_schema(), Some(&json!({"type": "object"})));

        let not_a_map = NamedType::new("Person", Type::Json)
            .with_metadata(schema_metadata_key(), json!("{\"type\":\"object\"}"));
        assert_eq!(not_a_map.attached_schema(), None);
    }
}
