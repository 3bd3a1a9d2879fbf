//! Runtime fallback generation.
//!
//! When a model call needs the response schema of `T` and the static phase
//! did not leave one behind, the schema is rebuilt from a
//! [`TypeDescriptor`]. Only the directly representable shapes are supported:
//! primitives, `json`, arrays and unions. A named type is answered from its
//! attached metadata or not at all.
//!
//! ```rust
//! use artificial_core::runtime::{Describe, ResolvedSchema, resolve_response_schema};
//!
//! let resolved = resolve_response_schema(&Vec::<String>::describe()).unwrap();
//! assert!(matches!(resolved, ResolvedSchema::Derived(_)));
//! assert_eq!(
//!     resolved.into_schema().to_compact_string().unwrap(),
//!     r#"{"type":"array","items":{"type":"string"}}"#,
//! );
//! ```
use std::{rc::Rc, sync::Arc};

use crate::{
    error::Result,
    schema::Schema,
    synthesize::{Phase, Synthesizer},
    types::{Primitive, Type},
};

/// Runtime view of a type, the counterpart of a host `typedesc` value.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    describing: Type,
}

impl TypeDescriptor {
    pub fn new(describing: Type) -> Self {
        Self { describing }
    }

    pub fn describing_type(&self) -> &Type {
        &self.describing
    }

    /// Descriptor of the element type, if this describes an array.
    pub fn array_member_type(&self) -> Option<TypeDescriptor> {
        match self.describing.implied() {
            Type::Array(element) => Some(TypeDescriptor::new(element.as_ref().clone())),
            _ => None,
        }
    }

    /// Whether a `null` response is acceptable for this type.
    pub fn is_nilable(&self) -> bool {
        self.describing.is_nilable()
    }
}

impl From<Type> for TypeDescriptor {
    fn from(value: Type) -> Self {
        Self::new(value)
    }
}

/// Outcome of [`resolve_response_schema`].
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedSchema {
    /// The described type carries a schema computed ahead of time; it is
    /// returned verbatim and there is nothing new to attach.
    Attached(Schema),
    /// No attached schema; the fallback generator built this one.
    Derived(Schema),
}

impl ResolvedSchema {
    pub fn schema(&self) -> &Schema {
        match self {
            ResolvedSchema::Attached(schema) | ResolvedSchema::Derived(schema) => schema,
        }
    }

    pub fn into_schema(self) -> Schema {
        match self {
            ResolvedSchema::Attached(schema) | ResolvedSchema::Derived(schema) => schema,
        }
    }
}

/// Build the schema for `descriptor` without any sanitization pass.
///
/// # Errors
///
/// * [`crate::error::ArtificialError::MissingSchemaMapping`] – a named type
///   without attached schema metadata was reached.
/// * [`crate::error::ArtificialError::UnsupportedType`] – records, errors and
///   other host shapes.
pub fn runtime_synthesize(descriptor: &TypeDescriptor) -> Result<Schema> {
    let schema = Synthesizer::new(Phase::Runtime).synthesize(&descriptor.describing);
    if let Err(err) = &schema {
        tracing::debug!(
            ty = %descriptor.describing,
            error = %err,
            "runtime schema generation failed"
        );
    }
    schema
}

/// Entry point used by the model-call wrapper.
pub fn resolve_response_schema(descriptor: &TypeDescriptor) -> Result<ResolvedSchema> {
    if let Type::Named(named) = &descriptor.describing {
        if let Some(attached) = named.attached_schema() {
            return Ok(ResolvedSchema::Attached(Schema::from_value(attached.clone())?));
        }
    }
    runtime_synthesize(descriptor).map(ResolvedSchema::Derived)
}

/// Rust types that can describe themselves at runtime.
///
/// Implementations exist for the scalar and container types that map onto
/// the algebra. User types implement it by returning a named type with an
/// attached schema, see [`crate::schema_util::describe_named`].
pub trait Describe {
    fn describe_type() -> Type;

    fn describe() -> TypeDescriptor {
        TypeDescriptor::new(Self::describe_type())
    }
}

macro_rules! describe_as {
    ($primitive:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe_type() -> Type {
                    Type::Primitive($primitive)
                }
            }
        )+
    };
}

describe_as!(Primitive::Boolean => bool);
describe_as!(Primitive::Integer => i8, i16, i32, i64, i128, isize, u16, u32, u64, u128, usize);
describe_as!(Primitive::Byte => u8);
describe_as!(Primitive::Float => f32, f64);
describe_as!(Primitive::String => String, str, char);
describe_as!(Primitive::Null => ());

impl Describe for serde_json::Value {
    fn describe_type() -> Type {
        Type::Json
    }
}

impl<T: Describe> Describe for Option<T> {
    fn describe_type() -> Type {
        Type::optional(T::describe_type())
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn describe_type() -> Type {
        Type::array(T::describe_type())
    }
}

impl<T: Describe> Describe for [T] {
    fn describe_type() -> Type {
        Type::array(T::describe_type())
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn describe_type() -> Type {
        Type::array(T::describe_type())
    }
}

impl<T: Describe + ?Sized> Describe for &T {
    fn describe_type() -> Type {
        T::describe_type()
    }
}

macro_rules! describe_transparent {
    ($($wrapper:ident),+) => {
        $(
            impl<T: Describe + ?Sized> Describe for $wrapper<T> {
                fn describe_type() -> Type {
                    T::describe_type()
                }
            }
        )+
    };
}

describe_transparent!(Box, Rc, Arc);
