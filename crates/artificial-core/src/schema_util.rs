//! Helpers for turning Rust type information into a structured-output
//! schema. The raw JSON is produced with [`schemars`] and then run through
//! the [`crate::sanitize`] pass, so the result is always inside the dialect
//! a provider accepts.
//!
//! schemars plays the role of the OpenAPI-style external mapper here: it is
//! configured with OpenAPI 3 settings and knows about `description`,
//! `required`, `nullable`, formats and friends, all of which the sanitizer
//! strips again.

use schemars::{
    r#gen::{SchemaGenerator, SchemaSettings},
    JsonSchema,
};
use serde_json::{self, Value};

use crate::{
    error::Result,
    runtime::TypeDescriptor,
    sanitize::sanitize,
    schema::Schema,
    types::{NamedType, Type},
};

/// Generate the raw (unsanitized) JSON Schema for `T` **inline**, i.e.
/// without `$ref` pointers to external definitions.
///
/// Recursive types still produce `$ref`s; those are dropped by the
/// sanitizer and leave an empty node behind.
pub fn derive_raw_schema<T>() -> Result<Value>
where
    T: JsonSchema + 'static,
{
    // We want the schema fully inlined to avoid `$ref`s that providers do not
    // resolve.
    let mut settings = SchemaSettings::openapi3();
    settings.inline_subschemas = true;
    settings.meta_schema = None;

    let generator = SchemaGenerator::new(settings);
    let root = generator.into_root_schema_for::<T>();

    Ok(serde_json::to_value(root)?)
}

/// Generate the sanitized response schema for `T`.
///
/// # Example
///
/// ```
/// use artificial_core::schema_util::derive_response_schema;
/// use schemars::JsonSchema;
///
/// #[derive(JsonSchema)]
/// struct Foo { bar: String, raw: Vec<u8> }
///
/// let schema = derive_response_schema::<Foo>().unwrap();
/// assert_eq!(
///     schema.to_compact_string().unwrap(),
///     r#"{"type":"object","properties":{"bar":{"type":"string"},"raw":{"type":"array","items":{"type":"integer"}}}}"#,
/// );
/// ```
pub fn derive_response_schema<T>() -> Result<Schema>
where
    T: JsonSchema + 'static,
{
    sanitize(&derive_raw_schema::<T>()?)
}

/// Runtime descriptor for a Rust type declared as `name`, carrying its
/// sanitized schema as attached metadata.
///
/// This is what the static phase leaves behind for host declarations, so the
/// runtime generator answers for `T` without structural reflection.
pub fn describe_named<T>(name: impl Into<String>) -> Result<TypeDescriptor>
where
    T: JsonSchema + 'static,
{
    let schema = derive_response_schema::<T>()?.to_value()?;
    let named = NamedType::new(name, Type::other(std::any::type_name::<T>())).with_schema(schema);
    Ok(TypeDescriptor::new(Type::Named(named)))
}
