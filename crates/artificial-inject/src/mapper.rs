//! Producers of the raw schema the injector sanitizes and caches.
use std::collections::HashMap;

use artificial_core::{
    error::Result,
    schema_util::derive_raw_schema,
    synthesize::synthesize,
    types::{NamedType, Type},
};
use schemars::JsonSchema;
use serde_json::Value;

/// Maps a target named type to a raw JSON Schema.
///
/// The output may use any JSON Schema vocabulary; the injector runs it
/// through [`artificial_core::sanitize`] before caching.
pub trait SchemaMapper {
    fn raw_schema(&self, named: &NamedType) -> Result<Value>;
}

impl<M: SchemaMapper + ?Sized> SchemaMapper for &M {
    fn raw_schema(&self, named: &NamedType) -> Result<Value> {
        (**self).raw_schema(named)
    }
}

impl<M: SchemaMapper + ?Sized> SchemaMapper for Box<M> {
    fn raw_schema(&self, named: &NamedType) -> Result<Value> {
        (**self).raw_schema(named)
    }
}

/// Synthesizes directly from the type algebra.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlgebraMapper;

impl SchemaMapper for AlgebraMapper {
    fn raw_schema(&self, named: &NamedType) -> Result<Value> {
        synthesize(&Type::Named(named.clone()))?.to_value()
    }
}

/// Schemas derived from Rust types with schemars, registered per declared
/// name. Unregistered names and names that already carry an attached schema
/// go through [`AlgebraMapper`].
///
/// ```rust
/// use artificial_inject::mapper::{SchemaMapper, SchemarsMapper};
/// use artificial_core::types::{NamedType, Type};
///
/// #[derive(schemars::JsonSchema)]
/// struct Person { name: String }
///
/// let mapper = SchemarsMapper::new().register::<Person>("Person").unwrap();
/// let raw = mapper.raw_schema(&NamedType::new("Person", Type::Json)).unwrap();
/// assert_eq!(raw["title"], "Person");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemarsMapper {
    registered: HashMap<String, Value>,
}

impl SchemarsMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T>(mut self, name: impl Into<String>) -> Result<Self>
    where
        T: JsonSchema + 'static,
    {
        self.registered.insert(name.into(), derive_raw_schema::<T>()?);
        Ok(self)
    }
}

impl SchemaMapper for SchemarsMapper {
    fn raw_schema(&self, named: &NamedType) -> Result<Value> {
        match self.registered.get(&named.identifier) {
            Some(raw) if named.attached_schema().is_none() => Ok(raw.clone()),
            _ => AlgebraMapper.raw_schema(named),
        }
    }
}
