//! Schema synthesis for structured LLM output.
//!
//! * [`types`] – the type algebra both producers understand.
//! * [`synthesize`] – the `Type → Schema` mapping, plus union-with-error
//!   filtering for model-call results.
//! * [`sanitize`] – lowering of generic JSON Schema into the constrained
//!   dialect ([`schema::Schema`]).
//! * [`runtime`] – fallback generation from a runtime descriptor.
//! * [`schema_util`] – schemars bridge for Rust types.
//! * [`response_format`] – the payload a provider call forwards.
pub mod error;
pub mod response_format;
pub mod runtime;
pub mod sanitize;
pub mod schema;
pub mod schema_util;
pub mod synthesize;
pub mod types;

pub use error::{ArtificialError, Result};
pub use runtime::{
    resolve_response_schema, runtime_synthesize, Describe, ResolvedSchema, TypeDescriptor,
};
pub use sanitize::sanitize;
pub use schema::Schema;
pub use synthesize::{synthesize, synthesize_response};
pub use types::{NamedType, Primitive, Type};
