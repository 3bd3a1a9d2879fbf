//! Build-time schema injection.
//!
//! The host compiler hands over a [`source::Package`] after semantic
//! analysis. [`inject::Injector`] finds every `generate` call on the
//! configured provider class, synthesizes a schema for each named response
//! type through a [`mapper::SchemaMapper`], and attaches it to the type's
//! declaration as `@ai:JsonSchema {...}`. At runtime the provider reads the
//! attached schema back from type metadata instead of generating one.
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`config`]    | Which provider, method and annotation module to look for  |
//! | [`source`]    | Documents, imports, type definitions, call sites          |
//! | [`cache`]     | One compact schema string per declared type name          |
//! | [`mapper`]    | Raw schema producers (type algebra, schemars)             |
//! | [`analyze`]   | Discovery of model calls and their response types         |
//! | [`inject`]    | Annotation and import finalization                        |
pub mod analyze;
pub mod cache;
pub mod config;
pub mod inject;
pub mod mapper;
pub mod source;

pub use analyze::{TypeFailure, response_targets};
pub use cache::{SchemaCache, SharedSchemaCache};
pub use config::{InjectorConfig, ModuleRef};
pub use inject::{AnnotatedDeclaration, InjectionReport, Injector};
pub use mapper::{AlgebraMapper, SchemaMapper, SchemarsMapper};
