//! # `artificial` – The umbrella crate
//!
//! One import for both halves of the schema pipeline:
//!
//! | Crate                    | What it provides                                                                    |
//! |--------------------------|-------------------------------------------------------------------------------------|
//! | **`artificial-core`**    | Type algebra, schema synthesis, sanitizer, runtime fallback, errors                 |
//! | **`artificial-inject`**  | Build-time schema cache and the idempotent `@ai:JsonSchema` annotation injector     |
//!
//! A structured-output call needs a JSON Schema for its response type. The
//! build step computes it once per declared type and stores it on the
//! declaration; at runtime the provider reads it back and only falls back
//! to generating a schema when nothing is attached.
//!
//! ## Design philosophy
//!
//! * **One mapping** – Both producers share [`synthesize::Synthesizer`], so
//!   a type gets the same schema whether it was computed ahead of time or
//!   on demand.
//! * **Constrained dialect** – Output only ever holds `type`, `items`,
//!   `properties` and `anyOf`; everything else is stripped by
//!   [`sanitize()`].
//! * **Re-runnable** – Injecting into already-injected source changes
//!   nothing.
//!
//! ## Quick example
//!
//! ```rust
//! use artificial::{
//!     ResolvedSchema, TypeDescriptor,
//!     inject::{InjectorConfig, Injector, source::*},
//!     resolve_response_schema,
//!     types::{NamedType, Primitive, Type},
//! };
//!
//! let city = Type::record([
//!     ("name", Type::from(Primitive::String)),
//!     ("population", Type::from(Primitive::Integer)),
//! ]);
//! let provider = ClassRef::new(ModuleId::new("ballerinax", "ai.openai", "1.0.0"), "ModelProvider");
//! let document = Document::new("main.bal")
//!     .with_import(ImportDecl::new("ballerinax", "ai.openai"))
//!     .with_type_definition(TypeDefinition::new("City", city.clone()))
//!     .with_call_site(CallSite::new(
//!         "generate",
//!         ReceiverType::new(provider),
//!         Type::union([Type::Named(NamedType::new("City", city)), Type::Error]),
//!     ));
//! let mut package = Package::new()
//!     .with_module(Module::new(ModuleId::new("acme", "travel", "0.1.0")).with_document(document));
//!
//! let config = InjectorConfig::default();
//! Injector::new(config.clone()).run(&mut package).unwrap();
//!
//! // What the provider sees at runtime.
//! let named = package.document("main.bal").unwrap().named_type("City", &config).unwrap();
//! let resolved = resolve_response_schema(&TypeDescriptor::new(Type::Named(named))).unwrap();
//! assert!(matches!(resolved, ResolvedSchema::Attached(_)));
//! ```
#![doc(html_root_url = "https://docs.rs/artificial/latest")]

pub use artificial_core::*;
pub use artificial_inject as inject;
