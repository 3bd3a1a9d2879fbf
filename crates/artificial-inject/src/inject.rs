//! The build-time injector.
//!
//! [`Injector::run`] works in three strictly ordered steps over a
//! [`Package`]:
//!
//! 1. **analysis** of every source and test document, filling the
//!    [`SchemaCache`] once per response type name,
//! 2. **annotation** of every type definition whose name is cached, unless
//!    an equivalent `@<alias>:JsonSchema` is already present,
//! 3. **import finalization** for the documents that received a new
//!    annotation.
//!
//! Running it again over its own output changes nothing.
//!
//! ```rust
//! use artificial_core::types::{NamedType, Primitive, Type};
//! use artificial_inject::{config::InjectorConfig, inject::Injector, source::*};
//!
//! let provider = ClassRef::new(ModuleId::new("ballerinax", "ai.openai", "1.2.0"), "ModelProvider");
//! let count = Type::Named(NamedType::new("Count", Primitive::Integer.into()));
//! let document = Document::new("main.bal")
//!     .with_import(ImportDecl::new("ballerinax", "ai.openai"))
//!     .with_type_definition(TypeDefinition::new("Count", Primitive::Integer.into()))
//!     .with_call_site(CallSite::new(
//!         "generate",
//!         ReceiverType::new(provider),
//!         Type::union([count, Type::Error]),
//!     ));
//! let mut package = Package::new()
//!     .with_module(Module::new(ModuleId::new("acme", "app", "0.1.0")).with_document(document));
//!
//! let report = Injector::new(InjectorConfig::default()).run(&mut package).unwrap();
//! assert_eq!(report.schemas.get("Count"), Some(r#"{"type":"integer"}"#));
//!
//! let document = package.document("main.bal").unwrap();
//! assert_eq!(
//!     document.type_definitions[0].annotations[0].to_string(),
//!     r#"@ai:JsonSchema {"type":"integer"}"#,
//! );
//! assert_eq!(document.imports[1].to_string(), "import ballerina/ai;");
//! ```
use std::collections::HashSet;

use artificial_core::error::{ArtificialError, Result};
use serde_json::Value;

use crate::{
    analyze::{Analyzer, TypeFailure},
    cache::SchemaCache,
    config::InjectorConfig,
    mapper::{AlgebraMapper, SchemaMapper},
    source::{Annotation, Document, DocumentId, ImportDecl, Package},
};

/// How the annotation module is bound in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationAlias {
    /// Imported under this prefix.
    InScope(String),
    /// Imported as `_`; there is no usable name for it.
    Suppressed,
    /// Not imported.
    Absent,
}

pub fn resolve_alias(document: &Document, config: &InjectorConfig) -> AnnotationAlias {
    let Some(import) = document
        .imports
        .iter()
        .find(|import| config.is_annotation_import(import))
    else {
        return AnnotationAlias::Absent;
    };

    match import.prefix.as_deref() {
        Some("_") => AnnotationAlias::Suppressed,
        Some(prefix) => AnnotationAlias::InScope(prefix.to_owned()),
        None => match import.implicit_prefix() {
            Some(prefix) => AnnotationAlias::InScope(prefix.to_owned()),
            None => AnnotationAlias::Absent,
        },
    }
}

/// Qualifier schema annotations use in `document`: the in-scope alias, or
/// the configured default otherwise (including when the import is
/// suppressed, in which case the qualifier does not resolve).
pub fn annotation_qualifier(document: &Document, config: &InjectorConfig) -> String {
    match resolve_alias(document, config) {
        AnnotationAlias::InScope(alias) => alias,
        AnnotationAlias::Suppressed | AnnotationAlias::Absent => config.default_alias.clone(),
    }
}

/// Documents that received a new annotation and still need the import.
#[derive(Debug, Default)]
pub struct PendingImportSet {
    documents: HashSet<DocumentId>,
}

impl PendingImportSet {
    pub fn insert(&mut self, document: DocumentId) -> bool {
        self.documents.insert(document)
    }

    /// Remove `document`, returning whether it was pending.
    pub fn take(&mut self, document: &DocumentId) -> bool {
        self.documents.remove(document)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedDeclaration {
    pub document: DocumentId,
    pub name: String,
}

/// What a run did.
#[derive(Debug, Default)]
pub struct InjectionReport {
    pub schemas: SchemaCache,
    pub annotated: Vec<AnnotatedDeclaration>,
    pub imports_added: Vec<DocumentId>,
    pub failures: Vec<TypeFailure>,
}

impl InjectionReport {
    /// Whether the run left every document untouched.
    pub fn is_noop(&self) -> bool {
        self.annotated.is_empty() && self.imports_added.is_empty()
    }
}

pub struct Injector<M = AlgebraMapper> {
    config: InjectorConfig,
    mapper: M,
}

impl Injector<AlgebraMapper> {
    pub fn new(config: InjectorConfig) -> Self {
        Self::with_mapper(config, AlgebraMapper)
    }
}

impl Default for Injector<AlgebraMapper> {
    fn default() -> Self {
        Self::new(InjectorConfig::default())
    }
}

impl<M: SchemaMapper> Injector<M> {
    pub fn with_mapper(config: InjectorConfig, mapper: M) -> Self {
        Self { config, mapper }
    }

    pub fn config(&self) -> &InjectorConfig {
        &self.config
    }

    /// Analyze, annotate and finalize imports for `package`.
    ///
    /// # Errors
    ///
    /// * [`ArtificialError::AnalysisAborted`] – the package already has
    ///   errors; nothing was analyzed or changed. Hosts treat this as a
    ///   silent no-op.
    /// * [`ArtificialError::Serialization`] – a cached schema could not be
    ///   parsed back into an annotation value.
    ///
    /// Synthesis failures are per type and reported in
    /// [`InjectionReport::failures`] instead.
    pub fn run(&self, package: &mut Package) -> Result<InjectionReport> {
        if package.error_count > 0 {
            tracing::debug!(
                errors = package.error_count,
                "build has errors, skipping schema injection"
            );
            return Err(ArtificialError::AnalysisAborted {
                errors: package.error_count,
            });
        }

        let mut schemas = SchemaCache::new();
        let failures = {
            let mut analyzer = Analyzer::new(&self.config, &self.mapper, &mut schemas);
            package
                .documents()
                .for_each(|document| analyzer.analyze_document(document));
            analyzer.finish()
        };

        let mut pending = PendingImportSet::default();
        let mut annotated = Vec::new();
        for document in package.documents_mut() {
            annotated.extend(self.annotate_document(document, &schemas, &mut pending)?);
        }

        let mut imports_added = Vec::new();
        for document in package.documents_mut() {
            if self.finalize_imports(document, &mut pending) {
                imports_added.push(document.id.clone());
            }
        }

        Ok(InjectionReport {
            schemas,
            annotated,
            imports_added,
            failures,
        })
    }

    fn annotate_document(
        &self,
        document: &mut Document,
        schemas: &SchemaCache,
        pending: &mut PendingImportSet,
    ) -> Result<Vec<AnnotatedDeclaration>> {
        let qualifier = annotation_qualifier(document, &self.config);
        let identifier = &self.config.annotation_identifier;
        let mut annotated = Vec::new();

        for definition in &mut document.type_definitions {
            let Some(schema) = schemas.get(&definition.name) else {
                continue;
            };
            if definition
                .annotations
                .iter()
                .any(|annotation| annotation.is(&qualifier, identifier))
            {
                tracing::trace!(ty = %definition.name, "schema annotation already present");
                continue;
            }

            let value: Value = serde_json::from_str(schema)?;
            definition
                .annotations
                .push(Annotation::qualified(qualifier.clone(), identifier.clone(), Some(value)));
            tracing::info!(
                document = %document.id,
                ty = %definition.name,
                "attached schema annotation"
            );

            annotated.push(AnnotatedDeclaration {
                document: document.id.clone(),
                name: definition.name.clone(),
            });
        }

        if !annotated.is_empty() {
            pending.insert(document.id.clone());
        }
        Ok(annotated)
    }

    /// Add the annotation module import to `document` if it is pending and
    /// not importable already. Returns whether an import was added.
    fn finalize_imports(&self, document: &mut Document, pending: &mut PendingImportSet) -> bool {
        if !pending.take(&document.id) {
            return false;
        }

        match resolve_alias(document, &self.config) {
            AnnotationAlias::InScope(_) => false,
            AnnotationAlias::Suppressed => {
                tracing::warn!(
                    document = %document.id,
                    module = %self.config.annotation_module,
                    qualifier = %self.config.default_alias,
                    "annotation import is suppressed, schema qualifier will not resolve"
                );
                false
            }
            AnnotationAlias::Absent => {
                let module = &self.config.annotation_module;
                let import = ImportDecl::new(module.org.clone(), &module.name);
                tracing::info!(document = %document.id, %import, "added import");
                document.imports.push(import);
                true
            }
        }
    }
}
