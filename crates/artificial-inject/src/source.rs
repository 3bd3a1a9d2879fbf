//! In-memory view of the host program the injector works on.
//!
//! The host compiler owns parsing and printing; it hands the injector what
//! semantic analysis already knows (imports, type definitions with their
//! annotations, call sites with receiver and result types) and applies the
//! edited [`Document`]s back to source.
use std::fmt::{self, Display};

use artificial_core::types::{Metadata, NamedType, Type};
use serde_json::Value;

use crate::config::{InjectorConfig, ModuleRef};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fully resolved module identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleId {
    pub org: String,
    pub name: String,
    pub version: String,
}

impl ModuleId {
    pub fn new(
        org: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            org: org.into(),
            name: name.into(),
            version: version.into(),
        }
    }
}

/// `import org/a.b as prefix;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub org: Option<String>,
    pub module_name: Vec<String>,
    pub prefix: Option<String>,
    /// Version the host resolved the import to, when known.
    pub resolved_version: Option<String>,
}

impl ImportDecl {
    /// `module_path` is dotted, e.g. `ai.openai`.
    pub fn new(org: impl Into<String>, module_path: &str) -> Self {
        Self {
            org: Some(org.into()),
            module_name: module_path.split('.').map(str::to_owned).collect(),
            prefix: None,
            resolved_version: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.resolved_version = Some(version.into());
        self
    }

    pub fn module_path(&self) -> String {
        self.module_name.join(".")
    }

    pub fn refers_to(&self, module: &ModuleRef) -> bool {
        self.org.as_deref() == Some(module.org.as_str()) && self.module_path() == module.name
    }

    /// Name the import binds when it has no explicit prefix.
    pub fn implicit_prefix(&self) -> Option<&str> {
        self.module_name.last().map(String::as_str)
    }
}

impl Display for ImportDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "import ")?;
        if let Some(org) = &self.org {
            write!(f, "{org}/")?;
        }
        write!(f, "{}", self.module_path())?;
        if let Some(prefix) = &self.prefix {
            write!(f, " as {prefix}")?;
        }
        write!(f, ";")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationRef {
    Simple(String),
    Qualified {
        module_prefix: String,
        identifier: String,
    },
}

impl Display for AnnotationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationRef::Simple(identifier) => write!(f, "{identifier}"),
            AnnotationRef::Qualified {
                module_prefix,
                identifier,
            } => write!(f, "{module_prefix}:{identifier}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub reference: AnnotationRef,
    /// Mapping-constructor value, if any.
    pub value: Option<Value>,
}

impl Annotation {
    pub fn qualified(
        module_prefix: impl Into<String>,
        identifier: impl Into<String>,
        value: Option<Value>,
    ) -> Self {
        Self {
            reference: AnnotationRef::Qualified {
                module_prefix: module_prefix.into(),
                identifier: identifier.into(),
            },
            value,
        }
    }

    /// Whether this is `@<prefix>:<identifier>`.
    pub fn is(&self, prefix: &str, identifier: &str) -> bool {
        matches!(
            &self.reference,
            AnnotationRef::Qualified { module_prefix, identifier: id }
                if module_prefix == prefix && id == identifier
        )
    }
}

impl Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.reference)?;
        if let Some(value) = &self.value {
            write!(f, " {value}")?;
        }
        Ok(())
    }
}

/// `type <name> <ty>;` with its leading annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
    pub name: String,
    pub ty: Type,
    pub annotations: Vec<Annotation>,
}

impl TypeDefinition {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            annotations: Vec::new(),
        }
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Metadata as the runtime sees it: annotations written with `prefix`
    /// bound to the configured annotation module are keyed by
    /// [`InjectorConfig::metadata_key`].
    pub fn attached_metadata(&self, prefix: &str, config: &InjectorConfig) -> Metadata {
        self.annotations
            .iter()
            .filter(|annotation| annotation.is(prefix, &config.annotation_identifier))
            .filter_map(|annotation| annotation.value.clone())
            .map(|value| (config.metadata_key(), value))
            .collect()
    }

    pub fn to_named_type(&self, prefix: &str, config: &InjectorConfig) -> NamedType {
        let mut named = NamedType::new(self.name.clone(), self.ty.clone());
        named.metadata = self.attached_metadata(prefix, config);
        named
    }
}

/// A class type together with everything it is a subtype of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRef {
    pub module: ModuleId,
    pub name: String,
}

impl ClassRef {
    pub fn new(module: ModuleId, name: impl Into<String>) -> Self {
        Self {
            module,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverType {
    pub class: ClassRef,
    pub supertypes: Vec<ClassRef>,
}

impl ReceiverType {
    pub fn new(class: ClassRef) -> Self {
        Self {
            class,
            supertypes: Vec::new(),
        }
    }

    pub fn with_supertype(mut self, supertype: ClassRef) -> Self {
        self.supertypes.push(supertype);
        self
    }

    pub(crate) fn any(&self, predicate: impl Fn(&ClassRef) -> bool) -> bool {
        predicate(&self.class) || self.supertypes.iter().any(predicate)
    }
}

/// `receiver->method(...)` with the types semantic analysis assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSite {
    pub method: String,
    pub receiver: Option<ReceiverType>,
    pub result_type: Option<Type>,
}

impl CallSite {
    pub fn new(method: impl Into<String>, receiver: ReceiverType, result_type: Type) -> Self {
        Self {
            method: method.into(),
            receiver: Some(receiver),
            result_type: Some(result_type),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub imports: Vec<ImportDecl>,
    pub type_definitions: Vec<TypeDefinition>,
    pub call_sites: Vec<CallSite>,
}

impl Document {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: DocumentId::new(id),
            imports: Vec::new(),
            type_definitions: Vec::new(),
            call_sites: Vec::new(),
        }
    }

    pub fn with_import(mut self, import: ImportDecl) -> Self {
        self.imports.push(import);
        self
    }

    pub fn with_type_definition(mut self, definition: TypeDefinition) -> Self {
        self.type_definitions.push(definition);
        self
    }

    pub fn with_call_site(mut self, call: CallSite) -> Self {
        self.call_sites.push(call);
        self
    }

    pub fn type_definition(&self, name: &str) -> Option<&TypeDefinition> {
        self.type_definitions.iter().find(|def| def.name == name)
    }

    /// The named type of definition `name` including the metadata its
    /// schema annotation carries under this document's imports.
    pub fn named_type(&self, name: &str, config: &InjectorConfig) -> Option<NamedType> {
        let prefix = crate::inject::annotation_qualifier(self, config);
        self.type_definition(name)
            .map(|def| def.to_named_type(&prefix, config))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub id: ModuleId,
    pub documents: Vec<Document>,
    pub test_documents: Vec<Document>,
}

impl Module {
    pub fn new(id: ModuleId) -> Self {
        Self {
            id,
            documents: Vec::new(),
            test_documents: Vec::new(),
        }
    }

    pub fn with_document(mut self, document: Document) -> Self {
        self.documents.push(document);
        self
    }

    pub fn with_test_document(mut self, document: Document) -> Self {
        self.test_documents.push(document);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Package {
    pub modules: Vec<Module>,
    /// Errors the host build reported before injection.
    pub error_count: usize,
}

impl Package {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, module: Module) -> Self {
        self.modules.push(module);
        self
    }

    /// Source and test documents of every module.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.modules
            .iter()
            .flat_map(|module| module.documents.iter().chain(&module.test_documents))
    }

    pub fn documents_mut(&mut self) -> impl Iterator<Item = &mut Document> {
        self.modules
            .iter_mut()
            .flat_map(|module| module.documents.iter_mut().chain(&mut module.test_documents))
    }

    pub fn document(&self, id: &str) -> Option<&Document> {
        self.documents().find(|document| document.id.as_str() == id)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn renders_host_syntax() {
        let import = ImportDecl::new("ballerinax", "ai.openai").with_prefix("openai");
        assert_eq!(import.to_string(), "import ballerinax/ai.openai as openai;");

        let annotation = Annotation::qualified("ai", "JsonSchema", Some(json!({"type": "string"})));
        assert_eq!(annotation.to_string(), r#"@ai:JsonSchema {"type":"string"}"#);
    }

    #[test]
    fn annotation_qualification_must_match() {
        let annotation = Annotation::qualified("ai", "JsonSchema", None);
        assert!(annotation.is("ai", "JsonSchema"));
        assert!(!annotation.is("llm", "JsonSchema"));

        let simple = Annotation {
            reference: AnnotationRef::Simple("JsonSchema".into()),
            value: None,
        };
        assert!(!simple.is("ai", "JsonSchema"));
    }

    #[test]
    fn metadata_from_annotations() {
        let config = InjectorConfig::default();
        let def = TypeDefinition::new("Tag", Type::Json)
            .with_annotation(Annotation::qualified(
                "llm",
                "JsonSchema",
                Some(json!({"type": "string"})),
            ))
            .with_annotation(Annotation::qualified("log", "Sensitive", None));

        let named = def.to_named_type("llm", &config);
        assert_eq!(named.attached_schema(), Some(&json!({"type": "string"})));
        assert!(def.attached_metadata("ai", &config).is_empty());
    }

    #[test]
    fn iterates_test_documents() {
        let module = Module::new(ModuleId::new("acme", "app", "0.1.0"))
            .with_document(Document::new("main.bal"))
            .with_test_document(Document::new("tests/main_test.bal"));
        let package = Package::new().with_module(module);
        let ids: Vec<_> = package.documents().map(|doc| doc.id.as_str()).collect();
        assert_eq!(ids, ["main.bal", "tests/main_test.bal"]);
    }
}
