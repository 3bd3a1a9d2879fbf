use artificial::{
    ArtificialError, Describe, ResolvedSchema, TypeDescriptor,
    inject::{
        InjectorConfig, Injector,
        source::{
            Annotation, CallSite, ClassRef, Document, ImportDecl, Module, ModuleId, Package,
            ReceiverType, TypeDefinition,
        },
    },
    resolve_response_schema, runtime_synthesize, sanitize, synthesize, synthesize_response,
    types::{NamedType, Primitive, Type},
};
use serde_json::json;

fn person_type() -> Type {
    Type::record([
        ("name", Type::from(Primitive::String)),
        ("age", Type::from(Primitive::Integer)),
    ])
}

fn person() -> Type {
    Type::Named(NamedType::new("Person", person_type()))
}

fn generate(result: Type) -> CallSite {
    let provider =
        ClassRef::new(ModuleId::new("ballerinax", "ai.openai", "1.1.0"), "ModelProvider");
    CallSite::new("generate", ReceiverType::new(provider), result)
}

fn single_document_package(document: Document) -> Package {
    Package::new()
        .with_module(Module::new(ModuleId::new("acme", "app", "0.1.0")).with_document(document))
}

#[test]
fn primitive_integer() {
    let schema = synthesize(&Primitive::Integer.into()).unwrap();
    assert_eq!(schema.to_compact_string().unwrap(), r#"{"type":"integer"}"#);
}

#[test]
fn named_record_synthesized_and_sanitized() {
    let raw = synthesize(&person()).unwrap().to_value().unwrap();
    let schema = sanitize(&raw).unwrap();
    assert_eq!(
        schema.to_value().unwrap(),
        json!({
            "type": "object",
            "properties": {"name": {"type": "string"}, "age": {"type": "integer"}}
        })
    );
}

#[test]
fn string_array() {
    let schema = synthesize(&Type::array(Primitive::String.into())).unwrap();
    assert_eq!(
        schema.to_compact_string().unwrap(),
        r#"{"type":"array","items":{"type":"string"}}"#
    );
}

#[test]
fn runtime_json_descriptor() {
    let schema = runtime_synthesize(&TypeDescriptor::new(Type::Json)).unwrap();
    assert_eq!(
        schema.to_compact_string().unwrap(),
        r#"{"type":["object","array","string","number","boolean","null"]}"#
    );
    assert_eq!(runtime_synthesize(&serde_json::Value::describe()).unwrap(), schema);
}

#[test]
fn error_member_is_filtered_from_injected_schema() {
    let alone = synthesize(&person()).unwrap();
    assert_eq!(
        synthesize_response(&Type::union([person(), Type::Error])).unwrap(),
        Some(alone.clone())
    );

    let document = Document::new("main.bal")
        .with_import(ImportDecl::new("ballerinax", "ai.openai"))
        .with_type_definition(TypeDefinition::new("Person", person_type()))
        .with_call_site(generate(Type::union([person(), Type::Error])));
    let mut package = single_document_package(document);

    let report = Injector::default().run(&mut package).unwrap();
    let expected = alone.to_compact_string().unwrap();
    assert_eq!(report.schemas.get("Person"), Some(expected.as_str()));
}

#[test]
fn injected_annotation_is_what_runtime_reads() {
    let config = InjectorConfig::default();
    let document = Document::new("main.bal")
        .with_import(ImportDecl::new("ballerinax", "ai.openai"))
        .with_type_definition(TypeDefinition::new("Person", person_type()))
        .with_call_site(generate(Type::union([person(), Type::Error])));
    let mut package = single_document_package(document);

    // Before injection the runtime has nothing to go on.
    let bare = package.document("main.bal").unwrap().named_type("Person", &config).unwrap();
    let err = resolve_response_schema(&TypeDescriptor::new(Type::Named(bare))).unwrap_err();
    assert!(matches!(err, ArtificialError::MissingSchemaMapping { ref ty } if ty == "Person"));
    assert_eq!(
        err.to_string(),
        "runtime schema generation is not yet supported for type: Person"
    );

    Injector::new(config.clone()).run(&mut package).unwrap();

    let named = package.document("main.bal").unwrap().named_type("Person", &config).unwrap();
    let resolved = resolve_response_schema(&TypeDescriptor::new(Type::Named(named))).unwrap();
    assert_eq!(
        resolved,
        ResolvedSchema::Attached(synthesize(&person()).unwrap())
    );
}

#[test]
fn custom_alias_round_trips_to_runtime() {
    let config = InjectorConfig::default();
    let document = Document::new("main.bal")
        .with_import(ImportDecl::new("ballerinax", "ai.openai"))
        .with_import(ImportDecl::new("ballerina", "ai").with_prefix("llm"))
        .with_type_definition(TypeDefinition::new("Person", person_type()))
        .with_call_site(generate(Type::array(person())));
    let mut package = single_document_package(document);

    Injector::new(config.clone()).run(&mut package).unwrap();

    let document = package.document("main.bal").unwrap();
    let annotation = &document.type_definition("Person").unwrap().annotations[0];
    assert!(annotation.is("llm", "JsonSchema"));

    let named = document.named_type("Person", &config).unwrap();
    let descriptor = TypeDescriptor::new(Type::array(Type::Named(named)));
    let schema = runtime_synthesize(&descriptor).unwrap();
    assert_eq!(
        schema.to_value().unwrap(),
        json!({
            "type": "array",
            "items": {
                "type": "object",
                "properties": {"name": {"type": "string"}, "age": {"type": "integer"}}
            }
        })
    );
}

#[test]
fn repeated_runs_converge() {
    let existing = Annotation::qualified("ai", "JsonSchema", Some(json!({"type": "object"})));
    let document = Document::new("main.bal")
        .with_import(ImportDecl::new("ballerinax", "ai.openai"))
        .with_type_definition(
            TypeDefinition::new("Person", person_type()).with_annotation(existing),
        )
        .with_type_definition(TypeDefinition::new("Score", Primitive::Float.into()))
        .with_call_site(generate(Type::union([person(), Type::Error])))
        .with_call_site(generate(Type::union([
            Type::Named(NamedType::new("Score", Primitive::Float.into())),
            Type::Error,
        ])));
    let mut package = single_document_package(document);
    let injector = Injector::default();

    let first = injector.run(&mut package).unwrap();
    // `Person` was already annotated; only `Score` is new.
    assert_eq!(first.annotated.len(), 1);
    assert_eq!(first.annotated[0].name, "Score");
    assert_eq!(first.imports_added.len(), 1);

    let snapshot = package.clone();
    for _ in 0..3 {
        assert!(injector.run(&mut package).unwrap().is_noop());
    }
    assert_eq!(package, snapshot);
}
