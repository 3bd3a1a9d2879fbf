use artificial::{
    TypeDescriptor,
    inject::{
        InjectorConfig, Injector, SchemarsMapper,
        source::{
            CallSite, ClassRef, Document, ImportDecl, Module, ModuleId, Package, ReceiverType,
            TypeDefinition,
        },
    },
    resolve_response_schema,
    response_format::ResponseFormat,
    types::{NamedType, Primitive, Type},
};
use schemars::JsonSchema;
use tracing_subscriber::EnvFilter;

/// # Schema injection, end to end
///
/// 1. **Builds** a small package: one document calling `generate` on the
///    OpenAI provider for `Itinerary[]|error` and `Forecast|error`, and one
///    document declaring both types. `Forecast` is declared opaquely; its
///    schema comes from the Rust struct below via `schemars`.
/// 2. **Runs** the injector and prints the source it would write back.
/// 3. **Resolves** the runtime schema of `Itinerary` from the injected
///    annotation and renders the `response_format` payload.
///
/// ## How to run
///
/// ```bash
/// RUST_LOG=artificial_inject=debug cargo run -p artificial --example inject_schemas
/// ```
////////////////////////////////////////////////////////////////////////////////

#[allow(dead_code)]
#[derive(JsonSchema)]
struct Forecast {
    /// Day of week.
    day: String,
    high_celsius: f64,
    chance_of_rain: Option<u8>,
}

fn itinerary() -> Type {
    Type::record([
        ("city", Type::from(Primitive::String)),
        ("nights", Type::from(Primitive::Integer)),
        ("budget", Type::optional(Primitive::Decimal.into())),
        ("tags", Type::array(Primitive::String.into())),
    ])
}

fn package() -> Package {
    let provider = || {
        ReceiverType::new(ClassRef::new(
            ModuleId::new("ballerinax", "ai.openai", "1.4.2"),
            "ModelProvider",
        ))
    };
    let planned = Type::union([
        Type::array(Type::Named(NamedType::new("Itinerary", itinerary()))),
        Type::Error,
    ]);
    let forecast = Type::union([
        Type::Named(NamedType::new("Forecast", Type::Json)),
        Type::Error,
    ]);

    let planner = Document::new("planner.bal")
        .with_import(ImportDecl::new("ballerinax", "ai.openai").with_version("1.4.2"))
        .with_call_site(CallSite::new("generate", provider(), planned))
        .with_call_site(CallSite::new("generate", provider(), forecast));
    let types = Document::new("types.bal")
        .with_type_definition(TypeDefinition::new("Itinerary", itinerary()))
        .with_type_definition(TypeDefinition::new("Forecast", Type::Json));

    Package::new().with_module(
        Module::new(ModuleId::new("acme", "travel", "0.1.0"))
            .with_document(planner)
            .with_document(types),
    )
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = InjectorConfig::default();
    let mapper = SchemarsMapper::new().register::<Forecast>("Forecast")?;
    let injector = Injector::with_mapper(config.clone(), mapper);

    let mut package = package();
    let report = injector.run(&mut package)?;
    for (name, schema) in report.schemas.iter() {
        println!("cached {name}: {schema}");
    }

    let types = package
        .document("types.bal")
        .ok_or_else(|| anyhow::anyhow!("types.bal missing"))?;
    println!("\n// {}", types.id);
    for import in &types.imports {
        println!("{import}");
    }
    for definition in &types.type_definitions {
        for annotation in &definition.annotations {
            println!("{annotation}");
        }
        println!("type {} {};", definition.name, definition.ty);
    }

    let again = injector.run(&mut package)?;
    println!("\nsecond run changed nothing: {}", again.is_noop());

    let itinerary = package
        .document("types.bal")
        .and_then(|types| types.named_type("Itinerary", &config))
        .ok_or_else(|| anyhow::anyhow!("Itinerary missing"))?;
    let resolved = resolve_response_schema(&TypeDescriptor::new(Type::Named(itinerary)))?;
    let format = ResponseFormat::json_schema("Itinerary", resolved.into_schema()).strict(true);
    println!("\nresponse_format: {}", serde_json::to_string_pretty(&format.to_value()?)?);

    Ok(())
}
