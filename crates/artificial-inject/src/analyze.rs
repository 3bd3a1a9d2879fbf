//! Discovery pass: find model calls and cache the schema of every response
//! type they name.
use std::collections::HashSet;

use artificial_core::{
    error::ArtificialError,
    sanitize::sanitize_to_string,
    synthesize::response_type,
    types::{NamedType, Type},
};

use crate::{
    cache::SchemaCache,
    config::InjectorConfig,
    mapper::SchemaMapper,
    source::{CallSite, Document},
};

/// Schema generation failed for one type; the others were unaffected.
#[derive(Debug)]
pub struct TypeFailure {
    pub name: String,
    pub error: ArtificialError,
}

pub(crate) struct Analyzer<'a, M> {
    config: &'a InjectorConfig,
    mapper: &'a M,
    cache: &'a mut SchemaCache,
    failed: HashSet<String>,
    failures: Vec<TypeFailure>,
}

impl<'a, M: SchemaMapper> Analyzer<'a, M> {
    pub(crate) fn new(
        config: &'a InjectorConfig,
        mapper: &'a M,
        cache: &'a mut SchemaCache,
    ) -> Self {
        Self {
            config,
            mapper,
            cache,
            failed: HashSet::new(),
            failures: Vec::new(),
        }
    }

    pub(crate) fn analyze_document(&mut self, document: &Document) {
        if !document
            .imports
            .iter()
            .any(|import| self.config.is_provider_import(import))
        {
            tracing::trace!(document = %document.id, "provider module not imported");
            return;
        }

        for call in &document.call_sites {
            if !self.is_model_call(call) {
                continue;
            }
            let Some(response) = call.result_type.as_ref().and_then(response_type) else {
                continue;
            };
            for target in response_targets(&response) {
                self.cache_schema(target);
            }
        }
    }

    pub(crate) fn finish(self) -> Vec<TypeFailure> {
        self.failures
    }

    fn is_model_call(&self, call: &CallSite) -> bool {
        call.method == self.config.generate_method
            && call
                .receiver
                .as_ref()
                .is_some_and(|receiver| receiver.any(|class| self.config.is_provider_class(class)))
    }

    fn cache_schema(&mut self, named: &NamedType) {
        if self.failed.contains(&named.identifier) {
            return;
        }

        let mapper = self.mapper;
        let produced = self.cache.get_or_try_insert_with(&named.identifier, || {
            let raw = mapper.raw_schema(named)?;
            sanitize_to_string(&raw)
        });

        if let Err(error) = produced {
            tracing::warn!(ty = %named.identifier, %error, "skipping schema annotation");
            self.failed.insert(named.identifier.clone());
            self.failures.push(TypeFailure {
                name: named.identifier.clone(),
                error,
            });
        }
    }
}

/// Named types a response type refers to directly, looking through
/// arrays and unions. A named type is a leaf: its own schema covers
/// whatever it refers to.
pub fn response_targets(response: &Type) -> Vec<&NamedType> {
    let mut targets = Vec::new();
    collect_targets(response, &mut targets);
    targets
}

fn collect_targets<'t>(ty: &'t Type, out: &mut Vec<&'t NamedType>) {
    match ty {
        Type::Named(named) => {
            if !out.iter().any(|seen| seen.identifier == named.identifier) {
                out.push(named);
            }
        }
        Type::Array(element) => collect_targets(element, out),
        Type::Union(members) => members.iter().for_each(|member| collect_targets(member, out)),
        Type::Primitive(_) | Type::Json | Type::Record(_) | Type::Error | Type::Other { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use artificial_core::types::Primitive;

    use super::*;

    #[test]
    fn targets_look_through_arrays_and_unions() {
        let person = NamedType::new("Person", Type::Json);
        let address = NamedType::new("Address", Type::Json);
        let ty = Type::union([
            Type::array(person.clone().into()),
            Type::Named(address),
            Type::Named(person),
            Primitive::String.into(),
        ]);
        let names: Vec<_> = response_targets(&ty)
            .into_iter()
            .map(|named| named.identifier.as_str())
            .collect();
        assert_eq!(names, ["Person", "Address"]);
    }

    #[test]
    fn named_types_are_leaves() {
        let inner = NamedType::new("Inner", Type::Json);
        let outer = NamedType::new("Outer", Type::record([("inner", Type::Named(inner))]));
        let ty = Type::Named(outer);
        let targets = response_targets(&ty);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].identifier, "Outer");
    }
}
