//! The `Type → Schema` mapping shared by both producers.
//!
//! [`synthesize`] is the build-time flavour: it expands records and named
//! types structurally. [`crate::runtime`] reuses the same [`Synthesizer`] in
//! its runtime mode, where only attached metadata can answer for a named
//! type.
//!
//! ```rust
//! use artificial_core::{synthesize::synthesize, types::{Primitive, Type}};
//!
//! let schema = synthesize(&Type::array(Primitive::String.into())).unwrap();
//! assert_eq!(
//!     schema.to_compact_string().unwrap(),
//!     r#"{"type":"array","items":{"type":"string"}}"#,
//! );
//! ```
use indexmap::IndexMap;
use schemars::schema::InstanceType;

use crate::{
    error::{ArtificialError, Result},
    schema::Schema,
    types::{NamedType, Primitive, Type},
};

/// Which producer is asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The static analysis pass; named types and records are expanded.
    BuildTime,
    /// The runtime fallback; named types must carry attached metadata.
    Runtime,
}

/// Walks a [`Type`] and builds its [`Schema`].
///
/// Holds the stack of named types currently being expanded so a
/// self-reference is reported instead of recursing forever.
#[derive(Debug)]
pub struct Synthesizer {
    phase: Phase,
    expanding: Vec<String>,
}

impl Synthesizer {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            expanding: Vec::new(),
        }
    }

    pub fn synthesize(&mut self, ty: &Type) -> Result<Schema> {
        match ty {
            Type::Primitive(primitive) => Ok(primitive_schema(*primitive)),
            Type::Json => Ok(Schema::any_json()),
            Type::Array(element) => Ok(Schema::array(self.synthesize(element)?)),
            Type::Union(members) => self.union(ty, members),
            Type::Record(fields) if self.phase == Phase::BuildTime => {
                let mut properties = IndexMap::with_capacity(fields.len());
                for (name, field) in fields {
                    properties.insert(name.clone(), self.synthesize(field)?);
                }
                Ok(Schema::object(properties))
            }
            Type::Named(named) => self.named(named),
            Type::Record(_) | Type::Error | Type::Other { .. } => {
                Err(ArtificialError::unsupported(ty))
            }
        }
    }

    fn union(&mut self, ty: &Type, members: &[Type]) -> Result<Schema> {
        let mut schemas = members
            .iter()
            .map(|member| self.synthesize(member))
            .collect::<Result<Vec<_>>>()?;

        match schemas.len() {
            0 => Err(ArtificialError::unsupported(ty)),
            1 => Ok(schemas.remove(0)),
            _ => Ok(Schema::any_of(schemas)),
        }
    }

    fn named(&mut self, named: &NamedType) -> Result<Schema> {
        if let Some(attached) = named.attached_schema() {
            tracing::debug!(ty = %named.identifier, "using attached schema");
            return Schema::from_value(attached.clone());
        }

        if self.phase == Phase::Runtime {
            return Err(ArtificialError::MissingSchemaMapping {
                ty: named.identifier.clone(),
            });
        }

        if self.expanding.contains(&named.identifier) {
            return Err(ArtificialError::RecursiveType {
                name: named.identifier.clone(),
            });
        }

        self.expanding.push(named.identifier.clone());
        let schema = self.synthesize(&named.referred);
        self.expanding.pop();
        schema
    }
}

fn primitive_schema(primitive: Primitive) -> Schema {
    let kind = match primitive {
        Primitive::Boolean => InstanceType::Boolean,
        Primitive::Integer => InstanceType::Integer,
        // Byte data travels as numbers; the target has no byte-string format.
        Primitive::Float | Primitive::Decimal | Primitive::Byte => InstanceType::Number,
        Primitive::String => InstanceType::String,
        Primitive::Null => InstanceType::Null,
    };
    Schema::of(kind)
}

/// Build-time synthesis of `ty`.
pub fn synthesize(ty: &Type) -> Result<Schema> {
    Synthesizer::new(Phase::BuildTime).synthesize(ty)
}

/// Apply union-with-error filtering to the declared result type of a
/// model-invocation call.
///
/// * No error member: the type is returned unchanged.
/// * One non-error member left: that member.
/// * Several left: a union of them in declaration order.
/// * Nothing left: `None`, there is no response shape to describe.
///
/// Nested unions are flattened before filtering.
pub fn response_type(result: &Type) -> Option<Type> {
    let Type::Union(_) = result else {
        return (!result.is_error()).then(|| result.clone());
    };

    let mut members = Vec::new();
    flatten_union(result, &mut members);
    if !members.iter().any(|member| member.is_error()) {
        return Some(result.clone());
    }

    let mut remaining: Vec<Type> = members
        .into_iter()
        .filter(|member| !member.is_error())
        .cloned()
        .collect();

    match remaining.len() {
        0 => None,
        1 => remaining.pop(),
        _ => Some(Type::Union(remaining)),
    }
}

fn flatten_union<'t>(ty: &'t Type, out: &mut Vec<&'t Type>) {
    match ty {
        Type::Union(members) => members.iter().for_each(|member| flatten_union(member, out)),
        other => out.push(other),
    }
}

/// Synthesize the schema of a model call's response, after error filtering.
pub fn synthesize_response(result: &Type) -> Result<Option<Schema>> {
    response_type(result).as_ref().map(synthesize).transpose()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::schema_metadata_key;

    fn person() -> NamedType {
        NamedType::new(
            "Person",
            Type::record([
                ("name", Type::from(Primitive::String)),
                ("age", Type::from(Primitive::Integer)),
            ]),
        )
    }

    fn value_of(ty: &Type) -> serde_json::Value {
        synthesize(ty).unwrap().to_value().unwrap()
    }

    #[test]
    fn primitives() {
        assert_eq!(value_of(&Primitive::Integer.into()), json!({"type": "integer"}));
        assert_eq!(value_of(&Primitive::Boolean.into()), json!({"type": "boolean"}));
        assert_eq!(value_of(&Primitive::Decimal.into()), json!({"type": "number"}));
        assert_eq!(value_of(&Primitive::Byte.into()), json!({"type": "number"}));
        assert_eq!(value_of(&Primitive::Null.into()), json!({"type": "null"}));
    }

    #[test]
    fn json_enumerates_every_kind() {
        assert_eq!(
            value_of(&Type::Json),
            json!({"type": ["object", "array", "string", "number", "boolean", "null"]})
        );
    }

    #[test]
    fn record_behind_name() {
        assert_eq!(
            value_of(&Type::Named(person())),
            json!({
                "type": "object",
                "properties": {"name": {"type": "string"}, "age": {"type": "integer"}}
            })
        );
    }

    #[test]
    fn singleton_union_unwraps() {
        let inner = Type::array(Primitive::Float.into());
        assert_eq!(synthesize(&Type::union([inner.clone()])).unwrap(), synthesize(&inner).unwrap());
    }

    #[test]
    fn union_keeps_declaration_order() {
        let ty = Type::union([Primitive::String.into(), Primitive::Null.into()]);
        assert_eq!(
            value_of(&ty),
            json!({"anyOf": [{"type": "string"}, {"type": "null"}]})
        );
    }

    #[test]
    fn attached_schema_wins() {
        let named = person().with_metadata(schema_metadata_key(), json!({"type": "string"}));
        assert_eq!(value_of(&Type::Named(named)), json!({"type": "string"}));
    }

    #[test]
    fn unsupported_shapes_are_named() {
        let err = synthesize(&Type::array(Type::other("function () returns int"))).unwrap_err();
        assert!(matches!(
            err,
            ArtificialError::UnsupportedType { ref ty } if ty == "function () returns int"
        ));
        assert!(synthesize(&Type::Error).is_err());
        assert!(synthesize(&Type::Union(vec![])).is_err());
    }

    #[test]
    fn self_reference_is_rejected() {
        let inner = NamedType::new("Tree", Type::Json);
        let outer = NamedType::new("Tree", Type::record([("children", Type::array(inner.into()))]));
        let err = synthesize(&outer.into()).unwrap_err();
        assert!(matches!(err, ArtificialError::RecursiveType { ref name } if name == "Tree"));
    }

    #[test]
    fn same_name_in_sibling_positions_is_fine() {
        let id = NamedType::new("Id", Primitive::String.into());
        let ty = Type::record([("a", id.clone().into()), ("b", id.into())]);
        assert!(synthesize(&ty).is_ok());
    }

    #[test]
    fn deterministic() {
        let ty = Type::union([Type::Named(person()), Type::array(Type::Json)]);
        assert_eq!(synthesize(&ty).unwrap(), synthesize(&ty).unwrap());
    }

    #[test]
    fn response_drops_error_member() {
        let result = Type::union([Type::Named(person()), Type::Error]);
        assert_eq!(
            synthesize_response(&result).unwrap(),
            Some(synthesize(&Type::Named(person())).unwrap())
        );
    }

    #[test]
    fn response_keeps_every_non_error_member() {
        let custom_error = Type::Named(NamedType::new("ApiError", Type::Error));
        let result = Type::union([
            Primitive::String.into(),
            custom_error,
            Type::union([Primitive::Integer.into(), Type::Error]),
        ]);
        assert_eq!(
            response_type(&result),
            Some(Type::union([Primitive::String.into(), Primitive::Integer.into()]))
        );
    }

    #[test]
    fn response_without_error_is_untouched() {
        let result = Type::optional(Primitive::String.into());
        assert_eq!(response_type(&result), Some(result.clone()));
        assert_eq!(response_type(&Type::Error), None);
        assert_eq!(synthesize_response(&Type::union([Type::Error])).unwrap(), None);
    }
}
