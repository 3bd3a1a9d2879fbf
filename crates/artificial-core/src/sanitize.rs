//! Lowering of externally produced JSON Schema into the constrained dialect.
//!
//! Generic mappers (schemars with OpenAPI settings, hand-written schemas,
//! provider tooling) emit far more vocabulary than the structured-output
//! endpoint accepts. [`sanitize`] rebuilds every node from the raw JSON,
//! keeping only what [`Schema`] can hold:
//!
//! * a node with `allOf`, `anyOf` or `oneOf` loses its own `type`; `oneOf`
//!   is lowered to `anyOf`, `allOf` branches are folded into the node,
//! * `type: string` with `format: byte` becomes `type: number`,
//! * OpenAPI `nullable: true` becomes an extra `null` kind, or an extra
//!   `null` branch on nodes with `anyOf`,
//! * `items: false` and properties whose schema is `false` are dropped,
//! * everything else (constraints, annotations, `$ref`, conditionals, …)
//!   is dropped.
//!
//! ```rust
//! use artificial_core::sanitize::sanitize;
//! use serde_json::json;
//!
//! let raw = json!({
//!     "$schema": "http://json-schema.org/draft-07/schema#",
//!     "title": "Tag",
//!     "type": "string",
//!     "minLength": 1
//! });
//! let schema = sanitize(&raw).unwrap();
//! assert_eq!(schema.to_compact_string().unwrap(), r#"{"type":"string"}"#);
//! ```
use indexmap::IndexMap;
use schemars::schema::{InstanceType, SingleOrVec};
use serde_json::{Map, Value};

use crate::{
    error::{ArtificialError, Result},
    schema::Schema,
};

const KEEP: &[&str] = &["type", "items", "properties", "anyOf", "oneOf", "allOf"];

/// Sanitize `raw` into the output dialect.
pub fn sanitize(raw: &Value) -> Result<Schema> {
    sanitize_node(raw, "#")
}

/// Sanitize and serialize in the compact single-line form.
pub fn sanitize_to_string(raw: &Value) -> Result<String> {
    sanitize(raw)?.to_compact_string()
}

fn sanitize_node(raw: &Value, path: &str) -> Result<Schema> {
    match raw {
        Value::Object(node) => sanitize_object(node, path),
        Value::Bool(true) => Ok(Schema::default()),
        Value::Bool(false) => Err(ArtificialError::InvalidSchema(format!(
            "`{path}` rejects every value and cannot be expressed"
        ))),
        other => Err(ArtificialError::InvalidSchema(format!(
            "expected a schema object at `{path}`, found `{other}`"
        ))),
    }
}

fn sanitize_object(node: &Map<String, Value>, path: &str) -> Result<Schema> {
    for key in node.keys().filter(|key| !KEEP.contains(&key.as_str())) {
        tracing::trace!(path, keyword = %key, "dropping unsupported keyword");
    }

    let mut schema = Schema {
        instance_type: instance_type(node, path)?,
        items: match node.get("items") {
            // Closed tuple: positional items were already dropped with `prefixItems`.
            Some(Value::Bool(false)) | None => None,
            Some(items) => Some(Box::new(sanitize_items(items, &format!("{path}/items"))?)),
        },
        properties: match node.get("properties") {
            Some(properties) => Some(sanitize_properties(properties, path)?),
            None => None,
        },
        any_of: None,
    };

    let composed = ["allOf", "anyOf", "oneOf"]
        .iter()
        .any(|keyword| node.contains_key(*keyword));
    if composed {
        schema.instance_type = None;
    }

    if let Some(all_of) = node.get("allOf") {
        for branch in sanitize_branches(all_of, &format!("{path}/allOf"))? {
            absorb(&mut schema, branch);
        }
    }

    let mut any_of = Vec::new();
    for keyword in ["anyOf", "oneOf"] {
        if let Some(branches) = node.get(keyword) {
            any_of.extend(sanitize_branches(branches, &format!("{path}/{keyword}"))?);
        }
    }
    let nullable = node.get("nullable").and_then(Value::as_bool) == Some(true);
    if !any_of.is_empty() {
        // A direct type is never combined with anyOf in the dialect.
        schema.instance_type = None;
        schema.any_of = Some(any_of);
    }
    if composed && nullable {
        allow_null(&mut schema);
    }

    Ok(schema)
}

fn instance_type(
    node: &Map<String, Value>,
    path: &str,
) -> Result<Option<SingleOrVec<InstanceType>>> {
    let Some(raw) = node.get("type") else {
        return Ok(None);
    };

    let mut kinds = match raw {
        Value::String(kind) => vec![parse_kind(kind, path)?],
        Value::Array(kinds) => kinds
            .iter()
            .map(|kind| match kind {
                Value::String(kind) => parse_kind(kind, path),
                other => Err(ArtificialError::InvalidSchema(format!(
                    "`{path}/type` lists a non-string kind `{other}`"
                ))),
            })
            .collect::<Result<Vec<_>>>()?,
        other => {
            return Err(ArtificialError::InvalidSchema(format!(
                "`{path}/type` must be a string or a list, found `{other}`"
            )))
        }
    };

    // Override the byte → base64 string convention.
    let is_byte = node.get("format").and_then(Value::as_str) == Some("byte");
    if is_byte && kinds == [InstanceType::String] {
        kinds = vec![InstanceType::Number];
    }

    let nullable = node.get("nullable").and_then(Value::as_bool) == Some(true);
    if nullable && !kinds.is_empty() && !kinds.contains(&InstanceType::Null) {
        kinds.push(InstanceType::Null);
    }

    Ok(match kinds.len() {
        0 => None,
        1 => Some(SingleOrVec::Single(Box::new(kinds[0]))),
        _ => Some(SingleOrVec::Vec(kinds)),
    })
}

fn admits_null(schema: &Schema) -> bool {
    match &schema.instance_type {
        Some(SingleOrVec::Single(kind)) => **kind == InstanceType::Null,
        Some(SingleOrVec::Vec(kinds)) => kinds.contains(&InstanceType::Null),
        None => schema.is_empty(),
    }
}

/// Make a composed node admit `null`: as an extra branch when it has
/// `anyOf`, as an extra kind otherwise. An untyped node already admits it.
fn allow_null(schema: &mut Schema) {
    if let Some(branches) = &mut schema.any_of {
        if !branches.iter().any(admits_null) {
            branches.push(Schema::of(InstanceType::Null));
        }
        return;
    }

    schema.instance_type = match schema.instance_type.take() {
        None => None,
        Some(SingleOrVec::Single(kind)) if *kind == InstanceType::Null => {
            Some(SingleOrVec::Single(kind))
        }
        Some(SingleOrVec::Single(kind)) => Some(SingleOrVec::Vec(vec![*kind, InstanceType::Null])),
        Some(SingleOrVec::Vec(mut kinds)) => {
            if !kinds.contains(&InstanceType::Null) {
                kinds.push(InstanceType::Null);
            }
            Some(SingleOrVec::Vec(kinds))
        }
    };
}

fn parse_kind(kind: &str, path: &str) -> Result<InstanceType> {
    serde_json::from_value(Value::String(kind.to_string())).map_err(|_| {
        ArtificialError::InvalidSchema(format!("`{path}/type` has unknown kind `{kind}`"))
    })
}

fn sanitize_items(items: &Value, path: &str) -> Result<Schema> {
    let Value::Array(tuple) = items else {
        return sanitize_node(items, path);
    };

    let mut elements = tuple
        .iter()
        .enumerate()
        .map(|(idx, element)| sanitize_node(element, &format!("{path}/{idx}")))
        .collect::<Result<Vec<_>>>()?;
    match elements.len() {
        0 => Ok(Schema::default()),
        1 => Ok(elements.remove(0)),
        _ => Ok(Schema::any_of(elements)),
    }
}

fn sanitize_properties(properties: &Value, path: &str) -> Result<IndexMap<String, Schema>> {
    let Value::Object(properties) = properties else {
        return Err(ArtificialError::InvalidSchema(format!(
            "`{path}/properties` must be an object"
        )));
    };

    properties
        .iter()
        .filter(|(name, property)| {
            let forbidden = matches!(property, Value::Bool(false));
            if forbidden {
                tracing::trace!(
                    path,
                    property = %name,
                    "dropping property that rejects every value"
                );
            }
            !forbidden
        })
        .map(|(name, property)| {
            let schema = sanitize_node(property, &format!("{path}/properties/{name}"))?;
            Ok((name.clone(), schema))
        })
        .collect()
}

fn sanitize_branches(branches: &Value, path: &str) -> Result<Vec<Schema>> {
    let Value::Array(branches) = branches else {
        return Err(ArtificialError::InvalidSchema(format!(
            "`{path}` must be a list of schemas"
        )));
    };

    branches
        .iter()
        .enumerate()
        .map(|(idx, branch)| sanitize_node(branch, &format!("{path}/{idx}")))
        .collect()
}

/// Fold an `allOf` branch into `target`. Fields already set on the target
/// stay; properties are merged with the target's entries taking precedence.
fn absorb(target: &mut Schema, branch: Schema) {
    if target.instance_type.is_none() {
        target.instance_type = branch.instance_type;
    }
    if target.items.is_none() {
        target.items = branch.items;
    }
    if let Some(branch_properties) = branch.properties {
        let properties = target.properties.get_or_insert_with(IndexMap::new);
        for (name, property) in branch_properties {
            properties.entry(name).or_insert(property);
        }
    }
    if let Some(branch_any_of) = branch.any_of {
        target.any_of.get_or_insert_with(Vec::new).extend(branch_any_of);
    }
}
