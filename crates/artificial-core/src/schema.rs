//! The constrained JSON-Schema dialect accepted for structured output.
//!
//! A [`Schema`] node carries only `type`, `items`, `properties` and `anyOf`.
//! There is no way to represent any other keyword, so every value of this
//! type is already inside the output dialect.
use indexmap::IndexMap;
use schemars::schema::{InstanceType, SingleOrVec};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<SingleOrVec<InstanceType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,
    #[serde(rename = "anyOf", default, skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<Schema>>,
}

impl Schema {
    /// `{"type": <kind>}`
    pub fn of(kind: InstanceType) -> Self {
        Self {
            instance_type: Some(SingleOrVec::Single(Box::new(kind))),
            ..Self::default()
        }
    }

    /// `{"type": [<kinds>...]}`
    pub fn of_kinds(kinds: impl IntoIterator<Item = InstanceType>) -> Self {
        Self {
            instance_type: Some(SingleOrVec::Vec(kinds.into_iter().collect())),
            ..Self::default()
        }
    }

    /// Every kind a JSON value can take, in the dialect's canonical order.
    pub fn any_json() -> Self {
        Self::of_kinds([
            InstanceType::Object,
            InstanceType::Array,
            InstanceType::String,
            InstanceType::Number,
            InstanceType::Boolean,
            InstanceType::Null,
        ])
    }

    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::of(InstanceType::Array)
        }
    }

    pub fn object(properties: IndexMap<String, Schema>) -> Self {
        Self {
            properties: Some(properties),
            ..Self::of(InstanceType::Object)
        }
    }

    pub fn any_of(branches: Vec<Schema>) -> Self {
        Self {
            any_of: Some(branches),
            ..Self::default()
        }
    }

    /// The single declared kind, if the node has exactly one.
    pub fn single_kind(&self) -> Option<InstanceType> {
        match self.instance_type.as_ref()? {
            SingleOrVec::Single(kind) => Some(**kind),
            SingleOrVec::Vec(kinds) if kinds.len() == 1 => kinds.first().copied(),
            SingleOrVec::Vec(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Parse a previously serialized schema, e.g. one read back from
    /// attached metadata.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Canonical single-line form with no inter-token whitespace. This is the
    /// representation cached and embedded into annotations.
    pub fn to_compact_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn serializes_only_present_fields() {
        let schema = Schema::array(Schema::of(InstanceType::String));
        assert_eq!(
            schema.to_value().unwrap(),
            json!({"type": "array", "items": {"type": "string"}})
        );
    }

    #[test]
    fn compact_form_has_no_whitespace() {
        let mut properties = IndexMap::new();
        properties.insert("name".to_string(), Schema::of(InstanceType::String));
        properties.insert("age".to_string(), Schema::of(InstanceType::Integer));
        let compact = Schema::object(properties).to_compact_string().unwrap();
        assert_eq!(
            compact,
            r#"{"type":"object","properties":{"name":{"type":"string"},"age":{"type":"integer"}}}"#
        );
    }

    #[test]
    fn reads_back_attached_values() {
        let value = json!({"anyOf": [{"type": "null"}, {"type": ["string", "null"]}]});
        let schema = Schema::from_value(value.clone()).unwrap();
        assert_eq!(schema.any_of.as_ref().map(Vec::len), Some(2));
        assert_eq!(schema.to_value().unwrap(), value);
    }

    #[test]
    fn single_kind_of_multi_kind_node() {
        assert_eq!(Schema::any_json().single_kind(), None);
        assert_eq!(
            Schema::of(InstanceType::Number).single_kind(),
            Some(InstanceType::Number)
        );
    }
}
