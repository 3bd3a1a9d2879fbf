//! The `response_format` payload that carries a schema to the provider.
//!
//! ```rust
//! use artificial_core::{response_format::ResponseFormat, schema::Schema};
//! use schemars::schema::InstanceType;
//!
//! let format = ResponseFormat::json_schema("answer", Schema::of(InstanceType::Integer))
//!     .strict(true);
//! assert_eq!(
//!     format.to_value().unwrap(),
//!     serde_json::json!({
//!         "type": "json_schema",
//!         "json_schema": {"name": "answer", "schema": {"type": "integer"}, "strict": true}
//!     }),
//! );
//! ```
use serde::Serialize;
use serde_json::Value;

use crate::{error::Result, schema::Schema};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    JsonSchema { json_schema: JsonSchemaFormat },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonSchemaFormat {
    pub name: String,
    pub schema: Schema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

impl ResponseFormat {
    pub fn json_schema(name: impl Into<String>, schema: Schema) -> Self {
        ResponseFormat::JsonSchema {
            json_schema: JsonSchemaFormat {
                name: name.into(),
                schema,
                strict: None,
            },
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        let ResponseFormat::JsonSchema { json_schema } = &mut self;
        json_schema.strict = Some(strict);
        self
    }

    pub fn schema(&self) -> &Schema {
        let ResponseFormat::JsonSchema { json_schema } = self;
        &json_schema.schema
    }

    /// Render into the JSON value forwarded as the request's
    /// `response_format`.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use schemars::schema::InstanceType;
    use serde_json::json;

    use super::*;

    #[test]
    fn strict_is_omitted_unless_set() {
        let format =
            ResponseFormat::json_schema("tags", Schema::array(Schema::of(InstanceType::String)));
        assert_eq!(
            format.to_value().unwrap(),
            json!({
                "type": "json_schema",
                "json_schema": {
                    "name": "tags",
                    "schema": {"type": "array", "items": {"type": "string"}}
                }
            })
        );
    }
}
