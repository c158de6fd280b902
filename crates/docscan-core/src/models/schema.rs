//! Named field schemas sent to the extraction collaborator.

use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

/// A named description of the target record shape.
///
/// The pipeline treats the schema body as opaque: it is generated once from
/// the record type and forwarded to the extraction collaborator unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSchema {
    /// Schema name, e.g. `Check` or `Receipt`.
    pub name: &'static str,

    /// JSON Schema for the record.
    pub schema: Value,
}

impl FieldSchema {
    /// Build the schema for a record type.
    pub fn for_type<T: JsonSchema>(name: &'static str) -> Self {
        let root = schemars::schema_for!(T);
        let schema = serde_json::to_value(root).unwrap_or(Value::Null);
        Self { name, schema }
    }

    /// Top-level property names listed by the schema.
    pub fn property_names(&self) -> Vec<&str> {
        self.schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| props.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}
