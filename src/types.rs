use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use std::cmp::Ordering;
use std::fmt;

/// One row of a query result. Well-formed rows are JSON objects; anything
/// else is carried through to the output but ignored during inference.
pub type Row = Value;

/// Field name -> declared schema, in first-seen order
pub type Properties = IndexMap<String, FieldSchema>;

/// Primitive type tag declared for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Null,
    Boolean,
    Number,
    String,
    Object,
    Array,
}

impl FieldType {
    /// Tag a value. `None` means the value is null: it makes the field
    /// nullable but contributes no type.
    ///
    /// Booleans are matched before numbers, and integral and fractional
    /// numbers share the `number` tag.
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(FieldType::Boolean),
            Value::Number(_) => Some(FieldType::Number),
            Value::String(_) => Some(FieldType::String),
            Value::Object(_) => Some(FieldType::Object),
            Value::Array(_) => Some(FieldType::Array),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Null => "null",
            FieldType::Boolean => "boolean",
            FieldType::Number => "number",
            FieldType::String => "string",
            FieldType::Object => "object",
            FieldType::Array => "array",
        }
    }
}

// Ordered by name so declared type lists sort lexicographically.
impl Ord for FieldType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for FieldType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Declared schema of a single field, serialized as `{"type": [...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSchema {
    #[serde(skip)]
    pub name: String,

    /// Always starts with `null`; never empty
    #[serde(rename = "type")]
    pub declared_types: Vec<FieldType>,
}

impl FieldSchema {
    /// Build the declared schema from the non-null types observed for a field.
    /// A field with no decidable type falls back to `["null", "string"]`.
    pub fn from_observed<I>(name: impl Into<String>, observed: I) -> Self
    where
        I: IntoIterator<Item = FieldType>,
    {
        let mut types: Vec<FieldType> = observed
            .into_iter()
            .filter(|t| *t != FieldType::Null)
            .collect();
        types.sort();
        types.dedup();

        if types.is_empty() {
            types.push(FieldType::String);
        }

        let mut declared_types = Vec::with_capacity(types.len() + 1);
        declared_types.push(FieldType::Null);
        declared_types.extend(types);

        FieldSchema {
            name: name.into(),
            declared_types,
        }
    }

    /// Declared types as their schema names
    pub fn type_names(&self) -> Vec<&'static str> {
        self.declared_types.iter().map(|t| t.as_str()).collect()
    }
}

/// Structural schema of the single stream produced by one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSchema {
    pub stream_id: String,
    pub properties: Properties,
    additional_properties_allowed: bool,
    pub key_properties: Vec<String>,
}

impl StreamSchema {
    pub fn new(
        stream_id: impl Into<String>,
        properties: Properties,
        key_properties: Vec<String>,
    ) -> Self {
        StreamSchema {
            stream_id: stream_id.into(),
            properties,
            additional_properties_allowed: false,
            key_properties,
        }
    }

    /// The JSON Schema body declared in SCHEMA messages
    pub fn json_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": self.properties,
            "additionalProperties": self.additional_properties_allowed,
        })
    }
}
