//! Extraction schema: the structured output a conversation must produce.
//!
//! Each field carries a type, a requiredness flag, guidance text for the
//! model and optional validation rules. A field may point back at the topic
//! whose discussion is expected to fill it.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Accumulated field values, keyed by schema field name.
pub type Extractions = serde_json::Map<String, Value>;

/// JSON shape expected for an extracted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Enum,
    Array,
    Object,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Enum => "enum",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

/// Optional value constraints for a schema field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// Declarative definition of one extracted field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionSchemaField {
    pub field: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
}

/// A schema rule broken by an extracted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub reason: String,
}

impl FieldViolation {
    fn new(field: &str, reason: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

impl ExtractionSchemaField {
    /// Creates a field with no options, validation or topic link.
    pub fn new(
        field: impl Into<String>,
        field_type: FieldType,
        required: bool,
        description: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            field_type,
            required,
            description: description.into(),
            options: None,
            validation: None,
            topic_id: None,
        }
    }

    /// Sets the allowed enum values.
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    /// Sets validation rules.
    pub fn with_validation(mut self, validation: FieldValidation) -> Self {
        self.validation = Some(validation);
        self
    }

    /// Links the field to the topic that should fill it.
    pub fn with_topic(mut self, topic_id: impl Into<String>) -> Self {
        self.topic_id = Some(topic_id.into());
        self
    }

    /// Checks an extracted value against this field's type and rules.
    pub fn validate_value(&self, value: &Value) -> Result<(), FieldViolation> {
        match (self.field_type, value) {
            (FieldType::String, Value::String(s)) => self.check_string(s),
            (FieldType::Enum, Value::String(s)) => self.check_enum(s),
            (FieldType::Number, Value::Number(n)) => match n.as_f64() {
                Some(n) => self.check_number(n),
                None => Err(FieldViolation::new(&self.field, "number out of range")),
            },
            (FieldType::Boolean, Value::Bool(_)) => Ok(()),
            (FieldType::Array, Value::Array(items)) => self.check_length(items.len()),
            (FieldType::Object, Value::Object(_)) => Ok(()),
            (expected, _) => Err(FieldViolation::new(
                &self.field,
                format!("expected {}, got {}", expected.as_str(), json_type_name(value)),
            )),
        }
    }

    fn check_string(&self, s: &str) -> Result<(), FieldViolation> {
        self.check_length(s.chars().count())?;

        let pattern = self.validation.as_ref().and_then(|v| v.pattern.as_deref());
        if let Some(pattern) = pattern {
            let re = Regex::new(pattern).map_err(|e| {
                FieldViolation::new(&self.field, format!("invalid pattern: {}", e))
            })?;
            if !re.is_match(s) {
                return Err(FieldViolation::new(
                    &self.field,
                    format!("does not match pattern {}", pattern),
                ));
            }
        }
        Ok(())
    }

    fn check_enum(&self, s: &str) -> Result<(), FieldViolation> {
        match &self.options {
            Some(options) if !options.iter().any(|o| o == s) => Err(FieldViolation::new(
                &self.field,
                format!("'{}' is not one of [{}]", s, options.join(", ")),
            )),
            _ => Ok(()),
        }
    }

    fn check_number(&self, n: f64) -> Result<(), FieldViolation> {
        if let Some(validation) = &self.validation {
            if let Some(min) = validation.min {
                if n < min {
                    return Err(FieldViolation::new(&self.field, format!("{} is below {}", n, min)));
                }
            }
            if let Some(max) = validation.max {
                if n > max {
                    return Err(FieldViolation::new(&self.field, format!("{} is above {}", n, max)));
                }
            }
        }
        Ok(())
    }

    fn check_length(&self, len: usize) -> Result<(), FieldViolation> {
        if let Some(validation) = &self.validation {
            if let Some(min) = validation.min_length {
                if len < min {
                    return Err(FieldViolation::new(
                        &self.field,
                        format!("length {} is shorter than {}", len, min),
                    ));
                }
            }
            if let Some(max) = validation.max_length {
                if len > max {
                    return Err(FieldViolation::new(
                        &self.field,
                        format!("length {} is longer than {}", len, max),
                    ));
                }
            }
        }
        Ok(())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Returns true for values that carry no information: null, blank strings,
/// empty arrays and empty objects.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Looks up a field definition by name.
pub fn find_field<'a>(
    schema: &'a [ExtractionSchemaField],
    field: &str,
) -> Option<&'a ExtractionSchemaField> {
    schema.iter().find(|f| f.field == field)
}

/// Validates every non-empty extracted value that has a schema definition.
///
/// Values for unknown fields are not checked.
pub fn validate_extractions(
    schema: &[ExtractionSchemaField],
    extractions: &Extractions,
) -> Vec<FieldViolation> {
    extractions
        .iter()
        .filter(|(_, value)| !is_empty_value(value))
        .filter_map(|(name, value)| {
            find_field(schema, name).and_then(|field| field.validate_value(value).err())
        })
        .collect()
}

/// Required fields with no usable value in `extractions`, in schema order.
pub fn missing_required_fields(
    schema: &[ExtractionSchemaField],
    extractions: &Extractions,
) -> Vec<String> {
    schema
        .iter()
        .filter(|f| f.required)
        .filter(|f| extractions.get(&f.field).map_or(true, is_empty_value))
        .map(|f| f.field.clone())
        .collect()
}
