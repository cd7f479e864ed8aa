//! DynamoDB type-tagged attributes and their conversion into plain JSON.
//!
//! Stream images arrive as `{"name": {"S": "value"}, "age": {"N": "42"}}`. Every attribute is
//! a single-key object whose key names the type. [`decode`] strips those markers and returns
//! the plain document the webhook expects.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;

/// A stream image: attribute name to tagged value.
pub type Item = HashMap<String, AttributeValue>;

/// Largest integer an `f64` represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// One attribute as found in a stream image.
///
/// Shapes that do not match any known tag are kept verbatim in `Unrecognized` so a new
/// DynamoDB type never makes a whole record undeliverable.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum AttributeValue {
    Tagged(TaggedValue),
    Unrecognized(Value),
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum TaggedValue {
    #[serde(rename = "S")]
    S(String),
    #[serde(rename = "N")]
    N(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    #[serde(rename = "SS")]
    Ss(Vec<String>),
    #[serde(rename = "NS")]
    Ns(Vec<String>),
    /// Base64 encoded binary.
    #[serde(rename = "B")]
    B(String),
    #[serde(rename = "BS")]
    Bs(Vec<String>),
    #[serde(rename = "M")]
    M(Item),
    #[serde(rename = "L")]
    L(Vec<AttributeValue>),
}

impl From<TaggedValue> for AttributeValue {
    fn from(value: TaggedValue) -> Self {
        AttributeValue::Tagged(value)
    }
}

/// Decodes a whole image into a JSON object.
pub fn decode(item: Item) -> Value {
    Value::Object(
        item.into_iter()
            .map(|(name, value)| (name, decode_value(value)))
            .collect::<Map<String, Value>>(),
    )
}

/// Decodes a single attribute. Nested maps and lists are decoded to any depth.
pub fn decode_value(value: AttributeValue) -> Value {
    let tagged = match value {
        AttributeValue::Tagged(tagged) => tagged,
        AttributeValue::Unrecognized(raw) => return raw,
    };

    match tagged {
        TaggedValue::S(s) | TaggedValue::B(s) => Value::String(s),
        TaggedValue::N(n) => decode_number(n),
        TaggedValue::Bool(b) => Value::Bool(b),
        TaggedValue::Null(_) => Value::Null,
        TaggedValue::Ss(values) | TaggedValue::Bs(values) => {
            Value::Array(values.into_iter().map(Value::String).collect())
        }
        TaggedValue::Ns(values) => Value::Array(values.into_iter().map(decode_number).collect()),
        TaggedValue::M(item) => decode(item),
        TaggedValue::L(values) => Value::Array(values.into_iter().map(decode_value).collect()),
    }
}

/// Numbers go through `f64`. Integral values that fit are emitted as JSON integers; a string
/// that is not a finite number is kept as-is.
fn decode_number(raw: String) -> Value {
    let number = match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => return Value::String(raw),
    };

    if number.fract() == 0.0 && number.abs() <= MAX_SAFE_INTEGER {
        Value::from(number as i64)
    } else {
        Number::from_f64(number)
            .map(Value::Number)
            .unwrap_or(Value::String(raw))
    }
}
