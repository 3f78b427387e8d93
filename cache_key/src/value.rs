//! Parameter value definitions
//!
//! This module provides the primitive values a query parameter can hold
//! and conversions from common Rust types.

use serde::{Deserialize, Serialize};

use crate::errors::KeyError;

/// Primitive value of a query parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Multi-select value, treated as a set when keys are built
    List(Vec<ParamValue>),
}

impl ParamValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }

    /// Convert to the canonical JSON used inside cache keys.
    ///
    /// Returns `Ok(None)` when the value means "no filter" and must be left out of the key:
    /// null, text that is blank once trimmed, and text whose trimmed form is a sentinel.
    pub(crate) fn canonical(
        &self,
        name: &str,
        is_sentinel: &dyn Fn(&str) -> bool,
    ) -> Result<Option<serde_json::Value>, KeyError> {
        match self {
            ParamValue::List(items) => {
                let mut elements = Vec::with_capacity(items.len());
                for item in items {
                    if matches!(item, ParamValue::List(_)) {
                        return Err(KeyError::NestedList(name.to_string()));
                    }
                    if let Some(element) = item.canonical(name, is_sentinel)? {
                        elements.push((element.to_string(), element));
                    }
                }
                elements.sort_by(|a, b| a.0.cmp(&b.0));
                elements.dedup_by(|a, b| a.0 == b.0);

                if elements.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(serde_json::Value::Array(
                        elements.into_iter().map(|(_, value)| value).collect(),
                    )))
                }
            }
            ParamValue::Null => Ok(None),
            ParamValue::Text(text) => {
                // Omission is decided on the trimmed text; kept text is encoded as given
                let trimmed = text.trim();
                if trimmed.is_empty() || is_sentinel(trimmed) {
                    Ok(None)
                } else {
                    Ok(Some(serde_json::Value::String(text.clone())))
                }
            }
            ParamValue::Bool(b) => Ok(Some(serde_json::Value::Bool(*b))),
            ParamValue::Int(i) => Ok(Some(serde_json::Value::from(*i))),
            ParamValue::Float(f) => {
                // -0.0 and 0.0 are the same filter
                let normalized = if *f == 0.0 { 0.0 } else { *f };
                serde_json::Number::from_f64(normalized)
                    .map(|n| Some(serde_json::Value::Number(n)))
                    .ok_or_else(|| KeyError::NonFiniteFloat(name.to_string()))
            }
        }
    }
}

impl From<String> for ParamValue {
    fn from(val: String) -> Self {
        ParamValue::Text(val)
    }
}

impl From<&str> for ParamValue {
    fn from(val: &str) -> Self {
        ParamValue::Text(val.to_string())
    }
}

impl From<&String> for ParamValue {
    fn from(val: &String) -> Self {
        ParamValue::Text(val.clone())
    }
}

impl From<bool> for ParamValue {
    fn from(val: bool) -> Self {
        ParamValue::Bool(val)
    }
}

impl From<i16> for ParamValue {
    fn from(val: i16) -> Self {
        ParamValue::Int(val.into())
    }
}

impl From<i32> for ParamValue {
    fn from(val: i32) -> Self {
        ParamValue::Int(val.into())
    }
}

impl From<i64> for ParamValue {
    fn from(val: i64) -> Self {
        ParamValue::Int(val)
    }
}

impl From<u16> for ParamValue {
    fn from(val: u16) -> Self {
        ParamValue::Int(val.into())
    }
}

impl From<u32> for ParamValue {
    fn from(val: u32) -> Self {
        ParamValue::Int(val.into())
    }
}

impl From<f64> for ParamValue {
    fn from(val: f64) -> Self {
        ParamValue::Float(val)
    }
}

impl<T> From<Option<T>> for ParamValue
where
    T: Into<ParamValue>,
{
    fn from(val: Option<T>) -> Self {
        match val {
            Some(v) => v.into(),
            None => ParamValue::Null,
        }
    }
}

impl<T> From<Vec<T>> for ParamValue
where
    T: Into<ParamValue>,
{
    fn from(val: Vec<T>) -> Self {
        ParamValue::List(val.into_iter().map(Into::into).collect())
    }
}

impl TryFrom<serde_json::Value> for ParamValue {
    type Error = KeyError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Null => Ok(ParamValue::Null),
            serde_json::Value::Bool(b) => Ok(ParamValue::Bool(b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(ParamValue::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(ParamValue::Float(f))
                } else {
                    Err(KeyError::Unsupported(format!("number {}", n)))
                }
            }
            serde_json::Value::String(s) => Ok(ParamValue::Text(s)),
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(ParamValue::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(ParamValue::List),
            serde_json::Value::Object(_) => {
                Err(KeyError::Unsupported("object values".to_string()))
            }
        }
    }
}
