use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::Error;

/// Feature values of a single add or predict call, keyed by feature name
pub type FeatureMap = HashMap<String, FeatureValue>;

/// A raw value handed in by a caller: either one scalar or an ordered list of scalars
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Value")]
pub enum FeatureValue {
    /// One value
    Single(String),
    /// Aligned values of a batch, one per row
    Many(Vec<String>),
}

impl FeatureValue {
    /// The scalar, if this is not a list
    pub fn as_single(&self) -> Option<&str> {
        match self {
            FeatureValue::Single(v) => Some(v),
            FeatureValue::Many(_) => None,
        }
    }

    /// The list, if this is not a scalar
    pub fn as_many(&self) -> Option<&[String]> {
        match self {
            FeatureValue::Single(_) => None,
            FeatureValue::Many(vs) => Some(vs),
        }
    }
}

fn scalar_to_string(value: &Value) -> Result<String, Error> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(Error::InvalidFeatureValue(other.to_string())),
    }
}

impl TryFrom<Value> for FeatureValue {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Array(items) => {
                Ok(FeatureValue::Many(items.iter().map(scalar_to_string).collect::<Result<_, _>>()?))
            }
            other => Ok(FeatureValue::Single(scalar_to_string(&other)?)),
        }
    }
}

impl From<&str> for FeatureValue {
    fn from(v: &str) -> Self {
        FeatureValue::Single(v.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(v: String) -> Self {
        FeatureValue::Single(v)
    }
}

impl From<i64> for FeatureValue {
    fn from(v: i64) -> Self {
        FeatureValue::Single(v.to_string())
    }
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        FeatureValue::Single(v.to_string())
    }
}

impl<T> From<Vec<T>> for FeatureValue
where
    T: ToString,
{
    fn from(vs: Vec<T>) -> Self {
        FeatureValue::Many(vs.iter().map(|v| v.to_string()).collect())
    }
}
