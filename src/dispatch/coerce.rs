//! @acp:module "Argument Coercion"
//! @acp:summary "Query and body values to positional operation arguments"
//! @acp:domain cli
//! @acp:layer service
//!
//! Request argument coercion
//!
//! Turns the query string and body of one request into the positional
//! argument list of an operation, one slot per declared parameter.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Number, Value};

use crate::registry::ParamType;

/// Parameter name that receives the whole request body
pub const BODY_PARAM: &str = "body";

/// Positional arguments of one invocation; `None` is an absent value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args(Vec<Option<Value>>);

impl Args {
    pub fn new(values: Vec<Option<Value>>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index).and_then(Option::as_ref)
    }

    pub fn str(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(Value::as_str)
    }

    pub fn f64(&self, index: usize) -> Option<f64> {
        self.get(index).and_then(Value::as_f64)
    }

    pub fn i64(&self, index: usize) -> Option<i64> {
        self.get(index).and_then(Value::as_i64)
    }

    pub fn bool(&self, index: usize) -> Option<bool> {
        self.get(index).and_then(Value::as_bool)
    }

    /// Deserialize an argument into a typed payload
    pub fn parse<T: DeserializeOwned>(&self, index: usize) -> serde_json::Result<Option<T>> {
        self.get(index).cloned().map(serde_json::from_value).transpose()
    }

    pub fn into_inner(self) -> Vec<Option<Value>> {
        self.0
    }
}

impl From<Vec<Option<Value>>> for Args {
    fn from(values: Vec<Option<Value>>) -> Self {
        Self(values)
    }
}

/// Coerce one request into positional arguments
///
/// `names` and `types` are parallel; the dispatcher guarantees equal length.
pub fn coerce_arguments(
    names: &[String],
    types: &[ParamType],
    query: &HashMap<String, String>,
    body: &Value,
) -> Args {
    names
        .iter()
        .zip(types)
        .map(|(name, param_type)| {
            if name == BODY_PARAM {
                return (!body.is_null()).then(|| body.clone());
            }
            coerce_value(name, param_type, query, body)
        })
        .collect::<Vec<_>>()
        .into()
}

fn coerce_value(
    name: &str,
    param_type: &ParamType,
    query: &HashMap<String, String>,
    body: &Value,
) -> Option<Value> {
    let raw = query.get(name);
    match param_type {
        ParamType::Boolean => Some(Value::Bool(raw.is_some_and(|v| v == "true"))),
        ParamType::Number => raw.and_then(|v| parse_number(v)).map(Value::Number),
        ParamType::String | ParamType::Array => raw.map(|v| Value::String(v.clone())),
        ParamType::Object | ParamType::Named(_) => body.get(name).filter(|v| !v.is_null()).cloned(),
    }
}

/// Leading decimal literal of a query value, as a float parse reads it
static NUMBER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").unwrap());

/// Parse the numeric prefix of `raw` (`"12px"` reads as 12)
///
/// Integers stay integers. No numeric prefix, or a non-finite value, is
/// absent.
fn parse_number(raw: &str) -> Option<Number> {
    let literal = NUMBER_PREFIX.find(raw.trim_start())?.as_str();
    if let Ok(int) = literal.parse::<i64>() {
        return Some(Number::from(int));
    }
    literal.parse::<f64>().ok().and_then(Number::from_f64)
}
