//! Conversion between [`Value`]s and the strings kept in a key-value store.
//!
//! Stored entries are JSON text with one extension: numbers JSON cannot
//! represent are written as the tokens `Infinity`, `-Infinity` and `NaN`.
//! A top-level non-finite number is stored as the bare token, a nested one
//! as a JSON string holding the token. Tokens are only read back as numbers
//! where the reference shape expects a number, so a real string equal to a
//! token keeps its meaning.

use crate::value::{Value, ValueKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as Json};
use std::collections::BTreeMap;

pub const INFINITY_TOKEN: &str = "Infinity";
pub const NEG_INFINITY_TOKEN: &str = "-Infinity";
pub const NAN_TOKEN: &str = "NaN";

/// Must stay below the JSON parser's recursion limit (128) so that every
/// encoded entry can be decoded again.
pub const DEFAULT_MAX_DEPTH: usize = 100;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonFinitePolicy {
    /// Write non-finite numbers as tokens and read them back.
    #[default]
    Tokenize,
    /// Refuse to write non-finite numbers. Tokens are never decoded.
    Reject,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub non_finite: NonFinitePolicy,
    /// Maximum number of nested arrays/objects an encoded value may have.
    pub max_depth: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            non_finite: NonFinitePolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Stored text is not valid JSON: {0}")]
    Parse(serde_json::Error),
    #[error("Expected {expected} at ${path}, found {found}")]
    Shape {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("Non-finite number {0} cannot be stored")]
    Range(f64),
    #[error("Value cannot be serialized: {0}")]
    Serialize(String),
}

impl CodecError {
    fn mismatch(expected: &'static str, found: &Json) -> Self {
        CodecError::Shape {
            path: String::new(),
            expected,
            found: json_kind(found),
        }
    }

    fn within(self, segment: impl FnOnce() -> String) -> Self {
        match self {
            CodecError::Shape {
                path,
                expected,
                found,
            } => CodecError::Shape {
                path: format!("{}{path}", segment()),
                expected,
                found,
            },
            other => other,
        }
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => ValueKind::Boolean.name(),
        Json::Number(_) => ValueKind::Number.name(),
        Json::String(_) => ValueKind::String.name(),
        Json::Array(_) => ValueKind::Array.name(),
        Json::Object(_) => ValueKind::Object.name(),
    }
}

#[must_use]
pub fn non_finite_token(n: f64) -> Option<&'static str> {
    if n.is_nan() {
        Some(NAN_TOKEN)
    } else if n == f64::INFINITY {
        Some(INFINITY_TOKEN)
    } else if n == f64::NEG_INFINITY {
        Some(NEG_INFINITY_TOKEN)
    } else {
        None
    }
}

#[must_use]
pub fn token_value(token: &str) -> Option<f64> {
    match token {
        INFINITY_TOKEN => Some(f64::INFINITY),
        NEG_INFINITY_TOKEN => Some(f64::NEG_INFINITY),
        NAN_TOKEN => Some(f64::NAN),
        _ => None,
    }
}

/// Turns `value` into the string to store.
pub fn encode(value: &Value, config: &CodecConfig) -> Result<String, CodecError> {
    if let Value::Number(n) = value {
        if let Some(token) = non_finite_token(*n) {
            return match config.non_finite {
                NonFinitePolicy::Tokenize => Ok(token.to_owned()),
                NonFinitePolicy::Reject => Err(CodecError::Range(*n)),
            };
        }
    }

    let json = to_json(value, config, 0)?;
    serde_json::to_string(&json).map_err(|x| CodecError::Serialize(x.to_string()))
}

fn descend(depth: usize, config: &CodecConfig) -> Result<usize, CodecError> {
    let depth = depth + 1;
    if depth > config.max_depth {
        return Err(CodecError::Serialize(format!(
            "nested deeper than {} levels",
            config.max_depth
        )));
    }
    Ok(depth)
}

fn to_json(value: &Value, config: &CodecConfig, depth: usize) -> Result<Json, CodecError> {
    Ok(match value {
        Value::Boolean(b) => Json::Bool(*b),
        Value::Number(n) => match Number::from_f64(*n) {
            Some(number) => Json::Number(number),
            None => match (config.non_finite, non_finite_token(*n)) {
                (NonFinitePolicy::Tokenize, Some(token)) => Json::String(token.to_owned()),
                _ => return Err(CodecError::Range(*n)),
            },
        },
        Value::String(s) => Json::String(s.clone()),
        Value::Array(items) => {
            let depth = descend(depth, config)?;
            Json::Array(
                items
                    .iter()
                    .map(|x| to_json(x, config, depth))
                    .collect::<Result<_, _>>()?,
            )
        }
        Value::Object(map) => {
            let depth = descend(depth, config)?;
            let mut out = Map::new();
            for (key, item) in map {
                out.insert(key.clone(), to_json(item, config, depth)?);
            }
            Json::Object(out)
        }
    })
}

/// Reads a stored entry back, validating it against the shape of
/// `reference`.
///
/// Scalars must have the same kind as the reference. Arrays must be arrays
/// and, when the reference is non-empty, every element must match the
/// reference's first element. Objects must contain every key of the
/// reference with a matching value; extra keys are kept as they are.
pub fn decode(raw: &str, reference: &Value, config: &CodecConfig) -> Result<Value, CodecError> {
    let tokens = config.non_finite == NonFinitePolicy::Tokenize;

    if tokens && reference.kind() == ValueKind::Number {
        if let Some(n) = token_value(raw) {
            return Ok(Value::Number(n));
        }
    }

    let json: Json = serde_json::from_str(raw).map_err(CodecError::Parse)?;
    conform(json, reference, tokens, false)
}

/// String tokens only stand for numbers when `nested`; at the top level a
/// non-finite number is always stored as a bare token.
fn conform(json: Json, reference: &Value, tokens: bool, nested: bool) -> Result<Value, CodecError> {
    match (reference, json) {
        (Value::Boolean(_), Json::Bool(b)) => Ok(Value::Boolean(b)),
        (Value::Number(_), Json::Number(n)) => number(&n),
        (Value::Number(_), Json::String(s)) if tokens && nested => match token_value(&s) {
            Some(n) => Ok(Value::Number(n)),
            None => Err(CodecError::mismatch(
                ValueKind::Number.name(),
                &Json::String(s),
            )),
        },
        (Value::String(_), Json::String(s)) => Ok(Value::String(s)),
        (Value::Array(items), Json::Array(found)) => {
            let element = items.first();
            found
                .into_iter()
                .enumerate()
                .map(|(i, x)| {
                    let item = match element {
                        Some(element) => conform(x, element, tokens, true),
                        None => unconstrained(x),
                    };
                    item.map_err(|e| e.within(|| format!("[{i}]")))
                })
                .collect::<Result<_, _>>()
                .map(Value::Array)
        }
        (Value::Object(fields), Json::Object(mut found)) => {
            let mut out = BTreeMap::new();
            for (key, field) in fields {
                let Some(x) = found.remove(key) else {
                    return Err(CodecError::Shape {
                        path: format!(".{key}"),
                        expected: field.kind().name(),
                        found: "nothing",
                    });
                };
                let item = conform(x, field, tokens, true).map_err(|e| e.within(|| format!(".{key}")))?;
                out.insert(key.clone(), item);
            }
            for (key, x) in found {
                let item = unconstrained(x).map_err(|e| e.within(|| format!(".{key}")))?;
                out.insert(key, item);
            }
            Ok(Value::Object(out))
        }
        (reference, found) => Err(CodecError::mismatch(reference.kind().name(), &found)),
    }
}

fn number(n: &Number) -> Result<Value, CodecError> {
    n.as_f64()
        .map(Value::Number)
        .ok_or_else(|| CodecError::mismatch(ValueKind::Number.name(), &Json::Number(n.clone())))
}

/// Converts parts of an entry the reference says nothing about.
fn unconstrained(json: Json) -> Result<Value, CodecError> {
    match json {
        Json::Null => Err(CodecError::mismatch("a storable value", &Json::Null)),
        Json::Bool(b) => Ok(Value::Boolean(b)),
        Json::Number(n) => number(&n),
        Json::String(s) => Ok(Value::String(s)),
        Json::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, x)| unconstrained(x).map_err(|e| e.within(|| format!("[{i}]"))))
            .collect::<Result<_, _>>()
            .map(Value::Array),
        Json::Object(map) => map
            .into_iter()
            .map(|(k, x)| {
                let item = unconstrained(x).map_err(|e| e.within(|| format!(".{k}")))?;
                Ok::<_, CodecError>((k, item))
            })
            .collect::<Result<_, _>>()
            .map(Value::Object),
    }
}

#[cfg(test)]
mod tests;
