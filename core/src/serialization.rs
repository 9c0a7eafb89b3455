//! JSON encoding and decoding under an explicit per-call convention.
//!
//! # Design
//! There is no global serializer state. Every call passes a [`Convention`]
//! that fixes the field-name case, the null policy and how strictly
//! unknown fields are treated. Conventions are applied to the JSON tree, so
//! the rules reach nested objects the same way they reach the top level.
//!
//! Keys that start with `_` (`_key`, `_id`, `_rev`, `_oldRev`, `_from`,
//! `_to`) are server system attributes and are never renamed.
//!
//! Encoding goes through `serde_json::Value`, whose object map keeps keys
//! sorted, so the same input always yields the same bytes.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ApiError, ClientError, Result};

/// How field names are written on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCase {
    /// Keys exactly as the Rust types declare them.
    AsDeclared,
    /// `snake_case` keys become `camelCase` on the way out, and back on the
    /// way in.
    CamelCase,
}

/// What happens to object members whose value is `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullHandling {
    Omit,
    Emit,
}

/// How decoding treats members the target type does not read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownFields {
    Ignore,
    Reject,
}

/// Serialization rules for one encode or decode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Convention {
    pub case: FieldCase,
    pub nulls: NullHandling,
    pub unknown_fields: UnknownFields,
}

impl Convention {
    /// Server metadata: camelCase keys, nulls omitted, extra fields ignored.
    pub const API: Convention = Convention {
        case: FieldCase::CamelCase,
        nulls: NullHandling::Omit,
        unknown_fields: UnknownFields::Ignore,
    };

    /// User data: keys untouched, nulls kept, extra fields ignored.
    pub const VERBATIM: Convention = Convention {
        case: FieldCase::AsDeclared,
        nulls: NullHandling::Emit,
        unknown_fields: UnknownFields::Ignore,
    };

    pub const fn with_case(self, case: FieldCase) -> Self {
        Convention { case, ..self }
    }

    pub const fn with_nulls(self, nulls: NullHandling) -> Self {
        Convention { nulls, ..self }
    }

    pub const fn with_unknown_fields(self, unknown_fields: UnknownFields) -> Self {
        Convention { unknown_fields, ..self }
    }
}

impl Default for Convention {
    fn default() -> Self {
        Convention::API
    }
}

/// Serializes `value` to JSON bytes under `convention`.
pub fn encode<T: Serialize + ?Sized>(value: &T, convention: Convention) -> Result<Bytes> {
    let tree = serde_json::to_value(value).map_err(|e| ClientError::Serialization(e.to_string()))?;
    let tree = outbound(tree, convention);
    serde_json::to_vec(&tree)
        .map(Bytes::from)
        .map_err(|e| ClientError::Serialization(e.to_string()))
}

/// Decodes a successful response body into `T`.
///
/// Missing required fields, wrong types and malformed JSON all yield
/// [`ClientError::Decode`] carrying `status`.
pub fn decode<T>(status: u16, body: &[u8], convention: Convention) -> Result<T>
where
    T: DeserializeOwned + Serialize,
{
    let tree: Value = serde_json::from_slice(body).map_err(|e| decode_failure(status, e))?;
    let tree = inbound(tree, convention.case);
    let decoded = T::deserialize(&tree).map_err(|e| decode_failure(status, e))?;

    if convention.unknown_fields == UnknownFields::Reject {
        let echo = serde_json::to_value(&decoded).map_err(|e| decode_failure(status, e))?;
        if let Some(path) = first_unknown(&tree, &echo, String::new()) {
            return Err(ClientError::Decode {
                status,
                message: format!("unknown field `{path}`"),
            });
        }
    }

    Ok(decoded)
}

/// Error body as the server sends it. Only `errorNum` and `errorMessage`
/// are needed to classify a failure.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<bool>,
    #[serde(alias = "errorNum")]
    error_num: i32,
    #[serde(alias = "errorMessage")]
    error_message: String,
    #[serde(default)]
    code: Option<u16>,
}

/// Decodes a failed response body into an [`ApiError`].
///
/// Never fails: when the body is not an error object, an error carrying the
/// raw status and its reason phrase is synthesized instead.
pub fn decode_error(status: u16, body: &[u8], convention: Convention) -> ApiError {
    let parsed = serde_json::from_slice::<Value>(body)
        .ok()
        .map(|tree| inbound(tree, convention.case))
        .and_then(|tree| ErrorBody::deserialize(&tree).ok());

    match parsed {
        Some(body) => ApiError {
            error: body.error.unwrap_or(true),
            error_num: body.error_num,
            error_message: body.error_message,
            code: body.code.unwrap_or(status),
        },
        None => ApiError::synthesized(status, generic_message(status)),
    }
}

fn generic_message(status: u16) -> String {
    let reason = reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason());
    match reason {
        Some(reason) => format!("HTTP {status} {reason}"),
        None => format!("HTTP {status}"),
    }
}

fn decode_failure(status: u16, err: serde_json::Error) -> ClientError {
    ClientError::Decode {
        status,
        message: err.to_string(),
    }
}

fn outbound(value: Value, convention: Convention) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !(convention.nulls == NullHandling::Omit && v.is_null()))
                .map(|(k, v)| {
                    let key = match convention.case {
                        FieldCase::AsDeclared => k,
                        FieldCase::CamelCase => to_camel_case(&k),
                    };
                    (key, outbound(v, convention))
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(|v| outbound(v, convention)).collect()),
        other => other,
    }
}

fn inbound(value: Value, case: FieldCase) -> Value {
    if case == FieldCase::AsDeclared {
        return value;
    }
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (to_snake_case(&k), inbound(v, case)))
                .collect::<Map<_, _>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(|v| inbound(v, case)).collect()),
        other => other,
    }
}

/// First member present (and non-null) in `payload` that the decoded value
/// does not carry, as a dotted path.
fn first_unknown(payload: &Value, echo: &Value, path: String) -> Option<String> {
    match (payload, echo) {
        (Value::Object(fields), Value::Object(known)) => fields.iter().find_map(|(key, value)| {
            if value.is_null() {
                return None;
            }
            let child = if path.is_empty() { key.clone() } else { format!("{path}.{key}") };
            match known.get(key) {
                None => Some(child),
                Some(echoed) => first_unknown(value, echoed, child),
            }
        }),
        (Value::Array(items), Value::Array(echoed)) => items
            .iter()
            .zip(echoed)
            .enumerate()
            .find_map(|(i, (value, echoed))| first_unknown(value, echoed, format!("{path}[{i}]"))),
        _ => None,
    }
}

fn to_camel_case(key: &str) -> String {
    if key.starts_with('_') {
        return key.to_string();
    }
    let mut result = String::with_capacity(key.len());
    let mut upper = false;
    for ch in key.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            result.extend(ch.to_uppercase());
            upper = false;
        } else {
            result.push(ch);
        }
    }
    result
}

fn to_snake_case(key: &str) -> String {
    if key.starts_with('_') {
        return key.to_string();
    }
    let mut result = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            result.push('_');
            result.push(ch.to_ascii_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}
