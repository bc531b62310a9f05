//! JSON encoding of request content and two-stage decoding of response
//! bodies.
//!
//! # Design
//! Decoding first tries the body as JSON for the target type. When that
//! fails, the body is retried as a primitive: first the raw text as a string
//! value, so `String` targets, string-like newtypes and unit enum variants
//! accept unquoted text; then the text with surrounding Unicode whitespace
//! trimmed, parsed as a JSON scalar (number or boolean). Which stage
//! succeeded is reported through `Decoded`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ConnectorError;

/// Which decode stage produced the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded<R> {
    /// The body was valid JSON for `R`.
    Json(R),
    /// The body was only accepted through the primitive fallback.
    Primitive(R),
    /// The body was empty; nothing was decoded.
    Empty,
}

/// Serialize request content to JSON text. Numbers and booleans come out in
/// their plain string form.
pub fn encode_content<C: Serialize + ?Sized>(content: &C) -> Result<String, ConnectorError> {
    serde_json::to_string(content).map_err(ConnectorError::Serialization)
}

pub fn decode_body<R: DeserializeOwned>(body: &str) -> Result<Decoded<R>, ConnectorError> {
    if body.is_empty() {
        return Ok(Decoded::Empty);
    }

    let structured = match serde_json::from_str::<R>(body) {
        Ok(value) => return Ok(Decoded::Json(value)),
        Err(e) => e,
    };

    match decode_primitive(body) {
        Some(value) => Ok(Decoded::Primitive(value)),
        None => Err(ConnectorError::Deserialization {
            body: body.to_string(),
            source: structured,
        }),
    }
}

fn decode_primitive<R: DeserializeOwned>(body: &str) -> Option<R> {
    if let Ok(value) = serde_json::from_value(Value::String(body.to_string())) {
        return Some(value);
    }
    // serde_json only skips ASCII whitespace; `trim` also covers NBSP and friends.
    match serde_json::from_str::<Value>(body.trim()) {
        Ok(scalar @ (Value::Number(_) | Value::Bool(_))) => serde_json::from_value(scalar).ok(),
        _ => None,
    }
}
