//! BufferJSON codec
//!
//! The one durable format this crate owns. Records are compact JSON; every
//! binary payload is written as `{"type":"Buffer","data":[..]}` and revived
//! into [`Value::Bytes`] on the way back. Reviving also accepts the base64
//! payloads and the `{"buffer":true,"value":..}` flag form older writers used,
//! so records written before the numeric form stay readable.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as Json;

use super::serializer_utils::SerializerUtils;
use super::serializer_value::Value;
use crate::error::{SerializerError, SerializerResult};

/// Lower a [`Value`] into tagged JSON
pub fn replace(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Number(n) => Json::Number(n.clone()),
        Value::String(s) => Json::String(s.clone()),
        Value::Bytes(b) => SerializerUtils::tagged_buffer(b),
        Value::Array(items) => Json::Array(items.iter().map(replace).collect()),
        Value::Object(map) => Json::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), replace(v)))
                .collect(),
        ),
    }
}

/// Lift tagged JSON into a [`Value`], turning tagged buffers into bytes
pub fn revive(json: Json) -> SerializerResult<Value> {
    Ok(match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => Value::Number(n),
        Json::String(s) => Value::String(s),
        Json::Array(items) => Value::Array(
            items
                .into_iter()
                .map(revive)
                .collect::<SerializerResult<_>>()?,
        ),
        Json::Object(map) if SerializerUtils::is_tagged_buffer(&map) => {
            Value::Bytes(SerializerUtils::tagged_payload(&map)?)
        }
        Json::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| revive(v).map(|v| (k, v)))
                .collect::<SerializerResult<_>>()?,
        ),
    })
}

/// Encode a value as record text
pub fn encode(value: &Value) -> SerializerResult<String> {
    serde_json::to_string(&replace(value)).map_err(|e| SerializerError::SerializationFailed {
        reason: e.to_string(),
    })
}

/// Decode record text into a value
pub fn decode(text: &str) -> SerializerResult<Value> {
    let json: Json = serde_json::from_str(text)?;
    revive(json)
}

/// Convert a typed value into the generic form.
///
/// Object keys come out sorted, so equal inputs always encode to identical
/// text.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> SerializerResult<Value> {
    let json = serde_json::to_value(value).map_err(|e| SerializerError::SerializationFailed {
        reason: e.to_string(),
    })?;
    revive(json)
}

/// Rebuild a typed value from the generic form
pub fn from_value<T: DeserializeOwned>(value: Value) -> SerializerResult<T> {
    serde_json::from_value(replace(&value)).map_err(|e| SerializerError::DeserializationFailed {
        reason: e.to_string(),
    })
}

/// Encode a typed value as record text
pub fn to_string<T: Serialize + ?Sized>(value: &T) -> SerializerResult<String> {
    encode(&to_value(value)?)
}

/// Decode record text into a typed value
pub fn from_str<T: DeserializeOwned>(text: &str) -> SerializerResult<T> {
    from_value(decode(text)?)
}
