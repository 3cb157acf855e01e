//! Utility functions for serialization operations
//!
//! Helpers shared by the BufferJSON codec and the typed [`Buffer`](super::Buffer)
//! field type: recognising tagged buffer objects and turning the loose byte
//! shapes found in stored records (numeric arrays, base64 strings) into bytes.

use crate::error::{SerializerError, SerializerResult};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use bytes::Bytes;
use serde_json::{Map, Value as Json};

use super::constants::{BUFFER_FLAG_FIELD, BUFFER_TYPE_TAG, DATA_FIELD, TYPE_FIELD, VALUE_FIELD};

/// Standard alphabet, padding optional on decode.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Utility functions for serialization operations
pub struct SerializerUtils;

impl SerializerUtils {
    /// Build the tagged representation of a byte payload
    pub fn tagged_buffer(data: &[u8]) -> Json {
        let mut map = Map::with_capacity(2);
        map.insert(TYPE_FIELD.to_string(), Json::String(BUFFER_TYPE_TAG.to_string()));
        map.insert(
            DATA_FIELD.to_string(),
            Json::Array(data.iter().map(|b| Json::from(*b)).collect()),
        );
        Json::Object(map)
    }

    /// Check whether an object is a tagged buffer
    pub fn is_tagged_buffer(map: &Map<String, Json>) -> bool {
        map.get(TYPE_FIELD).and_then(Json::as_str) == Some(BUFFER_TYPE_TAG)
            || map.get(BUFFER_FLAG_FIELD).and_then(Json::as_bool) == Some(true)
    }

    /// Extract the payload of a tagged buffer object.
    ///
    /// The payload lives under `data`, or `value` for the older flag form. A
    /// missing payload is an empty buffer.
    pub fn tagged_payload(map: &Map<String, Json>) -> SerializerResult<Bytes> {
        match map.get(DATA_FIELD).or_else(|| map.get(VALUE_FIELD)) {
            None | Some(Json::Null) => Ok(Bytes::new()),
            Some(Json::String(encoded)) => Self::decode_base64(encoded),
            Some(Json::Array(items)) => Self::bytes_from_array(items),
            Some(other) => Err(SerializerError::InvalidFormat {
                expected: "base64 string or byte array".to_string(),
                actual: Self::json_kind(other).to_string(),
            }),
        }
    }

    /// Convert any accepted byte shape into bytes.
    ///
    /// Accepts a tagged buffer object, a base64 string or an array of bytes.
    pub fn bytes_from_json(json: &Json) -> SerializerResult<Bytes> {
        match json {
            Json::Object(map) if Self::is_tagged_buffer(map) => Self::tagged_payload(map),
            Json::String(encoded) => Self::decode_base64(encoded),
            Json::Array(items) => Self::bytes_from_array(items),
            other => Err(SerializerError::InvalidFormat {
                expected: "binary payload".to_string(),
                actual: Self::json_kind(other).to_string(),
            }),
        }
    }

    /// Convert a JSON array of numbers into bytes
    pub fn bytes_from_array(items: &[Json]) -> SerializerResult<Bytes> {
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                item.as_u64()
                    .and_then(|n| u8::try_from(n).ok())
                    .ok_or_else(|| SerializerError::DeserializationFailed {
                        reason: format!("byte array member {} is not a byte: {}", index, item),
                    })
            })
            .collect::<SerializerResult<Vec<u8>>>()
            .map(Bytes::from)
    }

    /// Decode a base64 string, padding optional
    pub fn decode_base64(encoded: &str) -> SerializerResult<Bytes> {
        LENIENT_BASE64
            .decode(encoded)
            .map(Bytes::from)
            .map_err(|e| SerializerError::DeserializationFailed {
                reason: format!("invalid base64 payload: {}", e),
            })
    }

    /// Encode bytes as padded standard base64
    pub fn encode_base64(data: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(data)
    }

    /// Short name of a JSON value's kind, for error messages
    pub fn json_kind(json: &Json) -> &'static str {
        match json {
            Json::Null => "null",
            Json::Bool(_) => "boolean",
            Json::Number(_) => "number",
            Json::String(_) => "string",
            Json::Array(_) => "array",
            Json::Object(_) => "object",
        }
    }
}
