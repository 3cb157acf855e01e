//! Typed binary field

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::Deref;

use super::serializer_utils::SerializerUtils;

/// Binary payload for typed records.
///
/// Serializes as a tagged buffer object, so a struct holding `Buffer` fields
/// shares the record format with [`Value`](super::Value). Deserializing also
/// accepts a bare base64 string or byte array.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Buffer(Bytes);

impl Buffer {
    /// Wrap bytes
    pub fn new(bytes: Bytes) -> Self {
        Self(bytes)
    }

    /// Unwrap into the underlying bytes
    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    /// Borrow the payload
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Deref for Buffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Bytes> for Buffer {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

impl From<&[u8]> for Buffer {
    fn from(bytes: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(bytes))
    }
}

impl<const N: usize> From<[u8; N]> for Buffer {
    fn from(bytes: [u8; N]) -> Self {
        Self(Bytes::copy_from_slice(&bytes))
    }
}

impl From<Buffer> for Bytes {
    fn from(buffer: Buffer) -> Self {
        buffer.0
    }
}

impl Serialize for Buffer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SerializerUtils::tagged_buffer(&self.0).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Buffer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        SerializerUtils::bytes_from_json(&json)
            .map(Buffer)
            .map_err(serde::de::Error::custom)
    }
}
