//! Serializer module for stored record payloads
//!
//! Every value written to the document store passes through this module:
//! typed values are lowered into the generic [`Value`] form, binary payloads
//! are tagged, and the result is written as compact JSON text. Reading runs
//! the same steps backwards, so `decode(encode(v)) == v` for every value,
//! byte payloads included.
//!
//! # Examples
//!
//! ```rust
//! use signal_auth_store::serializer::{buffer_json, Value};
//!
//! let value = Value::object([("key", Value::from(vec![1u8, 2, 3]))]);
//! let text = buffer_json::encode(&value)?;
//! assert_eq!(text, r#"{"key":{"type":"Buffer","data":[1,2,3]}}"#);
//! assert_eq!(buffer_json::decode(&text)?, value);
//! # Ok::<(), signal_auth_store::error::SerializerError>(())
//! ```

pub mod buffer_json;
pub mod serializer_buffer;
pub mod serializer_utils;
pub mod serializer_value;

// Re-export main types for convenience
pub use buffer_json::{decode, encode, from_value, to_value};
pub use serializer_buffer::Buffer;
pub use serializer_utils::SerializerUtils;
pub use serializer_value::Value;

/// Serialization constants
pub mod constants {
    //! Field names of the tagged buffer representation

    /// Tag value marking an object as a binary payload
    pub const BUFFER_TYPE_TAG: &str = "Buffer";

    /// Field holding the tag
    pub const TYPE_FIELD: &str = "type";

    /// Field holding the payload
    pub const DATA_FIELD: &str = "data";

    /// Boolean marker used by the older flag form
    pub const BUFFER_FLAG_FIELD: &str = "buffer";

    /// Payload field of the older flag form
    pub const VALUE_FIELD: &str = "value";
}
