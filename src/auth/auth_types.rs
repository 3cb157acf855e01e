//! Key categories and keyed record values

use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, SerializerError, SerializerResult};
use crate::serializer::{buffer_json, Buffer, Value};

/// Category of a keyed record.
///
/// The wire name is the prefix of the record id: a `Session` record for id
/// `"42.0"` lives under `"session-42.0"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyCategory {
    /// One-time pre-key pairs
    PreKey,
    /// Signal sessions
    Session,
    /// Group sender keys
    SenderKey,
    /// Which participants already received a sender key
    SenderKeyMemory,
    /// App-state sync keys, rebuilt into [`AppStateSyncKeyData`] on read
    AppStateSyncKey,
    /// App-state collection versions
    AppStateSyncVersion,
    /// LID to phone-number mappings
    LidMapping,
    /// Known devices per user
    DeviceList,
    /// Trusted contact tokens
    Tctoken,
}

impl KeyCategory {
    /// Every category, in declaration order
    pub const ALL: [KeyCategory; 9] = [
        KeyCategory::PreKey,
        KeyCategory::Session,
        KeyCategory::SenderKey,
        KeyCategory::SenderKeyMemory,
        KeyCategory::AppStateSyncKey,
        KeyCategory::AppStateSyncVersion,
        KeyCategory::LidMapping,
        KeyCategory::DeviceList,
        KeyCategory::Tctoken,
    ];

    /// Wire name of the category
    pub const fn as_str(self) -> &'static str {
        match self {
            KeyCategory::PreKey => "pre-key",
            KeyCategory::Session => "session",
            KeyCategory::SenderKey => "sender-key",
            KeyCategory::SenderKeyMemory => "sender-key-memory",
            KeyCategory::AppStateSyncKey => "app-state-sync-key",
            KeyCategory::AppStateSyncVersion => "app-state-sync-version",
            KeyCategory::LidMapping => "lid-mapping",
            KeyCategory::DeviceList => "device-list",
            KeyCategory::Tctoken => "tctoken",
        }
    }
}

impl fmt::Display for KeyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| Error::InvalidInput {
                message: format!("unknown key category: {}", s),
            })
    }
}

/// Fingerprint of an app-state sync key
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppStateSyncKeyFingerprint {
    /// Raw key id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_id: Option<u32>,
    /// Index of the current key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_index: Option<u32>,
    /// Device indexes the key was shared with
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub device_indexes: Vec<u32>,
}

/// App-state sync key as the protocol engine consumes it
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppStateSyncKeyData {
    /// Raw key material
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_data: Option<Buffer>,
    /// Key fingerprint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<AppStateSyncKeyFingerprint>,
    /// Creation time in milliseconds
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_long"
    )]
    pub timestamp: Option<i64>,
}

impl AppStateSyncKeyData {
    /// Rebuild the typed key from its plain decoded form.
    ///
    /// Accepts what older writers stored as well: `keyData` as a base64
    /// string and `timestamp` as a decimal string or a `{low, high}` pair.
    pub fn from_object(value: Value) -> SerializerResult<Self> {
        buffer_json::from_value(value)
    }
}

/// 64-bit integer given as a number, a decimal string or a `{low, high}` pair
fn deserialize_long<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    use serde::de::Error as _;

    let json = serde_json::Value::deserialize(deserializer)?;
    match &json {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().and_then(|u| i64::try_from(u).ok()))
            .or_else(|| n.as_f64().and_then(integral_f64))
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {}", n))),
        serde_json::Value::String(s) => s
            .parse::<i64>()
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid timestamp {:?}: {}", s, e))),
        serde_json::Value::Object(map) => {
            let low = map.get("low").and_then(serde_json::Value::as_i64);
            let high = map.get("high").and_then(serde_json::Value::as_i64);
            match (low, high) {
                (Some(low), Some(high)) => Ok(Some((high << 32) | (low & 0xffff_ffff))),
                _ => Err(D::Error::custom("timestamp object needs low and high")),
            }
        }
        other => Err(D::Error::custom(format!("invalid timestamp: {}", other))),
    }
}

/// Whole-number float within `i64`, truncated
fn integral_f64(f: f64) -> Option<i64> {
    // `i64::MAX as f64` rounds up to 2^63
    (f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64)
        .then_some(f as i64)
}

/// Value of a keyed record
#[derive(Debug, Clone, PartialEq)]
pub enum SignalValue {
    /// Plain decoded form, used by every category but one
    Generic(Value),
    /// Rebuilt app-state sync key
    AppStateSyncKey(AppStateSyncKeyData),
}

impl SignalValue {
    /// Decode a stored value for `category`
    pub fn from_stored(category: KeyCategory, value: Value) -> SerializerResult<Self> {
        match category {
            KeyCategory::AppStateSyncKey => {
                AppStateSyncKeyData::from_object(value).map(SignalValue::AppStateSyncKey)
            }
            _ => Ok(SignalValue::Generic(value)),
        }
    }

    /// Plain form written to the store
    pub fn to_value(&self) -> SerializerResult<Cow<'_, Value>> {
        match self {
            SignalValue::Generic(value) => Ok(Cow::Borrowed(value)),
            SignalValue::AppStateSyncKey(key) => buffer_json::to_value(key).map(Cow::Owned),
        }
    }

    /// Whether writing this value means deleting the record
    pub fn is_falsy(&self) -> bool {
        match self {
            SignalValue::Generic(value) => value.is_falsy(),
            SignalValue::AppStateSyncKey(_) => false,
        }
    }

    /// Borrow the plain form
    pub fn as_generic(&self) -> Option<&Value> {
        match self {
            SignalValue::Generic(value) => Some(value),
            SignalValue::AppStateSyncKey(_) => None,
        }
    }

    /// Borrow the rebuilt app-state sync key
    pub fn as_app_state_sync_key(&self) -> Option<&AppStateSyncKeyData> {
        match self {
            SignalValue::AppStateSyncKey(key) => Some(key),
            SignalValue::Generic(_) => None,
        }
    }
}

impl From<Value> for SignalValue {
    fn from(value: Value) -> Self {
        SignalValue::Generic(value)
    }
}

impl From<AppStateSyncKeyData> for SignalValue {
    fn from(key: AppStateSyncKeyData) -> Self {
        SignalValue::AppStateSyncKey(key)
    }
}

impl TryFrom<SignalValue> for AppStateSyncKeyData {
    type Error = SerializerError;

    fn try_from(value: SignalValue) -> Result<Self, Self::Error> {
        match value {
            SignalValue::AppStateSyncKey(key) => Ok(key),
            SignalValue::Generic(value) => AppStateSyncKeyData::from_object(value),
        }
    }
}

/// Records fetched for one category, keyed by caller id
pub type SignalDataMap = HashMap<String, Option<SignalValue>>;

/// Batch of writes: category, then caller id, then value or `None` to delete
pub type SignalDataSet = BTreeMap<KeyCategory, SignalDataMap>;
