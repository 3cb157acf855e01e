//! Utility functions for the signal auth store

/// Separator between a key category and the caller's id in a record id
pub const RECORD_ID_SEPARATOR: char = '-';

/// Build the store identifier of a keyed record
pub fn record_id(category: &str, id: &str) -> String {
    format!("{}{}{}", category, RECORD_ID_SEPARATOR, id)
}

/// File name used by the filesystem store for a record id
#[cfg(feature = "fs")]
pub fn record_file_name(id: &str) -> String {
    format!("{}.json", hex::encode(id))
}

/// Recover a record id from a file name written by [`record_file_name`]
#[cfg(feature = "fs")]
pub fn record_id_from_file_name(file_name: &str) -> Option<String> {
    let encoded = file_name.strip_suffix(".json")?;
    let bytes = hex::decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}
