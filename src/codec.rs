//! Payload Codec
//!
//! Converts structured values to and from the JSON text persisted in the store.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CacheError, Result};

/// Encodes a value into its storage payload.
///
/// Output is compact JSON, so `{"foo": "bar"}` is stored as `{"foo":"bar"}`.
pub fn encode<T>(value: &T) -> Result<String>
where
    T: Serialize + ?Sized,
{
    serde_json::to_string(value).map_err(CacheError::Serialization)
}

/// Decodes a storage payload back into a value.
///
/// An absent or empty payload means "no value" and yields `Ok(None)`.
pub fn decode<T>(payload: Option<&str>) -> Result<Option<T>>
where
    T: DeserializeOwned,
{
    match payload {
        None | Some("") => Ok(None),
        Some(text) => serde_json::from_str(text)
            .map(Some)
            .map_err(CacheError::Deserialization),
    }
}
