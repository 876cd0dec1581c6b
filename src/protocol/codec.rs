//! Protocol codec
//!
//! JSON encoding and decoding for protocol bodies. Failures surface as
//! `StoreError::Serialization`; nothing on this path panics.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StoreError};

/// Maximum body size accepted by either side (16 MB)
pub const MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

/// Encode a request or response body
pub fn encode<T: Serialize>(body: &T) -> Result<Vec<u8>> {
    let bytes = serde_json::to_vec(body)?;
    if bytes.len() > MAX_BODY_SIZE {
        return Err(StoreError::Serialization(format!(
            "body too large: {} bytes (max {})",
            bytes.len(),
            MAX_BODY_SIZE
        )));
    }
    Ok(bytes)
}

/// Decode a request or response body
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    if bytes.len() > MAX_BODY_SIZE {
        return Err(StoreError::Serialization(format!(
            "body too large: {} bytes (max {})",
            bytes.len(),
            MAX_BODY_SIZE
        )));
    }
    Ok(serde_json::from_slice(bytes)?)
}
