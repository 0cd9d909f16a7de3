//! Integrity hashing for extracted clusters
//!
//! Downstream consumers use the hash to detect accidental mutation of an
//! extraction; it plays no part in aggregation.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `content`.
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// Hash of the JSON serialization of `payload` with object keys sorted.
///
/// Going through `serde_json::Value` orders every object's keys, so the hash
/// does not depend on struct field order.
pub fn integrity_hash<T: Serialize + ?Sized>(payload: &T) -> Result<String, serde_json::Error> {
    let value = serde_json::to_value(payload)?;
    let bytes = serde_json::to_vec(&value)?;
    Ok(content_hash(&bytes))
}
