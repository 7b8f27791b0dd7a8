//! Content hashes recorded in run manifests.

use ::serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::SkimError;
use crate::serde::to_canonical_json_bytes;

/// Hex SHA-256 of the canonical JSON form of `value`.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, SkimError> {
    let digest = Sha256::digest(to_canonical_json_bytes(value)?);
    Ok(format!("{digest:x}"))
}

/// Hex SHA-256 of raw bytes, used for calibration files.
pub fn bytes_hash_string(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
