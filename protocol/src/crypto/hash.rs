//! # Hashing Utilities
//!
//! Ecliptic uses exactly one hash function on the wire: SHA-256. Transaction
//! IDs are `sha256(hex(full = true))`, single-hashed. ECDSA signing hashes
//! the preimage with SHA-256 internally (see [`super::curve`]), so nothing in
//! this module is applied to the preimage before signing.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use ecliptic_protocol::crypto::sha256;
///
/// let hash = sha256(b"ecliptic");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// SHA-256 as a lowercase hex string. This is the form transaction and block
/// hashes travel in over the node API.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}
