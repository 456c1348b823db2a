//! # Cryptographic Primitives for Ecliptic
//!
//! Everything the transaction engine needs from elliptic curves and hashing:
//!
//! - **SHA-256** for transaction and coinbase IDs.
//! - **ECDSA** on **secp256k1** and **p256**, dispatched through a per-curve
//!   capability table so transaction code never branches on curve names.
//! - The **point codec** turning public points into full (hex) and
//!   compressed (Base58) addresses and back.
//!
//! ## A note on "rolling your own crypto"
//!
//! We don't. Curve arithmetic and ECDSA come from the RustCrypto `k256` and
//! `p256` crates; this module only adapts them to the wire formats.

pub mod curve;
pub mod hash;
pub mod keys;
pub mod point;

pub use curve::{Curve, CurveOps};
pub use hash::{sha256, sha256_hex};
pub use keys::{CryptoError, Point, PrivateKey, Signature};
pub use point::{
    address_to_bytes, bytes_to_point, point_to_bytes, point_to_string, string_to_point,
    AddressFormat,
};
