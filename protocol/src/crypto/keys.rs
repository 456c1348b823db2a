//! # Key Material
//!
//! Curve points, ECDSA signatures and curve-tagged private keys.
//!
//! Every type here is curve-agnostic data: the actual arithmetic is
//! dispatched through [`Curve::ops`] so that a secp256k1 key and a p256 key
//! flow through the exact same transaction code.
//!
//! ## Security considerations
//!
//! - Private keys are supplied by the wallet layer as hex strings. This crate
//!   never persists or encrypts them.
//! - `PrivateKey`'s `Debug` output is redacted. Key bytes are never logged.

use std::fmt;

use thiserror::Error;

use super::curve::Curve;
use super::point::{point_to_string, AddressFormat};
use crate::config::{COORDINATE_LENGTH, SIGNATURE_LENGTH};

/// Errors from curve arithmetic, key parsing and address decoding.
///
/// Deliberately coarse: they say *what* was wrong with the input, never
/// anything about secret material.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid private key for {curve}")]
    InvalidPrivateKey { curve: Curve },

    #[error("point is not on {curve}")]
    PointNotOnCurve { curve: Curve },

    #[error("x coordinate has no matching y on {curve}")]
    NoPointForX { curve: Curve },

    #[error("invalid address encoding: {0}")]
    InvalidAddress(String),

    #[error("invalid point encoding: expected 33 or 64 bytes, got {0}")]
    InvalidPointLength(usize),

    #[error("invalid compressed prefix {0}: expected 42 or 43")]
    InvalidCompressedPrefix(u8),

    #[error("invalid signature encoding: {0}")]
    InvalidSignature(String),

    #[error("unknown curve: {0}")]
    UnknownCurve(String),
}

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// An affine public point `(x, y)`, both coordinates 32 bytes big-endian.
///
/// A `Point` is just coordinates. Whether it lies on a given curve is a
/// separate question answered by [`Curve::is_on_curve`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    x: [u8; COORDINATE_LENGTH],
    y: [u8; COORDINATE_LENGTH],
}

impl Point {
    pub fn new(x: [u8; COORDINATE_LENGTH], y: [u8; COORDINATE_LENGTH]) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> &[u8; COORDINATE_LENGTH] {
        &self.x
    }

    pub fn y(&self) -> &[u8; COORDINATE_LENGTH] {
        &self.y
    }

    /// Parity of `y`, which is all a compressed encoding keeps of it.
    pub fn is_y_odd(&self) -> bool {
        self.y[COORDINATE_LENGTH - 1] & 1 == 1
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Point")
            .field("x", &hex::encode(self.x))
            .field("y", &hex::encode(self.y))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// An ECDSA signature as the two raw scalars `r` and `s`.
///
/// On the wire a signature is always `r || s`, each left-padded to 32 bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    r: [u8; 32],
    s: [u8; 32],
}

impl Signature {
    pub fn new(r: [u8; 32], s: [u8; 32]) -> Self {
        Self { r, s }
    }

    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// Parses a 64-byte `r || s` blob.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(CryptoError::InvalidSignature(format!(
                "expected {} bytes, got {}",
                SIGNATURE_LENGTH,
                bytes.len()
            )));
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        Ok(Self { r, s })
    }

    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..32].copy_from_slice(&self.r);
        out[32..].copy_from_slice(&self.s);
        out
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// `r == 0` can never come out of a real signer.
    pub fn has_zero_r(&self) -> bool {
        self.r.iter().all(|b| *b == 0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// PrivateKey
// ---------------------------------------------------------------------------

/// A 32-byte ECDSA secret scalar tagged with the curve it belongs to.
///
/// The same 32 bytes are a different key on secp256k1 and on p256, so the
/// curve travels with the secret and every operation dispatches on it.
///
/// # Examples
///
/// ```
/// use ecliptic_protocol::crypto::{Curve, PrivateKey};
///
/// let key = PrivateKey::generate(Curve::P256);
/// let sig = key.sign(b"preimage bytes").unwrap();
/// assert!(Curve::P256.verify(&key.public_point().unwrap(), b"preimage bytes", &sig));
/// ```
#[derive(Clone)]
pub struct PrivateKey {
    curve: Curve,
    secret: [u8; 32],
}

impl PrivateKey {
    /// Builds a key from raw secret bytes, rejecting zero and out-of-range
    /// scalars for the given curve.
    pub fn from_bytes(curve: Curve, bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidPrivateKey { curve });
        }
        let mut secret = [0u8; 32];
        secret.copy_from_slice(bytes);
        curve.ops().public_key_of(&secret)?;
        Ok(Self { curve, secret })
    }

    /// Parses the hex form the key-material provider hands us.
    pub fn from_hex(curve: Curve, hex_str: &str) -> Result<Self, CryptoError> {
        let bytes =
            hex::decode(hex_str.trim()).map_err(|_| CryptoError::InvalidPrivateKey { curve })?;
        Self::from_bytes(curve, &bytes)
    }

    /// Fresh key from the OS RNG.
    pub fn generate(curve: Curve) -> Self {
        Self {
            curve,
            secret: curve.ops().generate_secret(),
        }
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// The uncompressed public point for this key.
    pub fn public_point(&self) -> Result<Point, CryptoError> {
        self.curve.ops().public_key_of(&self.secret)
    }

    /// The address string of this key's public point.
    pub fn address(&self, format: AddressFormat) -> Result<String, CryptoError> {
        Ok(point_to_string(&self.public_point()?, format))
    }

    /// ECDSA-signs `message` on this key's curve. The curve's hash-then-sign
    /// applies SHA-256 to `message`; callers pass the raw preimage.
    pub fn sign(&self, message: &[u8]) -> Result<Signature, CryptoError> {
        self.curve.ops().sign(&self.secret, message)
    }

    /// Hex export of the secret. Handle with care.
    pub fn to_hex(&self) -> String {
        hex::encode(self.secret)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("curve", &self.curve)
            .field("secret", &"<redacted>")
            .finish()
    }
}
