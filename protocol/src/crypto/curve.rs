//! # Curve Dispatch
//!
//! Ecliptic wallets live on one of two curves: secp256k1 or NIST p256. The
//! transaction format does not record which one a key belongs to, so the
//! curve is selected once, when an input or output is constructed, and every
//! later operation goes through that selection.
//!
//! Instead of `if curve == "p256"` scattered across the codebase, each curve
//! exposes the same capability table ([`CurveOps`]): sign, verify, recover a
//! point from `x`, derive a public key, check curve membership. [`Curve::ops`]
//! returns the table for a tag.
//!
//! Both backends are RustCrypto crates (`k256`, `p256`) with identical APIs,
//! so the table is stamped out by one macro.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::keys::{CryptoError, Point, Signature};

/// Which elliptic curve a key, input or output lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Curve {
    #[default]
    Secp256k1,
    P256,
}

impl Curve {
    /// The capability table for this curve.
    pub fn ops(self) -> &'static dyn CurveOps {
        match self {
            Curve::Secp256k1 => &SECP256K1,
            Curve::P256 => &P256,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Curve::Secp256k1 => "secp256k1",
            Curve::P256 => "p256",
        }
    }

    /// Shorthand for `self.ops().is_on_curve(point)`.
    pub fn is_on_curve(self, point: &Point) -> bool {
        self.ops().is_on_curve(point)
    }

    /// Shorthand for `self.ops().verify(..)`.
    pub fn verify(self, point: &Point, message: &[u8], signature: &Signature) -> bool {
        self.ops().verify(point, message, signature)
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Curve {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "secp256k1" => Ok(Curve::Secp256k1),
            "p256" | "secp256r1" | "prime256v1" => Ok(Curve::P256),
            other => Err(CryptoError::UnknownCurve(other.to_string())),
        }
    }
}

/// Per-curve ECDSA capabilities.
///
/// `sign` and `verify` take the raw message: the backend hashes it with
/// SHA-256 before the ECDSA operation. Nothing is pre-hashed by callers.
pub trait CurveOps: Send + Sync {
    fn curve(&self) -> Curve;

    /// `true` iff `(x, y)` satisfies the curve equation.
    fn is_on_curve(&self, point: &Point) -> bool;

    /// Reconstructs the full point from `x` and the parity of `y`.
    fn point_from_x(&self, x: &[u8; 32], y_is_odd: bool) -> Result<Point, CryptoError>;

    /// Uncompressed public point of a secret scalar.
    fn public_key_of(&self, secret: &[u8; 32]) -> Result<Point, CryptoError>;

    fn sign(&self, secret: &[u8; 32], message: &[u8]) -> Result<Signature, CryptoError>;

    /// Never fails loudly: malformed keys or signatures simply verify `false`.
    fn verify(&self, point: &Point, message: &[u8], signature: &Signature) -> bool;

    /// A uniformly random valid secret scalar.
    fn generate_secret(&self) -> [u8; 32];
}

macro_rules! ecdsa_curve_ops {
    ($ops:ident, $krate:ident, $tag:expr) => {
        pub(crate) struct $ops;

        impl $ops {
            fn encode(point: &Point) -> $krate::EncodedPoint {
                $krate::EncodedPoint::from_affine_coordinates(
                    &$krate::FieldBytes::clone_from_slice(point.x()),
                    &$krate::FieldBytes::clone_from_slice(point.y()),
                    false,
                )
            }

            fn decode(encoded: &$krate::EncodedPoint) -> Result<Point, CryptoError> {
                match (encoded.x(), encoded.y()) {
                    (Some(x), Some(y)) => {
                        let mut px = [0u8; 32];
                        let mut py = [0u8; 32];
                        px.copy_from_slice(x);
                        py.copy_from_slice(y);
                        Ok(Point::new(px, py))
                    }
                    _ => Err(CryptoError::PointNotOnCurve { curve: $tag }),
                }
            }

            fn signing_key(secret: &[u8; 32]) -> Result<$krate::ecdsa::SigningKey, CryptoError> {
                $krate::ecdsa::SigningKey::from_slice(secret)
                    .map_err(|_| CryptoError::InvalidPrivateKey { curve: $tag })
            }
        }

        impl CurveOps for $ops {
            fn curve(&self) -> Curve {
                $tag
            }

            fn is_on_curve(&self, point: &Point) -> bool {
                use $krate::elliptic_curve::sec1::FromEncodedPoint;
                let affine = $krate::AffinePoint::from_encoded_point(&Self::encode(point));
                bool::from(affine.is_some())
            }

            fn point_from_x(&self, x: &[u8; 32], y_is_odd: bool) -> Result<Point, CryptoError> {
                use $krate::elliptic_curve::sec1::ToEncodedPoint;
                let mut sec1 = [0u8; 33];
                sec1[0] = if y_is_odd { 0x03 } else { 0x02 };
                sec1[1..].copy_from_slice(x);
                let public = $krate::PublicKey::from_sec1_bytes(&sec1)
                    .map_err(|_| CryptoError::NoPointForX { curve: $tag })?;
                Self::decode(&public.to_encoded_point(false))
            }

            fn public_key_of(&self, secret: &[u8; 32]) -> Result<Point, CryptoError> {
                let key = Self::signing_key(secret)?;
                Self::decode(&key.verifying_key().to_encoded_point(false))
            }

            fn sign(&self, secret: &[u8; 32], message: &[u8]) -> Result<Signature, CryptoError> {
                use $krate::ecdsa::signature::Signer;
                let key = Self::signing_key(secret)?;
                let signature: $krate::ecdsa::Signature = key
                    .try_sign(message)
                    .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
                Signature::from_bytes(&signature.to_bytes())
            }

            fn verify(&self, point: &Point, message: &[u8], signature: &Signature) -> bool {
                use $krate::ecdsa::signature::Verifier;
                let encoded = Self::encode(point);
                let Ok(key) = $krate::ecdsa::VerifyingKey::from_encoded_point(&encoded) else {
                    return false;
                };
                let Ok(sig) = $krate::ecdsa::Signature::from_slice(&signature.to_bytes()) else {
                    return false;
                };
                // (r, s) and (r, n - s) are both valid; k256 only accepts low-S.
                let sig = sig.normalize_s().unwrap_or(sig);
                key.verify(message, &sig).is_ok()
            }

            fn generate_secret(&self) -> [u8; 32] {
                let key = $krate::ecdsa::SigningKey::random(&mut rand_core::OsRng);
                let mut secret = [0u8; 32];
                secret.copy_from_slice(&key.to_bytes());
                secret
            }
        }
    };
}

ecdsa_curve_ops!(Secp256k1Ops, k256, Curve::Secp256k1);
ecdsa_curve_ops!(P256Ops, p256, Curve::P256);

static SECP256K1: Secp256k1Ops = Secp256k1Ops;
static P256: P256Ops = P256Ops;
