//! # Point Codec
//!
//! Converts public points to and from the two address encodings the network
//! understands:
//!
//! ```text
//! Full        hex( x[32] || y[32] )                        -> 64 raw bytes
//! Compressed  base58( prefix[1] || x[32] )                 -> 33 raw bytes
//!             prefix = 42 if y is even, 43 if y is odd
//! ```
//!
//! Coordinates are big-endian. The raw bytes (not the string) are what goes
//! into a serialized transaction output, which is why every output in one
//! transaction must use the same format: the parser sizes outputs by version.
//!
//! Decoding is strict. A full address whose `(x, y)` is off the curve, or a
//! compressed address whose `x` has no `y`, is an error rather than a point.

use serde::{Deserialize, Serialize};

use super::curve::Curve;
use super::keys::{CryptoError, Point};
use crate::config::{
    COMPRESSED_ADDRESS_LENGTH, COMPRESSED_PREFIX_EVEN, COMPRESSED_PREFIX_ODD, COORDINATE_LENGTH,
    FULL_ADDRESS_LENGTH,
};

/// Address encoding of a public point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFormat {
    /// Hex of `x || y`.
    Full,
    /// Base58 of `prefix || x`.
    #[default]
    Compressed,
}

impl AddressFormat {
    /// Raw byte length of an address in this format.
    pub fn byte_length(self) -> usize {
        match self {
            AddressFormat::Full => FULL_ADDRESS_LENGTH,
            AddressFormat::Compressed => COMPRESSED_ADDRESS_LENGTH,
        }
    }

    pub fn from_byte_length(len: usize) -> Option<Self> {
        match len {
            FULL_ADDRESS_LENGTH => Some(AddressFormat::Full),
            COMPRESSED_ADDRESS_LENGTH => Some(AddressFormat::Compressed),
            _ => None,
        }
    }
}

/// Raw address bytes of `point`: 64 bytes for `Full`, 33 for `Compressed`.
pub fn point_to_bytes(point: &Point, format: AddressFormat) -> Vec<u8> {
    match format {
        AddressFormat::Full => {
            let mut out = Vec::with_capacity(FULL_ADDRESS_LENGTH);
            out.extend_from_slice(point.x());
            out.extend_from_slice(point.y());
            out
        }
        AddressFormat::Compressed => {
            let mut out = Vec::with_capacity(COMPRESSED_ADDRESS_LENGTH);
            out.push(if point.is_y_odd() {
                COMPRESSED_PREFIX_ODD
            } else {
                COMPRESSED_PREFIX_EVEN
            });
            out.extend_from_slice(point.x());
            out
        }
    }
}

/// Inverse of [`point_to_bytes`]. For compressed bytes `y` is recomputed from
/// the curve equation, so the curve must be known.
pub fn bytes_to_point(bytes: &[u8], curve: Curve) -> Result<Point, CryptoError> {
    match bytes.len() {
        FULL_ADDRESS_LENGTH => {
            let mut x = [0u8; COORDINATE_LENGTH];
            let mut y = [0u8; COORDINATE_LENGTH];
            x.copy_from_slice(&bytes[..COORDINATE_LENGTH]);
            y.copy_from_slice(&bytes[COORDINATE_LENGTH..]);
            let point = Point::new(x, y);
            if !curve.is_on_curve(&point) {
                return Err(CryptoError::PointNotOnCurve { curve });
            }
            Ok(point)
        }
        COMPRESSED_ADDRESS_LENGTH => {
            let y_is_odd = match bytes[0] {
                COMPRESSED_PREFIX_EVEN => false,
                COMPRESSED_PREFIX_ODD => true,
                other => return Err(CryptoError::InvalidCompressedPrefix(other)),
            };
            let mut x = [0u8; COORDINATE_LENGTH];
            x.copy_from_slice(&bytes[1..]);
            curve.ops().point_from_x(&x, y_is_odd)
        }
        other => Err(CryptoError::InvalidPointLength(other)),
    }
}

/// Address string of `point` in the requested format.
pub fn point_to_string(point: &Point, format: AddressFormat) -> String {
    let bytes = point_to_bytes(point, format);
    match format {
        AddressFormat::Full => hex::encode(bytes),
        AddressFormat::Compressed => bs58::encode(bytes).into_string(),
    }
}

/// Decodes an address string to its raw bytes without touching the curve.
///
/// Hex is tried first (a full address is 128 hex characters); anything else
/// is treated as Base58. The result is always 64 or 33 bytes.
pub fn address_to_bytes(address: &str) -> Result<Vec<u8>, CryptoError> {
    let address = address.trim();
    if let Ok(bytes) = hex::decode(address) {
        if bytes.len() == FULL_ADDRESS_LENGTH {
            return Ok(bytes);
        }
    }
    let bytes = bs58::decode(address)
        .into_vec()
        .map_err(|e| CryptoError::InvalidAddress(e.to_string()))?;
    if bytes.len() != COMPRESSED_ADDRESS_LENGTH {
        return Err(CryptoError::InvalidAddress(format!(
            "decoded to {} bytes, expected {} or {}",
            bytes.len(),
            FULL_ADDRESS_LENGTH,
            COMPRESSED_ADDRESS_LENGTH
        )));
    }
    Ok(bytes)
}

/// Decodes an address string to a point on `curve`.
pub fn string_to_point(address: &str, curve: Curve) -> Result<Point, CryptoError> {
    bytes_to_point(&address_to_bytes(address)?, curve)
}
