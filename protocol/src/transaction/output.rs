//! Transaction outputs: a destination address and an amount.
//!
//! ```text
//! address_bytes   33 | 64 bytes
//! amount_length   1 byte
//! amount          amount_length bytes, smallest units, wire endianness
//! ```

use super::error::TransactionError;
use super::input::ResolvedOutput;
use super::types::{Amount, Endian};
use crate::config::WIRE_ENDIAN;
use crate::crypto::{
    address_to_bytes, bytes_to_point, point_to_bytes, AddressFormat, CryptoError, Curve, Point,
};

/// A spendable destination.
///
/// Built from an address *string*; there is no constructor taking a raw
/// point, so a point can only become an output through an explicit
/// [`crate::crypto::point_to_string`] or [`TransactionOutput::from_point`]
/// call that names the address format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutput {
    /// Canonical string form, re-derived from the raw bytes.
    address: String,
    address_bytes: Vec<u8>,
    amount: Amount,
    curve: Curve,
}

impl TransactionOutput {
    /// Creates an output paying `amount` to `address`.
    ///
    /// The address must decode to 64 or 33 raw bytes. Whether the point is
    /// actually on `curve` is checked by [`TransactionOutput::verify`], not
    /// here, so that parsed transactions with bad outputs can still be
    /// inspected.
    pub fn new(address: &str, amount: Amount, curve: Curve) -> Result<Self, TransactionError> {
        let address_bytes = address_to_bytes(address)?;
        Ok(Self::from_wire(address_bytes, amount, curve))
    }

    /// Like [`TransactionOutput::new`] but with a decimal amount string.
    /// Fails if the amount is finer than one smallest unit.
    pub fn from_decimal(
        address: &str,
        amount: &str,
        curve: Curve,
    ) -> Result<Self, TransactionError> {
        Self::new(address, amount.parse()?, curve)
    }

    pub fn from_point(point: &Point, format: AddressFormat, amount: Amount, curve: Curve) -> Self {
        Self::from_wire(point_to_bytes(point, format), amount, curve)
    }

    /// `address_bytes` must already be 64 or 33 bytes long.
    pub(crate) fn from_wire(address_bytes: Vec<u8>, amount: Amount, curve: Curve) -> Self {
        let address = if address_bytes.len() == AddressFormat::Full.byte_length() {
            hex::encode(&address_bytes)
        } else {
            bs58::encode(&address_bytes).into_string()
        };
        Self {
            address,
            address_bytes,
            amount,
            curve,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn address_bytes(&self) -> &[u8] {
        &self.address_bytes
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    pub fn format(&self) -> Option<AddressFormat> {
        AddressFormat::from_byte_length(self.address_bytes.len())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let units = self.amount.units();
        let width = Endian::byte_length(units);
        let mut out = Vec::with_capacity(self.address_bytes.len() + 1 + width);
        out.extend_from_slice(&self.address_bytes);
        out.push(width as u8);
        out.extend_from_slice(&WIRE_ENDIAN.encode(units, width));
        out
    }

    /// Decodes the destination point, checking it lies on the output's curve.
    pub fn public_point(&self) -> Result<Point, CryptoError> {
        bytes_to_point(&self.address_bytes, self.curve)
    }

    /// `amount > 0` and the address decodes to a point on the curve.
    pub fn verify(&self) -> bool {
        if self.amount.is_zero() {
            tracing::debug!(address = %self.address, "output rejected: zero amount");
            return false;
        }
        if let Err(e) = self.public_point() {
            tracing::debug!(address = %self.address, error = %e, "output rejected: bad point");
            return false;
        }
        true
    }

    /// What an input spending this output resolves to.
    pub fn resolved(&self) -> Result<ResolvedOutput, TransactionError> {
        Ok(ResolvedOutput {
            amount: self.amount,
            public_key: self.public_point()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{point_to_string, PrivateKey};

    fn address(curve: Curve, format: AddressFormat) -> String {
        let point = PrivateKey::generate(curve).public_point().unwrap();
        point_to_string(&point, format)
    }

    #[test]
    fn serializes_address_length_and_amount() {
        let addr = address(Curve::Secp256k1, AddressFormat::Compressed);
        let out =
            TransactionOutput::new(&addr, Amount::from_units(0x0102), Curve::Secp256k1).unwrap();
        let bytes = out.to_bytes();
        assert_eq!(bytes.len(), 33 + 1 + 2);
        assert_eq!(&bytes[..33], out.address_bytes());
        assert_eq!(bytes[33], 2);
        // Little-endian amount bytes.
        assert_eq!(&bytes[34..], &[0x02, 0x01]);
    }

    #[test]
    fn full_address_output_is_64_bytes_wide() {
        let addr = address(Curve::P256, AddressFormat::Full);
        let out = TransactionOutput::new(&addr, Amount::from_units(1), Curve::P256).unwrap();
        assert_eq!(out.address_bytes().len(), 64);
        assert_eq!(out.format(), Some(AddressFormat::Full));
        assert_eq!(out.to_bytes().len(), 64 + 1 + 1);
    }

    #[test]
    fn address_is_canonicalized() {
        let addr = address(Curve::P256, AddressFormat::Full);
        let upper = addr.to_uppercase();
        let out = TransactionOutput::new(&upper, Amount::from_units(1), Curve::P256).unwrap();
        assert_eq!(out.address(), addr);
    }

    #[test]
    fn sub_unit_amount_is_rejected() {
        let addr = address(Curve::Secp256k1, AddressFormat::Compressed);
        let result = TransactionOutput::from_decimal(&addr, "1.0000001", Curve::Secp256k1);
        assert!(matches!(result, Err(TransactionError::Amount(_))));
        assert!(TransactionOutput::from_decimal(&addr, "1.000001", Curve::Secp256k1).is_ok());
    }

    #[test]
    fn verify_requires_positive_amount() {
        let addr = address(Curve::Secp256k1, AddressFormat::Compressed);
        let zero = TransactionOutput::new(&addr, Amount::ZERO, Curve::Secp256k1).unwrap();
        assert!(!zero.verify());
        let one = TransactionOutput::new(&addr, Amount::from_units(1), Curve::Secp256k1).unwrap();
        assert!(one.verify());
    }

    #[test]
    fn verify_rejects_off_curve_point() {
        let addr = address(Curve::Secp256k1, AddressFormat::Full);
        let mut bytes = hex::decode(&addr).unwrap();
        bytes[10] ^= 0xff;
        let tampered = hex::encode(bytes);
        let out =
            TransactionOutput::new(&tampered, Amount::from_units(5), Curve::Secp256k1).unwrap();
        assert!(!out.verify());
    }

    #[test]
    fn malformed_address_is_an_error() {
        let result =
            TransactionOutput::new("definitely not an address", Amount::from_units(1), Curve::P256);
        assert!(matches!(result, Err(TransactionError::Crypto(_))));
    }
}
