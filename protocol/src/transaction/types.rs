//! Core value types for Ecliptic transactions.
//!
//! These types form the vocabulary of the wire format: integer amounts,
//! 32-byte hashes, the version tag, and the byte order of multi-byte fields.
//! They are small and `Copy` so they can be passed around freely on the
//! serialization path.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::error::TransactionError;
use crate::config::{
    AMOUNT_DECIMALS, COMPRESSED_ADDRESS_LENGTH, FULL_ADDRESS_LENGTH, MAX_LEGACY_MESSAGE_LENGTH,
    MAX_MESSAGE_LENGTH, SMALLEST, TX_HASH_LENGTH,
};

// ---------------------------------------------------------------------------
// Amount
// ---------------------------------------------------------------------------

/// Errors from parsing a decimal amount.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("amount must not be negative: {0}")]
    Negative(String),

    #[error("not a decimal number: {0}")]
    Invalid(String),

    /// More than six significant decimal places.
    #[error("amount {0} is not a multiple of the smallest unit (1/1000000)")]
    TooPrecise(String),

    #[error("amount {0} overflows")]
    Overflow(String),
}

/// A monetary amount in smallest units (`1 / SMALLEST` of a coin).
///
/// No floating point anywhere near money: the decimal string a user types
/// is parsed straight into an integer, and anything finer than one smallest
/// unit is an error rather than a rounding.
///
/// # Examples
///
/// ```
/// use ecliptic_protocol::transaction::Amount;
///
/// let ten: Amount = "10".parse().unwrap();
/// assert_eq!(ten.units(), 10_000_000);
/// assert_eq!(ten.to_string(), "10.000000");
/// assert!("0.0000001".parse::<Amount>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_units(units: u64) -> Self {
        Amount(units)
    }

    /// Whole coins, e.g. `Amount::from_coins(4)` is `4.000000`.
    pub fn from_coins(coins: u64) -> Result<Self, AmountError> {
        coins
            .checked_mul(SMALLEST)
            .map(Amount)
            .ok_or_else(|| AmountError::Overflow(coins.to_string()))
    }

    pub const fn units(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    /// Parses a non-negative decimal string such as `"12"`, `"0.5"` or
    /// `"3.250000"`.
    pub fn parse_decimal(input: &str) -> Result<Self, AmountError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(AmountError::Empty);
        }
        if s.starts_with('-') {
            return Err(AmountError::Negative(s.to_string()));
        }
        let s = s.strip_prefix('+').unwrap_or(s);
        let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
            return Err(AmountError::Invalid(s.to_string()));
        }

        let frac = frac.trim_end_matches('0');
        if frac.len() > AMOUNT_DECIMALS {
            return Err(AmountError::TooPrecise(s.to_string()));
        }

        let overflow = || AmountError::Overflow(s.to_string());
        let whole_units = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<u64>()
                .map_err(|_| overflow())?
                .checked_mul(SMALLEST)
                .ok_or_else(overflow)?
        };
        let frac_units = if frac.is_empty() {
            0
        } else {
            format!("{:0<width$}", frac, width = AMOUNT_DECIMALS)
                .parse::<u64>()
                .map_err(|_| AmountError::Invalid(s.to_string()))?
        };
        whole_units
            .checked_add(frac_units)
            .map(Amount)
            .ok_or_else(overflow)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:0width$}",
            self.0 / SMALLEST,
            self.0 % SMALLEST,
            width = AMOUNT_DECIMALS
        )
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amount::parse_decimal(s)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Accepts `"10.5"`, `10.5` and `10`: nodes are not consistent about
/// whether amounts are JSON strings or numbers.
impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountVisitor;

        impl<'de> Visitor<'de> for AmountVisitor {
            type Value = Amount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal amount as a string or number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
                Amount::parse_decimal(v).map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
                Amount::from_coins(v).map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
                if v < 0 {
                    return Err(E::custom(AmountError::Negative(v.to_string())));
                }
                self.visit_u64(v as u64)
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
                // `Display` for f64 never uses exponent notation.
                Amount::parse_decimal(&v.to_string()).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}

// ---------------------------------------------------------------------------
// TxHash
// ---------------------------------------------------------------------------

/// A 32-byte transaction or block hash, hex on the outside.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxHash([u8; TX_HASH_LENGTH]);

impl TxHash {
    pub const fn from_bytes(bytes: [u8; TX_HASH_LENGTH]) -> Self {
        TxHash(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; TX_HASH_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for TxHash {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim()).map_err(|e| TransactionError::InvalidHex(e.to_string()))?;
        let array: [u8; TX_HASH_LENGTH] = bytes.try_into().map_err(|b: Vec<u8>| {
            TransactionError::InvalidHex(format!("hash must be 32 bytes, got {}", b.len()))
        })?;
        Ok(TxHash(array))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self.to_hex())
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// TxVersion
// ---------------------------------------------------------------------------

/// The version byte. Opaque on purpose: it only tells the parser how wide
/// output addresses and message lengths are.
///
/// | version | addresses | msg length | produced by |
/// |---------|-----------|------------|-------------|
/// | 1       | 64 bytes  | 1 byte     | any transaction with full addresses |
/// | 2       | 33 bytes  | 1 byte     | coinbase with a compressed address |
/// | 3       | 33 bytes  | 2 bytes LE | regular transaction with compressed addresses |
///
/// Use [`TxVersion::select`] instead of picking a variant by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TxVersion {
    V1 = 1,
    V2 = 2,
    V3 = 3,
}

impl TxVersion {
    /// The decision table keyed on `(is_coinbase, output address length)`.
    pub fn select(is_coinbase: bool, address_length: usize) -> Result<Self, TransactionError> {
        match (is_coinbase, address_length) {
            (_, FULL_ADDRESS_LENGTH) => Ok(TxVersion::V1),
            (true, COMPRESSED_ADDRESS_LENGTH) => Ok(TxVersion::V2),
            (false, COMPRESSED_ADDRESS_LENGTH) => Ok(TxVersion::V3),
            (_, other) => Err(TransactionError::InvalidAddressLength(other)),
        }
    }

    pub fn from_byte(byte: u8) -> Result<Self, TransactionError> {
        match byte {
            1 => Ok(TxVersion::V1),
            2 => Ok(TxVersion::V2),
            3 => Ok(TxVersion::V3),
            other => Err(TransactionError::UnsupportedVersion(other)),
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Raw byte length of every output address under this version.
    pub fn address_length(self) -> usize {
        match self {
            TxVersion::V1 => FULL_ADDRESS_LENGTH,
            TxVersion::V2 | TxVersion::V3 => COMPRESSED_ADDRESS_LENGTH,
        }
    }

    /// Width of the message length field.
    pub fn message_length_width(self) -> usize {
        if self <= TxVersion::V2 {
            1
        } else {
            2
        }
    }

    pub fn max_message_length(self) -> usize {
        if self <= TxVersion::V2 {
            MAX_LEGACY_MESSAGE_LENGTH
        } else {
            MAX_MESSAGE_LENGTH
        }
    }

    /// Whether the signing preimage includes the message section.
    /// Only version 3 does; legacy preimages never cover the memo.
    pub fn signs_message(self) -> bool {
        self > TxVersion::V2
    }
}

// ---------------------------------------------------------------------------
// Endian
// ---------------------------------------------------------------------------

/// Byte order for variable-width unsigned integers on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    /// Minimal number of bytes that hold `value`; zero needs none.
    pub fn byte_length(value: u64) -> usize {
        ((64 - value.leading_zeros() as usize) + 7) / 8
    }

    /// `value` in exactly `width` bytes (`width <= 8`), truncating high bytes.
    pub fn encode(self, value: u64, width: usize) -> Vec<u8> {
        let width = width.min(8);
        match self {
            Endian::Little => value.to_le_bytes()[..width].to_vec(),
            Endian::Big => value.to_be_bytes()[8 - width..].to_vec(),
        }
    }

    /// Inverse of [`Endian::encode`]. `None` if more than 8 bytes are given.
    pub fn decode(self, bytes: &[u8]) -> Option<u64> {
        if bytes.len() > 8 {
            return None;
        }
        let mut buf = [0u8; 8];
        match self {
            Endian::Little => {
                buf[..bytes.len()].copy_from_slice(bytes);
                Some(u64::from_le_bytes(buf))
            }
            Endian::Big => {
                buf[8 - bytes.len()..].copy_from_slice(bytes);
                Some(u64::from_be_bytes(buf))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
