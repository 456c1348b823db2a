//! Structural transaction errors.
//!
//! These are programming or data-format defects: malformed hex, an
//! unsupported version byte, outputs that cannot share one wire layout,
//! signing without a key. They are returned as `Err` and never recovered
//! from. Business outcomes of sending (no funds, pending confirmation, node
//! rejection) are not errors; see [`super::builder::SendOutcome`].

use thiserror::Error;

use super::types::AmountError;
use crate::crypto::CryptoError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("unexpected end of data: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("unsupported transaction version {0}")]
    UnsupportedVersion(u8),

    #[error("unknown specifier byte {0}")]
    UnknownSpecifier(u8),

    /// Outputs with 64-byte and 33-byte addresses cannot share one
    /// transaction: the version byte fixes a single address width.
    #[error("not implemented: outputs mix address lengths {0:?}")]
    MixedAddressLengths(Vec<usize>),

    #[error("invalid address length {0}")]
    InvalidAddressLength(usize),

    #[error("too many inputs: {0} (max 255)")]
    TooManyInputs(usize),

    #[error("too many outputs: {0} (max 255)")]
    TooManyOutputs(usize),

    #[error("message of {len} bytes exceeds {max} for this version")]
    MessageTooLong { len: usize, max: usize },

    #[error("amount field of {0} bytes does not fit in 64 bits")]
    AmountTooWide(usize),

    #[error("input {tx_hash}:{index} has no private key to sign with")]
    MissingPrivateKey { tx_hash: String, index: u8 },

    #[error("input {index} is unresolved: its amount and public key are unknown")]
    UnresolvedInput { index: usize },

    #[error("referenced output {tx_hash}:{index} not found")]
    UnknownOutput { tx_hash: String, index: u8 },

    #[error("malformed signature section: {0}")]
    MalformedSignatures(String),

    #[error("malformed coinbase: {0}")]
    MalformedCoinbase(String),

    #[error("{0} trailing bytes after transaction")]
    TrailingBytes(usize),

    #[error("fee arithmetic overflowed")]
    FeeOverflow,

    #[error("output resolution failed: {0}")]
    Resolution(String),

    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
