//! # Protocol Configuration & Constants
//!
//! Every magic number of the Ecliptic wire format lives here. If you're
//! hardcoding a specifier byte or an address length somewhere else, you're
//! doing it wrong and you owe the team coffee.
//!
//! These values define the byte layout the node accepts. Changing any of them
//! means every transaction you build is rejected by the network, so treat
//! this file as append-only.

use std::time::Duration;

use crate::transaction::types::Endian;

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

/// Number of smallest units in one display unit. Every amount on the wire is
/// an integer multiple of `1 / SMALLEST`.
pub const SMALLEST: u64 = 1_000_000;

/// Number of decimal places implied by [`SMALLEST`].
pub const AMOUNT_DECIMALS: usize = 6;

// ---------------------------------------------------------------------------
// Wire Layout
// ---------------------------------------------------------------------------

/// Byte order used for amount bytes and multi-byte message lengths.
/// Point coordinates and signature scalars are always big-endian.
pub const WIRE_ENDIAN: Endian = Endian::Little;

/// Input and output counts are single bytes on the wire.
pub const MAX_INPUTS: usize = 255;

/// See [`MAX_INPUTS`].
pub const MAX_OUTPUTS: usize = 255;

/// Transaction and block hashes are SHA-256 digests.
pub const TX_HASH_LENGTH: usize = 32;

/// Width of the output index that follows each input's transaction hash.
pub const INPUT_INDEX_LENGTH: usize = 1;

/// A serialized input: hash followed by the index byte.
pub const INPUT_LENGTH: usize = TX_HASH_LENGTH + INPUT_INDEX_LENGTH;

/// `r || s`, 32 bytes each.
pub const SIGNATURE_LENGTH: usize = 64;

/// Coordinate width for both supported curves.
pub const COORDINATE_LENGTH: usize = 32;

/// Raw bytes of a full address: `x || y`.
pub const FULL_ADDRESS_LENGTH: usize = 64;

/// Raw bytes of a compressed address: `prefix || x`.
pub const COMPRESSED_ADDRESS_LENGTH: usize = 33;

/// Compressed-address prefix for an even `y` coordinate.
pub const COMPRESSED_PREFIX_EVEN: u8 = 42;

/// Compressed-address prefix for an odd `y` coordinate.
pub const COMPRESSED_PREFIX_ODD: u8 = 43;

/// Specifier byte: the transaction carries no message.
pub const SPECIFIER_NO_MESSAGE: u8 = 0;

/// Specifier byte: a length-prefixed message follows.
pub const SPECIFIER_MESSAGE: u8 = 1;

/// Specifier byte: the record is a coinbase transaction.
pub const SPECIFIER_COINBASE: u8 = 36;

/// Longest message a version 1 or 2 transaction can carry (1-byte length).
pub const MAX_LEGACY_MESSAGE_LENGTH: usize = u8::MAX as usize;

/// Longest message a version 3 transaction can carry (2-byte length).
pub const MAX_MESSAGE_LENGTH: usize = u16::MAX as usize;

/// The genesis transaction predates the "at least one output" rule and is
/// exempt from output verification.
pub const GENESIS_TX_HASH: &str =
    "915ddf143e14647ba1e04c44cf61e57084254c44cd4454318240f359a414065c";

// ---------------------------------------------------------------------------
// Node Client Defaults
// ---------------------------------------------------------------------------

/// Node endpoint used when nothing else is configured.
pub const DEFAULT_NODE_URL: &str = "http://127.0.0.1:3006";

/// Per-request timeout for node calls. Balance queries on a busy node can be
/// slow, but ten seconds without an answer means the node is not coming back.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// `transactions_count_limit` sent with address queries. The builder only
/// needs outputs, not history.
pub const DEFAULT_TRANSACTIONS_COUNT_LIMIT: u32 = 0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_lengths_are_consistent() {
        assert_eq!(FULL_ADDRESS_LENGTH, 2 * COORDINATE_LENGTH);
        assert_eq!(COMPRESSED_ADDRESS_LENGTH, 1 + COORDINATE_LENGTH);
        assert_eq!(SIGNATURE_LENGTH, 2 * COORDINATE_LENGTH);
    }

    #[test]
    fn test_specifiers_are_distinct() {
        // A collision here would make coinbase records parse as messages.
        assert_ne!(SPECIFIER_NO_MESSAGE, SPECIFIER_MESSAGE);
        assert_ne!(SPECIFIER_MESSAGE, SPECIFIER_COINBASE);
        assert_ne!(SPECIFIER_NO_MESSAGE, SPECIFIER_COINBASE);
    }

    #[test]
    fn test_compressed_prefixes_differ_in_parity_only() {
        assert_eq!(COMPRESSED_PREFIX_EVEN + 1, COMPRESSED_PREFIX_ODD);
    }

    #[test]
    fn test_count_limits_fit_in_a_byte() {
        assert!(MAX_INPUTS <= u8::MAX as usize);
        assert!(MAX_OUTPUTS <= u8::MAX as usize);
    }

    #[test]
    fn test_genesis_hash_is_a_sha256_hex_digest() {
        assert_eq!(GENESIS_TX_HASH.len(), 2 * TX_HASH_LENGTH);
        assert!(GENESIS_TX_HASH.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_smallest_matches_decimals() {
        assert_eq!(10u64.pow(AMOUNT_DECIMALS as u32), SMALLEST);
    }
}
