//! Coinbase transactions: newly minted value for a block producer.
//!
//! A coinbase has no real input. Its single synthetic input is the block
//! hash with index `0`, it pays exactly one output and it is never signed.
//! It reuses the regular layout up to the outputs and then ends with the
//! coinbase specifier:
//!
//! ```text
//! version | 01 | block_hash | 00 | 01 | output | 24     (hex bytes)
//! ```

use std::fmt;
use std::sync::OnceLock;

use super::error::TransactionError;
use super::output::TransactionOutput;
use super::types::{Amount, TxHash, TxVersion};
use crate::config::SPECIFIER_COINBASE;
use crate::crypto::{sha256, Curve};

#[derive(Clone)]
pub struct CoinbaseTransaction {
    block_hash: TxHash,
    output: TransactionOutput,
    version: TxVersion,
    hash: OnceLock<TxHash>,
}

impl CoinbaseTransaction {
    /// Version 1 for a full address, version 2 for a compressed one.
    pub fn new(block_hash: TxHash, output: TransactionOutput) -> Result<Self, TransactionError> {
        let version = TxVersion::select(true, output.address_bytes().len())?;
        Ok(Self {
            block_hash,
            output,
            version,
            hash: OnceLock::new(),
        })
    }

    pub fn for_address(
        block_hash: TxHash,
        address: &str,
        amount: Amount,
        curve: Curve,
    ) -> Result<Self, TransactionError> {
        Self::new(block_hash, TransactionOutput::new(address, amount, curve)?)
    }

    pub fn block_hash(&self) -> &TxHash {
        &self.block_hash
    }

    pub fn output(&self) -> &TransactionOutput {
        &self.output
    }

    pub fn address(&self) -> &str {
        self.output.address()
    }

    pub fn amount(&self) -> Amount {
        self.output.amount()
    }

    pub fn version(&self) -> TxVersion {
        self.version
    }

    pub fn serialize(&self) -> Vec<u8> {
        let output = self.output.to_bytes();
        let mut buf = Vec::with_capacity(38 + output.len());
        buf.push(self.version.as_byte());
        buf.push(1);
        buf.extend_from_slice(self.block_hash.as_bytes());
        buf.push(0);
        buf.push(1);
        buf.extend_from_slice(&output);
        buf.push(SPECIFIER_COINBASE);
        buf
    }

    pub fn hex(&self) -> String {
        hex::encode(self.serialize())
    }

    pub fn tx_hash(&self) -> TxHash {
        *self
            .hash
            .get_or_init(|| TxHash::from_bytes(sha256(&self.serialize())))
    }

    pub fn hash(&self) -> String {
        self.tx_hash().to_hex()
    }

    /// Only the output can be wrong: there are no signatures or fees.
    pub fn verify(&self) -> bool {
        self.output.verify()
    }
}

impl PartialEq for CoinbaseTransaction {
    fn eq(&self, other: &Self) -> bool {
        self.block_hash == other.block_hash && self.output == other.output
    }
}

impl Eq for CoinbaseTransaction {}

impl fmt::Debug for CoinbaseTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoinbaseTransaction")
            .field("block_hash", &self.block_hash)
            .field("address", &self.output.address())
            .field("amount", &self.output.amount())
            .field("version", &self.version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{AddressFormat, PrivateKey};
    use crate::transaction::codec::decode_transaction;
    use crate::transaction::transaction::Transaction;

    fn coinbase(format: AddressFormat) -> CoinbaseTransaction {
        let key = PrivateKey::generate(Curve::Secp256k1);
        let address = key.address(format).unwrap();
        CoinbaseTransaction::for_address(
            TxHash::from_bytes([0xbb; 32]),
            &address,
            "6.25".parse().unwrap(),
            Curve::Secp256k1,
        )
        .unwrap()
    }

    #[test]
    fn version_depends_on_address_format() {
        assert_eq!(coinbase(AddressFormat::Compressed).version(), TxVersion::V2);
        assert_eq!(coinbase(AddressFormat::Full).version(), TxVersion::V1);
    }

    #[test]
    fn layout_ends_with_coinbase_specifier() {
        let cb = coinbase(AddressFormat::Compressed);
        let bytes = cb.serialize();
        assert_eq!(bytes[0], 2);
        assert_eq!(bytes[1], 1);
        assert_eq!(&bytes[2..34], &[0xbb; 32]);
        assert_eq!(&bytes[34..36], &[0, 1]);
        assert_eq!(&bytes[36..69], cb.output().address_bytes());
        assert_eq!(*bytes.last().unwrap(), 36);
    }

    #[test]
    fn hash_is_sha256_of_bytes() {
        let cb = coinbase(AddressFormat::Full);
        assert_eq!(cb.hash(), crate::crypto::sha256_hex(&cb.serialize()));
        assert_eq!(cb.hash(), cb.hash());
    }

    #[test]
    fn roundtrips_through_the_transaction_parser() {
        for format in [AddressFormat::Compressed, AddressFormat::Full] {
            let cb = coinbase(format);
            let parsed = Transaction::from_hex(&cb.hex(), Curve::Secp256k1).unwrap();
            assert!(parsed.is_coinbase());
            assert_eq!(parsed.hex(), cb.hex());
            assert_eq!(parsed.into_coinbase().unwrap(), cb);
        }
    }

    #[test]
    fn coinbase_with_trailing_bytes_is_rejected() {
        let hex = format!("{}00", coinbase(AddressFormat::Compressed).hex());
        assert_eq!(
            decode_transaction(&hex, Curve::Secp256k1),
            Err(TransactionError::TrailingBytes(1))
        );
    }

    #[test]
    fn coinbase_with_regular_version_is_rejected() {
        let mut bytes = coinbase(AddressFormat::Compressed).serialize();
        bytes[0] = 3;
        assert!(matches!(
            decode_transaction(&hex::encode(bytes), Curve::Secp256k1),
            Err(TransactionError::MalformedCoinbase(_))
        ));
    }

    #[test]
    fn verify_checks_the_output() {
        assert!(coinbase(AddressFormat::Compressed).verify());
        let key = PrivateKey::generate(Curve::Secp256k1);
        let address = key.address(AddressFormat::Compressed).unwrap();
        let empty = CoinbaseTransaction::for_address(
            TxHash::from_bytes([1; 32]),
            &address,
            Amount::ZERO,
            Curve::Secp256k1,
        )
        .unwrap();
        assert!(!empty.verify());
    }
}
