//! Parsing transactions back from their wire form.
//!
//! One entry point, [`decode_transaction`], handles both record kinds that
//! share the layout: regular transactions and coinbases (specifier `36`).
//!
//! The signature section has no count prefix on the wire. Instead of
//! scanning for a zero sentinel, the parser requires the bytes after the
//! message to be an exact multiple of 64 and reads all of them.
//!
//! Signatures are then mapped onto inputs:
//!
//! - one signature: every input shares it;
//! - as many signatures as inputs: by position;
//! - otherwise: one per distinct signer, in first-seen order. That needs the
//!   inputs' public keys, so the signatures wait in
//!   [`Transaction::pending_signatures`] until [`Transaction::resolve`].

use super::coinbase::CoinbaseTransaction;
use super::error::TransactionError;
use super::input::TransactionInput;
use super::output::TransactionOutput;
use super::transaction::Transaction;
use super::types::{Amount, TxHash, TxVersion};
use crate::config::{
    SIGNATURE_LENGTH, SPECIFIER_COINBASE, SPECIFIER_MESSAGE, SPECIFIER_NO_MESSAGE, TX_HASH_LENGTH,
    WIRE_ENDIAN,
};
use crate::crypto::{Curve, Signature};

// ---------------------------------------------------------------------------
// ByteReader
// ---------------------------------------------------------------------------

/// A forward-only cursor over a byte slice. Every read is bounds-checked.
#[derive(Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read(&mut self, len: usize) -> Result<&'a [u8], TransactionError> {
        if len > self.remaining() {
            return Err(TransactionError::UnexpectedEof {
                needed: len,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, TransactionError> {
        Ok(self.read(1)?[0])
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], TransactionError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read(N)?);
        Ok(out)
    }

    /// Unsigned integer of `width` bytes in the wire byte order.
    pub fn read_uint(&mut self, width: usize) -> Result<u64, TransactionError> {
        let bytes = self.read(width)?;
        WIRE_ENDIAN
            .decode(bytes)
            .ok_or(TransactionError::AmountTooWide(width))
    }

    /// Everything not read yet.
    pub fn rest(&mut self) -> &'a [u8] {
        let slice = &self.data[self.pos..];
        self.pos = self.data.len();
        slice
    }
}

// ---------------------------------------------------------------------------
// ParsedTransaction
// ---------------------------------------------------------------------------

/// What a hex record turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedTransaction {
    Transfer(Transaction),
    Coinbase(CoinbaseTransaction),
}

impl ParsedTransaction {
    pub fn hex(&self) -> String {
        match self {
            ParsedTransaction::Transfer(tx) => tx.hex(true),
            ParsedTransaction::Coinbase(cb) => cb.hex(),
        }
    }

    pub fn hash(&self) -> String {
        self.tx_hash().to_hex()
    }

    pub fn tx_hash(&self) -> TxHash {
        match self {
            ParsedTransaction::Transfer(tx) => tx.tx_hash(),
            ParsedTransaction::Coinbase(cb) => cb.tx_hash(),
        }
    }

    pub fn is_coinbase(&self) -> bool {
        matches!(self, ParsedTransaction::Coinbase(_))
    }

    /// Output `index` of either kind; a coinbase only has output `0`.
    pub fn output(&self, index: u8) -> Option<&TransactionOutput> {
        match self {
            ParsedTransaction::Transfer(tx) => tx.outputs().get(index as usize),
            ParsedTransaction::Coinbase(cb) => (index == 0).then(|| cb.output()),
        }
    }

    pub fn into_transaction(self) -> Option<Transaction> {
        match self {
            ParsedTransaction::Transfer(tx) => Some(tx),
            ParsedTransaction::Coinbase(_) => None,
        }
    }

    pub fn into_coinbase(self) -> Option<CoinbaseTransaction> {
        match self {
            ParsedTransaction::Coinbase(cb) => Some(cb),
            ParsedTransaction::Transfer(_) => None,
        }
    }
}

impl Transaction {
    /// Parses a hex record. Addresses are interpreted on `curve`.
    pub fn from_hex(hex_str: &str, curve: Curve) -> Result<ParsedTransaction, TransactionError> {
        decode_transaction(hex_str, curve)
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

pub fn decode_transaction(
    hex_str: &str,
    curve: Curve,
) -> Result<ParsedTransaction, TransactionError> {
    let bytes =
        hex::decode(hex_str.trim()).map_err(|e| TransactionError::InvalidHex(e.to_string()))?;
    decode_bytes(&bytes, curve)
}

pub fn decode_bytes(bytes: &[u8], curve: Curve) -> Result<ParsedTransaction, TransactionError> {
    let mut reader = ByteReader::new(bytes);
    let version = TxVersion::from_byte(reader.read_u8()?)?;

    let input_count = reader.read_u8()? as usize;
    let mut inputs = Vec::with_capacity(input_count);
    for _ in 0..input_count {
        let tx_hash = TxHash::from_bytes(reader.read_array::<TX_HASH_LENGTH>()?);
        let index = reader.read_u8()?;
        inputs.push(TransactionInput::new(tx_hash, index, curve));
    }

    let output_count = reader.read_u8()? as usize;
    let mut outputs = Vec::with_capacity(output_count);
    for _ in 0..output_count {
        let address = reader.read(version.address_length())?.to_vec();
        let width = reader.read_u8()? as usize;
        let units = reader.read_uint(width)?;
        outputs.push(TransactionOutput::from_wire(address, Amount::from_units(units), curve));
    }

    let specifier = reader.read_u8()?;
    let message = match specifier {
        SPECIFIER_COINBASE => {
            return decode_coinbase(version, inputs, outputs, &reader)
                .map(ParsedTransaction::Coinbase);
        }
        SPECIFIER_MESSAGE => {
            let len = reader.read_uint(version.message_length_width())? as usize;
            Some(reader.read(len)?.to_vec())
        }
        SPECIFIER_NO_MESSAGE => None,
        other => return Err(TransactionError::UnknownSpecifier(other)),
    };

    let signatures = decode_signatures(reader.rest())?;
    if signatures.len() > inputs.len() {
        return Err(TransactionError::MalformedSignatures(format!(
            "{} signatures for {} inputs",
            signatures.len(),
            inputs.len()
        )));
    }

    let mut pending = Vec::new();
    match signatures.len() {
        0 => {}
        1 => inputs.iter_mut().for_each(|i| i.set_signature(signatures[0])),
        n if n == inputs.len() => {
            for (input, signature) in inputs.iter_mut().zip(&signatures) {
                input.set_signature(*signature);
            }
        }
        _ => pending = signatures,
    }

    Ok(ParsedTransaction::Transfer(Transaction::from_parts(
        version, inputs, outputs, message, pending,
    )))
}

fn decode_coinbase(
    version: TxVersion,
    inputs: Vec<TransactionInput>,
    mut outputs: Vec<TransactionOutput>,
    reader: &ByteReader<'_>,
) -> Result<CoinbaseTransaction, TransactionError> {
    if inputs.len() != 1 || outputs.len() != 1 {
        return Err(TransactionError::MalformedCoinbase(format!(
            "expected 1 input and 1 output, got {} and {}",
            inputs.len(),
            outputs.len()
        )));
    }
    if inputs[0].index() != 0 {
        return Err(TransactionError::MalformedCoinbase(format!(
            "block reference index must be 0, got {}",
            inputs[0].index()
        )));
    }
    if !reader.is_empty() {
        return Err(TransactionError::TrailingBytes(reader.remaining()));
    }

    let output = outputs.remove(0);
    let coinbase = CoinbaseTransaction::new(*inputs[0].tx_hash(), output)?;
    if coinbase.version() != version {
        return Err(TransactionError::MalformedCoinbase(format!(
            "version {} does not match a {}-byte address",
            version.as_byte(),
            version.address_length()
        )));
    }
    Ok(coinbase)
}

fn decode_signatures(bytes: &[u8]) -> Result<Vec<Signature>, TransactionError> {
    if bytes.len() % SIGNATURE_LENGTH != 0 {
        return Err(TransactionError::MalformedSignatures(format!(
            "{} bytes is not a whole number of {}-byte signatures",
            bytes.len(),
            SIGNATURE_LENGTH
        )));
    }
    bytes
        .chunks_exact(SIGNATURE_LENGTH)
        .map(|chunk| {
            let signature = Signature::from_bytes(chunk)?;
            if signature.has_zero_r() {
                return Err(TransactionError::MalformedSignatures("zero r".to_string()));
            }
            Ok(signature)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{AddressFormat, PrivateKey};
    use crate::transaction::input::ResolvedOutput;

    fn owned_input(key: &PrivateKey, byte: u8) -> TransactionInput {
        TransactionInput::new(TxHash::from_bytes([byte; 32]), byte, key.curve()).with_resolution(
            ResolvedOutput {
                amount: Amount::from_units(100),
                public_key: key.public_point().unwrap(),
            },
        )
    }

    fn signed(
        keys: &[PrivateKey],
        inputs: Vec<TransactionInput>,
        format: AddressFormat,
        message: Option<&[u8]>,
    ) -> Transaction {
        let curve = keys[0].curve();
        let to = PrivateKey::generate(curve).address(format).unwrap();
        let output = TransactionOutput::new(&to, Amount::from_units(150), curve).unwrap();
        let mut tx = Transaction::new(inputs, vec![output], message.map(<[u8]>::to_vec)).unwrap();
        tx.sign(keys).unwrap();
        tx
    }

    /// Parses a signed transfer back from its full hex.
    fn reparse(tx: &Transaction) -> Transaction {
        Transaction::from_hex(&tx.hex(true), tx.inputs()[0].curve())
            .unwrap()
            .into_transaction()
            .unwrap()
    }

    #[test]
    fn reader_is_bounds_checked() {
        let mut reader = ByteReader::new(&[1, 2, 3]);
        assert_eq!(reader.read_u8().unwrap(), 1);
        assert_eq!(
            reader.read(5),
            Err(TransactionError::UnexpectedEof { needed: 5, remaining: 2 })
        );
        assert_eq!(reader.read_uint(2).unwrap(), 0x0302);
        assert!(reader.is_empty());
    }

    #[test]
    fn roundtrips_signed_transfer() {
        let key = PrivateKey::generate(Curve::Secp256k1);
        let inputs = vec![owned_input(&key, 1), owned_input(&key, 2)];
        let tx = signed(&[key], inputs, AddressFormat::Compressed, Some(b"memo"));
        let parsed = Transaction::from_hex(&tx.hex(true), Curve::Secp256k1).unwrap();
        assert!(!parsed.is_coinbase());
        assert_eq!(parsed.hex(), tx.hex(true));
        assert_eq!(parsed.hash(), tx.hash());

        let parsed = parsed.into_transaction().unwrap();
        assert_eq!(parsed.message(), Some(&b"memo"[..]));
        assert!(parsed.inputs().iter().all(|i| i.is_signed()));
        assert!(parsed.pending_signatures().is_empty());
    }

    #[test]
    fn roundtrips_legacy_full_address_transaction() {
        let key = PrivateKey::generate(Curve::P256);
        let inputs = vec![owned_input(&key, 1)];
        let tx = signed(&[key], inputs, AddressFormat::Full, Some(b"legacy"));
        assert_eq!(tx.version(), TxVersion::V1);
        let parsed = Transaction::from_hex(&tx.hex(true), Curve::P256).unwrap();
        assert_eq!(parsed.hex(), tx.hex(true));
    }

    #[test]
    fn positional_signatures_map_by_index() {
        let alice = PrivateKey::generate(Curve::Secp256k1);
        let bob = PrivateKey::generate(Curve::Secp256k1);
        let inputs = vec![owned_input(&alice, 1), owned_input(&bob, 2)];
        let tx = signed(&[alice, bob], inputs, AddressFormat::Compressed, None);
        let parsed = reparse(&tx);
        assert_eq!(parsed.inputs()[0].signature(), tx.inputs()[0].signature());
        assert_eq!(parsed.inputs()[1].signature(), tx.inputs()[1].signature());
    }

    #[test]
    fn grouped_signatures_wait_for_resolution() {
        let alice = PrivateKey::generate(Curve::Secp256k1);
        let bob = PrivateKey::generate(Curve::Secp256k1);
        let tx = signed(
            &[alice.clone(), bob.clone()],
            vec![owned_input(&alice, 1), owned_input(&alice, 2), owned_input(&bob, 3)],
            AddressFormat::Compressed,
            None,
        );
        assert_eq!(tx.signatures().len(), 2);

        let parsed = reparse(&tx);
        assert_eq!(parsed.pending_signatures().len(), 2);
        assert!(parsed.inputs().iter().all(|i| !i.is_signed()));
        assert_eq!(parsed.hex(true), tx.hex(true));
    }

    #[test]
    fn unsupported_version_is_rejected() {
        assert_eq!(
            decode_transaction("04", Curve::Secp256k1),
            Err(TransactionError::UnsupportedVersion(4))
        );
        assert_eq!(
            decode_transaction("00", Curve::Secp256k1),
            Err(TransactionError::UnsupportedVersion(0))
        );
    }

    #[test]
    fn invalid_hex_is_rejected() {
        assert!(matches!(
            decode_transaction("zz", Curve::Secp256k1),
            Err(TransactionError::InvalidHex(_))
        ));
    }

    #[test]
    fn truncated_input_is_rejected() {
        let key = PrivateKey::generate(Curve::Secp256k1);
        let inputs = vec![owned_input(&key, 1)];
        let tx = signed(&[key], inputs, AddressFormat::Compressed, None);
        let hex = tx.hex(true);
        let truncated = &hex[..40];
        assert!(matches!(
            decode_transaction(truncated, Curve::Secp256k1),
            Err(TransactionError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn ragged_signature_section_is_rejected() {
        let key = PrivateKey::generate(Curve::Secp256k1);
        let inputs = vec![owned_input(&key, 1)];
        let tx = signed(&[key], inputs, AddressFormat::Compressed, None);
        let hex = format!("{}ab", tx.hex(true));
        assert!(matches!(
            decode_transaction(&hex, Curve::Secp256k1),
            Err(TransactionError::MalformedSignatures(_))
        ));
    }

    #[test]
    fn zero_r_signature_is_rejected() {
        let key = PrivateKey::generate(Curve::Secp256k1);
        let tx = Transaction::new(vec![owned_input(&key, 1)], vec![], None).unwrap();
        let hex = format!("{}{}{}", tx.hex(true), "00".repeat(32), "11".repeat(32));
        assert_eq!(
            decode_transaction(&hex, Curve::Secp256k1),
            Err(TransactionError::MalformedSignatures("zero r".to_string()))
        );
    }

    #[test]
    fn unknown_specifier_is_rejected() {
        let key = PrivateKey::generate(Curve::Secp256k1);
        let tx = Transaction::new(vec![owned_input(&key, 1)], vec![], None).unwrap();
        let mut bytes = tx.serialize(true);
        *bytes.last_mut().unwrap() = 7;
        assert_eq!(
            decode_bytes(&bytes, Curve::Secp256k1),
            Err(TransactionError::UnknownSpecifier(7))
        );
    }

    #[test]
    fn more_signatures_than_inputs_is_rejected() {
        let key = PrivateKey::generate(Curve::Secp256k1);
        let tx = Transaction::new(vec![owned_input(&key, 1)], vec![], None).unwrap();
        let sig = "11".repeat(64);
        let hex = format!("{}{}{}", tx.hex(true), sig, sig);
        assert!(matches!(
            decode_transaction(&hex, Curve::Secp256k1),
            Err(TransactionError::MalformedSignatures(_))
        ));
    }
}
