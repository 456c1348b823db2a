//! The general transaction: ordered inputs, ordered outputs, optional memo.
//!
//! [`Transaction`] owns the canonical byte layout. Signing lives in
//! [`super::signing`], verification in [`super::verification`] and parsing in
//! [`super::codec`]; they all go through [`Transaction::serialize`] so there
//! is exactly one definition of the wire format.
//!
//! # Wire Format
//!
//! ```text
//! version        1 byte
//! input_count    1 byte
//! inputs[]       33 bytes each (hash || index)
//! output_count   1 byte
//! outputs[]      address || amount_length || amount
//! ---- legacy preimage ends here (version <= 2, or no message) ----
//! specifier      1 byte (1 = message, 0 = none)
//! [msg_len]      1 byte if version <= 2, else 2 bytes little-endian
//! [message]      msg_len bytes
//! ---- version 3 preimage with a message ends here ----
//! signatures[]   64 bytes each, one per distinct signature
//! ```
//!
//! The legacy preimage never covers the memo while the version 3 preimage
//! does. Nodes rely on this, so it stays.

use std::sync::OnceLock;

use super::error::TransactionError;
use super::input::TransactionInput;
use super::output::TransactionOutput;
use super::types::{TxHash, TxVersion};
use crate::config::{
    MAX_INPUTS, MAX_OUTPUTS, SPECIFIER_MESSAGE, SPECIFIER_NO_MESSAGE, WIRE_ENDIAN,
};
use crate::crypto::{sha256, Signature};

/// Memoized full serialization and hash.
///
/// Reset by every `&mut self` operation that can change the wire bytes.
#[derive(Debug, Clone, Default)]
struct WireCache {
    hex: OnceLock<String>,
    hash: OnceLock<TxHash>,
}

/// A UTXO transaction.
///
/// Construct with [`Transaction::new`], resolve inputs if needed, sign with
/// [`Transaction::sign`], then ship [`Transaction::hex`] to a node.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub(super) version: TxVersion,
    pub(super) inputs: Vec<TransactionInput>,
    pub(super) outputs: Vec<TransactionOutput>,
    pub(super) message: Option<Vec<u8>>,
    /// Parsed signatures that could not be mapped to inputs without knowing
    /// their public keys. Assigned by [`Transaction::resolve`].
    pub(super) pending_signatures: Vec<Signature>,
    cache: WireCache,
}

impl Transaction {
    /// Builds an unsigned transaction.
    ///
    /// The version is picked from the outputs' address width. All outputs
    /// must share one width; an empty `message` is treated as no message.
    pub fn new(
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
        message: Option<Vec<u8>>,
    ) -> Result<Self, TransactionError> {
        if inputs.len() > MAX_INPUTS {
            return Err(TransactionError::TooManyInputs(inputs.len()));
        }
        if outputs.len() > MAX_OUTPUTS {
            return Err(TransactionError::TooManyOutputs(outputs.len()));
        }

        let mut widths: Vec<usize> = Vec::new();
        for output in &outputs {
            let width = output.address_bytes().len();
            if !widths.contains(&width) {
                widths.push(width);
            }
        }
        let version = match widths.as_slice() {
            // Only the genesis transaction has no outputs.
            [] => TxVersion::V1,
            [width] => TxVersion::select(false, *width)?,
            _ => return Err(TransactionError::MixedAddressLengths(widths)),
        };

        let message = message.filter(|m| !m.is_empty());
        if let Some(m) = &message {
            if m.len() > version.max_message_length() {
                return Err(TransactionError::MessageTooLong {
                    len: m.len(),
                    max: version.max_message_length(),
                });
            }
        }

        Ok(Self::from_parts(version, inputs, outputs, message, Vec::new()))
    }

    /// Assembles an already-validated transaction. Used by the parser, which
    /// must keep whatever version byte it read.
    pub(crate) fn from_parts(
        version: TxVersion,
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
        message: Option<Vec<u8>>,
        pending_signatures: Vec<Signature>,
    ) -> Self {
        Self {
            version,
            inputs,
            outputs,
            message,
            pending_signatures,
            cache: WireCache::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn version(&self) -> TxVersion {
        self.version
    }

    pub fn inputs(&self) -> &[TransactionInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TransactionOutput] {
        &self.outputs
    }

    pub fn message(&self) -> Option<&[u8]> {
        self.message.as_deref()
    }

    /// Signatures read from the wire that still wait for input resolution.
    pub fn pending_signatures(&self) -> &[Signature] {
        &self.pending_signatures
    }

    pub fn is_resolved(&self) -> bool {
        self.inputs.iter().all(TransactionInput::is_resolved)
    }

    pub fn is_signed(&self) -> bool {
        !self.inputs.is_empty() && self.inputs.iter().all(TransactionInput::is_signed)
    }

    pub(super) fn invalidate_cache(&mut self) {
        self.cache = WireCache::default();
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Distinct signatures in first-seen input order, then any still pending.
    pub fn signatures(&self) -> Vec<Signature> {
        let mut seen: Vec<Signature> = Vec::new();
        let signed = self.inputs.iter().filter_map(TransactionInput::signature);
        for signature in signed.chain(self.pending_signatures.iter()) {
            if !seen.contains(signature) {
                seen.push(*signature);
            }
        }
        seen
    }

    /// The wire bytes. `full = false` yields the signing preimage.
    pub fn serialize(&self, full: bool) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64 + 40 * (self.inputs.len() + self.outputs.len()));
        buf.push(self.version.as_byte());

        buf.push(self.inputs.len() as u8);
        for input in &self.inputs {
            buf.extend_from_slice(&input.to_bytes());
        }

        buf.push(self.outputs.len() as u8);
        for output in &self.outputs {
            buf.extend_from_slice(&output.to_bytes());
        }

        if !full && (!self.version.signs_message() || self.message.is_none()) {
            return buf;
        }

        match &self.message {
            Some(message) => {
                buf.push(SPECIFIER_MESSAGE);
                let width = self.version.message_length_width();
                buf.extend_from_slice(&WIRE_ENDIAN.encode(message.len() as u64, width));
                buf.extend_from_slice(message);
            }
            None => buf.push(SPECIFIER_NO_MESSAGE),
        }

        if !full {
            return buf;
        }

        for signature in self.signatures() {
            buf.extend_from_slice(&signature.to_bytes());
        }
        buf
    }

    /// Hex of [`Transaction::serialize`]. The full form is memoized.
    pub fn hex(&self, full: bool) -> String {
        if full {
            self.cache
                .hex
                .get_or_init(|| hex::encode(self.serialize(true)))
                .clone()
        } else {
            hex::encode(self.serialize(false))
        }
    }

    /// SHA-256 of the full wire bytes.
    pub fn tx_hash(&self) -> TxHash {
        *self
            .cache
            .hash
            .get_or_init(|| TxHash::from_bytes(sha256(&self.serialize(true))))
    }

    /// The transaction id as lowercase hex.
    pub fn hash(&self) -> String {
        self.tx_hash().to_hex()
    }

    // -----------------------------------------------------------------------
    // Fees
    // -----------------------------------------------------------------------

    /// `sum(inputs) - sum(outputs)` in smallest units.
    ///
    /// Negative means the transaction spends more than it has. Every input
    /// must be resolved first.
    pub fn fees(&self) -> Result<i64, TransactionError> {
        let mut total: i128 = 0;
        for (index, input) in self.inputs.iter().enumerate() {
            let amount = input
                .amount()
                .ok_or(TransactionError::UnresolvedInput { index })?;
            total += i128::from(amount.units());
        }
        for output in &self.outputs {
            total -= i128::from(output.amount().units());
        }
        i64::try_from(total).map_err(|_| TransactionError::FeeOverflow)
    }
}

/// Two transactions are equal when their full wire bytes are.
impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.serialize(true) == other.serialize(true)
    }
}

impl Eq for Transaction {}
