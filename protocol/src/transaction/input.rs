//! Transaction inputs: references to previously produced outputs.
//!
//! ```text
//! tx_hash   32 bytes
//! index      1 byte
//! ```
//!
//! An input starts out knowing only *which* output it spends. Its amount and
//! public key come from somewhere else: the node's UTXO listing when the
//! builder creates it, a local [`Transaction`] or a remote lookup when a
//! parsed transaction is checked. That state is explicit in [`Resolution`];
//! signature checks and fee arithmetic only run on `Resolved` inputs.

use super::error::TransactionError;
use super::transaction::Transaction;
use super::types::{Amount, TxHash};
use crate::config::INPUT_LENGTH;
use crate::crypto::{Curve, Point, PrivateKey, Signature};

/// Amount and owner of the output an input spends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedOutput {
    pub amount: Amount,
    pub public_key: Point,
}

/// Whether an input's referenced output is known yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    #[default]
    Unresolved,
    Resolved(ResolvedOutput),
}

/// A reference to `(tx_hash, index)` plus whatever is known about it.
#[derive(Debug, Clone)]
pub struct TransactionInput {
    tx_hash: TxHash,
    index: u8,
    curve: Curve,
    resolution: Resolution,
    private_key: Option<PrivateKey>,
    signature: Option<Signature>,
}

impl TransactionInput {
    /// An unresolved, unsigned input on `curve`.
    pub fn new(tx_hash: TxHash, index: u8, curve: Curve) -> Self {
        Self {
            tx_hash,
            index,
            curve,
            resolution: Resolution::Unresolved,
            private_key: None,
            signature: None,
        }
    }

    /// Marks the input as resolved with an explicitly known amount and owner.
    pub fn with_resolution(mut self, resolved: ResolvedOutput) -> Self {
        self.resolution = Resolution::Resolved(resolved);
        self
    }

    /// Resolves against a transaction we already hold locally. `source` must
    /// be the transaction this input references.
    pub fn resolved_from(mut self, source: &Transaction) -> Result<Self, TransactionError> {
        if source.hash() != self.tx_hash.to_hex() {
            return Err(self.unknown_output());
        }
        let output = source
            .outputs()
            .get(self.index as usize)
            .ok_or_else(|| self.unknown_output())?;
        self.resolution = Resolution::Resolved(output.resolved()?);
        Ok(self)
    }

    pub fn tx_hash(&self) -> &TxHash {
        &self.tx_hash
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn outpoint(&self) -> (TxHash, u8) {
        (self.tx_hash, self.index)
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.resolution, Resolution::Resolved(_))
    }

    pub fn amount(&self) -> Option<Amount> {
        match &self.resolution {
            Resolution::Resolved(r) => Some(r.amount),
            Resolution::Unresolved => None,
        }
    }

    pub fn public_key(&self) -> Option<&Point> {
        match &self.resolution {
            Resolution::Resolved(r) => Some(&r.public_key),
            Resolution::Unresolved => None,
        }
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    pub(crate) fn resolve(&mut self, resolved: ResolvedOutput) {
        self.resolution = Resolution::Resolved(resolved);
    }

    pub(crate) fn attach_private_key(&mut self, key: PrivateKey) {
        self.private_key = Some(key);
    }

    pub(crate) fn set_signature(&mut self, signature: Signature) {
        self.signature = Some(signature);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(INPUT_LENGTH);
        out.extend_from_slice(self.tx_hash.as_bytes());
        out.push(self.index);
        out
    }

    /// Signs `preimage` with the attached private key on this input's curve.
    pub fn sign(&mut self, preimage: &[u8]) -> Result<(), TransactionError> {
        let key = self
            .private_key
            .as_ref()
            .ok_or_else(|| TransactionError::MissingPrivateKey {
                tx_hash: self.tx_hash.to_hex(),
                index: self.index,
            })?;
        self.signature = Some(key.sign(preimage)?);
        Ok(())
    }

    /// `r || s` as 64 bytes, if signed.
    pub fn signature_bytes(&self) -> Option<[u8; 64]> {
        self.signature.map(|s| s.to_bytes())
    }

    /// Checks the signature over `preimage` against the resolved owner.
    /// Unresolved or unsigned inputs are simply invalid; this never errors.
    pub fn verify(&self, preimage: &[u8]) -> bool {
        let Resolution::Resolved(resolved) = &self.resolution else {
            tracing::debug!(tx_hash = %self.tx_hash, index = self.index, "input unresolved");
            return false;
        };
        let Some(signature) = &self.signature else {
            tracing::debug!(tx_hash = %self.tx_hash, index = self.index, "input unsigned");
            return false;
        };
        self.curve.verify(&resolved.public_key, preimage, signature)
    }

    fn unknown_output(&self) -> TransactionError {
        TransactionError::UnknownOutput {
            tx_hash: self.tx_hash.to_hex(),
            index: self.index,
        }
    }
}
