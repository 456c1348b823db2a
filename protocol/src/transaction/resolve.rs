//! Input resolution: learning the amount and owner of spent outputs.
//!
//! A parsed transaction only names the outputs it spends. Before its
//! signatures or fees can be checked, each `(tx_hash, index)` has to be
//! looked up somewhere. [`InputResolver`] abstracts over where:
//! [`OutputStore`] answers from transactions already held in memory, the
//! network [`NodeClient`](crate::network::NodeClient) asks a node.

use std::collections::HashMap;

use async_trait::async_trait;

use super::codec::ParsedTransaction;
use super::coinbase::CoinbaseTransaction;
use super::error::TransactionError;
use super::input::ResolvedOutput;
use super::output::TransactionOutput;
use super::transaction::Transaction;
use super::types::TxHash;
use crate::crypto::{Curve, Point};

/// A source of truth for previously produced outputs.
#[async_trait]
pub trait InputResolver: Send + Sync {
    /// `Ok(None)` if the output does not exist. `Err` only when the lookup
    /// itself failed. Addresses are decoded on `curve`.
    async fn resolve_output(
        &self,
        tx_hash: &TxHash,
        index: u8,
        curve: Curve,
    ) -> Result<Option<ResolvedOutput>, TransactionError>;
}

// ---------------------------------------------------------------------------
// OutputStore
// ---------------------------------------------------------------------------

/// In-memory index of known transactions' outputs, keyed by hash.
#[derive(Debug, Clone, Default)]
pub struct OutputStore {
    outputs: HashMap<TxHash, Vec<TransactionOutput>>,
}

impl OutputStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_transaction(&mut self, tx: &Transaction) {
        self.outputs.insert(tx.tx_hash(), tx.outputs().to_vec());
    }

    pub fn insert_coinbase(&mut self, coinbase: &CoinbaseTransaction) {
        self.outputs
            .insert(coinbase.tx_hash(), vec![coinbase.output().clone()]);
    }

    pub fn insert(&mut self, parsed: &ParsedTransaction) {
        match parsed {
            ParsedTransaction::Transfer(tx) => self.insert_transaction(tx),
            ParsedTransaction::Coinbase(cb) => self.insert_coinbase(cb),
        }
    }

    pub fn get(&self, tx_hash: &TxHash, index: u8) -> Option<&TransactionOutput> {
        self.outputs.get(tx_hash)?.get(index as usize)
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

#[async_trait]
impl InputResolver for OutputStore {
    async fn resolve_output(
        &self,
        tx_hash: &TxHash,
        index: u8,
        _curve: Curve,
    ) -> Result<Option<ResolvedOutput>, TransactionError> {
        // Stored outputs already carry the curve they were built on.
        self.get(tx_hash, index)
            .map(TransactionOutput::resolved)
            .transpose()
    }
}

// ---------------------------------------------------------------------------
// Transaction::resolve
// ---------------------------------------------------------------------------

impl Transaction {
    /// Resolves every unresolved input through `resolver`, then maps any
    /// signatures still pending from parsing onto the inputs. Returns the
    /// number of inputs newly resolved.
    ///
    /// Fails with [`TransactionError::UnknownOutput`] if a referenced output
    /// does not exist. Resolution never changes the wire bytes.
    pub async fn resolve<R>(&mut self, resolver: &R) -> Result<usize, TransactionError>
    where
        R: InputResolver + ?Sized,
    {
        let mut resolved = 0;
        for input in self.inputs.iter_mut().filter(|i| !i.is_resolved()) {
            let (tx_hash, index) = input.outpoint();
            match resolver.resolve_output(&tx_hash, index, input.curve()).await? {
                Some(output) => {
                    input.resolve(output);
                    resolved += 1;
                }
                None => {
                    return Err(TransactionError::UnknownOutput {
                        tx_hash: tx_hash.to_hex(),
                        index,
                    })
                }
            }
        }
        self.assign_pending_signatures()?;
        tracing::debug!(tx = %self.hash(), resolved, "resolved transaction inputs");
        Ok(resolved)
    }

    /// One pending signature per distinct signer, in first-seen input order.
    fn assign_pending_signatures(&mut self) -> Result<(), TransactionError> {
        if self.pending_signatures.is_empty() {
            return Ok(());
        }

        let mut signers: Vec<Point> = Vec::new();
        for (index, input) in self.inputs.iter().enumerate() {
            let public_key = input
                .public_key()
                .ok_or(TransactionError::UnresolvedInput { index })?;
            if !signers.contains(public_key) {
                signers.push(*public_key);
            }
        }
        if signers.len() != self.pending_signatures.len() {
            return Err(TransactionError::MalformedSignatures(format!(
                "{} signatures for {} distinct signers",
                self.pending_signatures.len(),
                signers.len()
            )));
        }

        let signatures = std::mem::take(&mut self.pending_signatures);
        for input in self.inputs.iter_mut() {
            let signer = signers.iter().position(|p| Some(p) == input.public_key());
            if let Some(position) = signer {
                input.set_signature(signatures[position]);
            }
        }
        Ok(())
    }
}
