//! Spend construction via UTXO selection.
//!
//! The [`TransactionBuilder`] turns a payment request into a signed,
//! broadcast [`Transaction`]:
//!
//! 1. Ask the node for each key's spendable outputs, in key order, until the
//!    cheapest 255 of everything collected so far cover the amount.
//! 2. Sort the pool ascending by amount and take outputs until they cover
//!    the amount.
//! 3. Pay the recipient, send any remainder back as change.
//! 4. Sign with every key and push the hex to the node.
//!
//! Running out of money, waiting on unconfirmed transactions or a node
//! saying no are expected outcomes, reported as [`SendOutcome`] rather than
//! as errors. `Err` is reserved for structural defects such as outputs that
//! cannot share one address width.

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use super::error::TransactionError;
use super::input::{ResolvedOutput, TransactionInput};
use super::output::TransactionOutput;
use super::transaction::Transaction;
use super::types::{Amount, TxHash};
use crate::config::MAX_INPUTS;
use crate::crypto::{point_to_string, AddressFormat, Curve, Point, PrivateKey};
use crate::network::{AddressInfo, NodeApi, NodeError, OutPointRef, SpendableOutput};

// ---------------------------------------------------------------------------
// SendOutcome
// ---------------------------------------------------------------------------

/// What happened to a send request.
///
/// Only [`SendOutcome::Broadcast`] carries a transaction. Everything else is
/// a diagnostic for the user; none of them is a bug.
#[derive(Debug, Clone)]
pub enum SendOutcome {
    /// Signed and accepted by the node.
    Broadcast(Transaction),
    /// No usable outputs right now, but these transactions are still
    /// unconfirmed and may free some up.
    PendingConfirmation { pending: Vec<TxHash> },
    InsufficientFunds { available: Amount, required: Amount },
    /// Bad recipient, zero amount, no keys, keys on the wrong curve.
    InvalidRequest { reason: String },
    NodeRejected { reason: String },
    NetworkFailure { reason: String },
}

impl SendOutcome {
    /// The broadcast transaction, or `None` for every other outcome.
    ///
    /// The transaction's fees are not precomputed. Call
    /// [`Transaction::fees`] if you need them.
    pub fn into_transaction(self) -> Option<Transaction> {
        match self {
            SendOutcome::Broadcast(tx) => Some(tx),
            _ => None,
        }
    }

    pub fn transaction(&self) -> Option<&Transaction> {
        match self {
            SendOutcome::Broadcast(tx) => Some(tx),
            _ => None,
        }
    }

    pub fn is_broadcast(&self) -> bool {
        matches!(self, SendOutcome::Broadcast(_))
    }

    fn invalid(reason: impl Into<String>) -> Self {
        SendOutcome::InvalidRequest {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SendOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendOutcome::Broadcast(tx) => write!(f, "broadcast transaction {}", tx.hash()),
            SendOutcome::PendingConfirmation { pending } => write!(
                f,
                "funds are waiting on {} unconfirmed transaction(s)",
                pending.len()
            ),
            SendOutcome::InsufficientFunds {
                available,
                required,
            } => write!(f, "insufficient funds: {available} available, {required} required"),
            SendOutcome::InvalidRequest { reason } => write!(f, "invalid request: {reason}"),
            SendOutcome::NodeRejected { reason } => {
                write!(f, "node rejected transaction: {reason}")
            }
            SendOutcome::NetworkFailure { reason } => write!(f, "network failure: {reason}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Selection pool
// ---------------------------------------------------------------------------

/// A spendable output together with the public key that owns it.
#[derive(Debug, Clone)]
struct Candidate {
    output: SpendableOutput,
    owner: Point,
}

#[derive(Debug, Default)]
struct Pool {
    candidates: Vec<Candidate>,
    pending: Vec<TxHash>,
    /// Outpoints already in `candidates`. Keys may repeat or share outputs.
    seen: HashSet<OutPointRef>,
}

impl Pool {
    fn add(&mut self, info: AddressInfo, owner: Point) -> usize {
        for pending in info.pending_transactions {
            if !self.pending.contains(&pending.hash) {
                self.pending.push(pending.hash);
            }
        }

        let spent: HashSet<OutPointRef> = info.pending_spent_outputs.into_iter().collect();
        let before = self.candidates.len();
        let seen = &mut self.seen;
        self.candidates.extend(
            info.spendable_outputs
                .into_iter()
                .filter(|o| {
                    let outpoint = OutPointRef {
                        tx_hash: o.tx_hash,
                        index: o.index,
                    };
                    !spent.contains(&outpoint) && seen.insert(outpoint)
                })
                .map(|output| Candidate { output, owner }),
        );
        self.candidates.sort_by_key(|c| c.output.amount);
        self.candidates.len() - before
    }

    fn total<'a>(candidates: impl IntoIterator<Item = &'a Candidate>) -> Amount {
        let units = candidates
            .into_iter()
            .fold(0u64, |acc, c| acc.saturating_add(c.output.amount.units()));
        Amount::from_units(units)
    }

    /// What the cheapest outputs one transaction can hold add up to.
    fn usable(&self) -> Amount {
        Self::total(self.candidates.iter().take(MAX_INPUTS))
    }

    fn shortfall(self, available: Amount, required: Amount) -> SendOutcome {
        if self.pending.is_empty() {
            SendOutcome::InsufficientFunds {
                available,
                required,
            }
        } else {
            SendOutcome::PendingConfirmation {
                pending: self.pending,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Builds, signs and broadcasts a payment.
///
/// # Usage
///
/// ```rust,no_run
/// use ecliptic_protocol::crypto::{AddressFormat, Curve, PrivateKey};
/// use ecliptic_protocol::network::{NodeClient, NodeClientConfig};
/// use ecliptic_protocol::transaction::{Amount, TransactionBuilder};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let key = PrivateKey::from_hex(Curve::Secp256k1, &"01".repeat(32))?;
/// let sender = key.address(AddressFormat::Compressed)?;
/// let node = NodeClient::new(NodeClientConfig::default())?;
///
/// let amount: Amount = "4".parse()?;
/// let outcome = TransactionBuilder::new(vec![key], sender, "recipient-address", amount)
///     .message("rent")
///     .send(&node)
///     .await?;
/// println!("{outcome}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    private_keys: Vec<PrivateKey>,
    sender: String,
    recipient: String,
    amount: Amount,
    message: Option<Vec<u8>>,
    change_address: Option<String>,
    address_format: AddressFormat,
    query_timeout: Option<Duration>,
    curve: Option<Curve>,
}

impl TransactionBuilder {
    /// A payment of `amount` from the outputs owned by `private_keys` to
    /// `recipient`. Change goes back to `sender` unless
    /// [`change_address`](Self::change_address) says otherwise.
    pub fn new(
        private_keys: Vec<PrivateKey>,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: Amount,
    ) -> Self {
        Self {
            private_keys,
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
            message: None,
            change_address: None,
            address_format: AddressFormat::default(),
            query_timeout: None,
            curve: None,
        }
    }

    /// Attaches a memo. Version 3 transactions sign it, legacy ones do not.
    pub fn message(mut self, message: impl Into<Vec<u8>>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn change_address(mut self, address: impl Into<String>) -> Self {
        self.change_address = Some(address.into());
        self
    }

    /// Address format used to ask the node about each key. Compressed by
    /// default.
    pub fn address_format(mut self, format: AddressFormat) -> Self {
        self.address_format = format;
        self
    }

    /// Upper bound for each address query. A key whose query times out is
    /// skipped as if it had no outputs.
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    /// Curve for outputs and inputs. Defaults to the first key's curve.
    pub fn curve(mut self, curve: Curve) -> Self {
        self.curve = Some(curve);
        self
    }

    /// Selects outputs, builds and signs the transaction, and pushes it.
    pub async fn send<N>(&self, node: &N) -> Result<SendOutcome, TransactionError>
    where
        N: NodeApi + ?Sized,
    {
        let tx = match self.prepare(node).await? {
            Ok(tx) => tx,
            Err(outcome) => return Ok(outcome),
        };

        match node.push_tx(&tx.hex(true)).await {
            Ok(()) => {
                tracing::info!(
                    tx = %tx.hash(),
                    inputs = tx.inputs().len(),
                    outputs = tx.outputs().len(),
                    "transaction broadcast"
                );
                Ok(SendOutcome::Broadcast(tx))
            }
            Err(NodeError::Rejected(reason)) => {
                tracing::warn!(tx = %tx.hash(), %reason, "node rejected transaction");
                Ok(SendOutcome::NodeRejected { reason })
            }
            Err(e) => {
                tracing::warn!(tx = %tx.hash(), error = %e, "push failed");
                Ok(SendOutcome::NetworkFailure {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Everything [`send`](Self::send) does except the push: the signed
    /// transaction, or the outcome explaining why there is none.
    pub async fn prepare<N>(
        &self,
        node: &N,
    ) -> Result<Result<Transaction, SendOutcome>, TransactionError>
    where
        N: NodeApi + ?Sized,
    {
        let Some(first_key) = self.private_keys.first() else {
            return Ok(Err(SendOutcome::invalid("no private keys given")));
        };
        let curve = self.curve.unwrap_or_else(|| first_key.curve());
        if let Some(key) = self.private_keys.iter().find(|k| k.curve() != curve) {
            return Ok(Err(SendOutcome::invalid(format!(
                "a {} key cannot spend {curve} outputs",
                key.curve()
            ))));
        }
        if self.amount.is_zero() {
            return Ok(Err(SendOutcome::invalid("amount must be positive")));
        }

        let recipient = match TransactionOutput::new(&self.recipient, self.amount, curve) {
            Ok(output) if output.verify() => output,
            Ok(_) => {
                return Ok(Err(SendOutcome::invalid(format!(
                    "recipient is not a point on {curve}"
                ))))
            }
            Err(e) => return Ok(Err(SendOutcome::invalid(format!("recipient: {e}")))),
        };

        let pool = self.collect(node).await?;
        let target = self.amount;
        let available = Pool::total(&pool.candidates);
        if pool.candidates.is_empty() || available < target {
            tracing::debug!(%available, required = %target, "not enough spendable outputs");
            return Ok(Err(pool.shortfall(available, target)));
        }

        let mut selected: Vec<&Candidate> = Vec::new();
        let mut selected_sum = Amount::ZERO;
        for candidate in &pool.candidates {
            if selected_sum >= target {
                break;
            }
            selected_sum = Amount::from_units(
                selected_sum
                    .units()
                    .saturating_add(candidate.output.amount.units()),
            );
            selected.push(candidate);
        }
        if selected.len() > MAX_INPUTS {
            tracing::warn!(
                needed = selected.len(),
                max = MAX_INPUTS,
                "payment needs more inputs than one transaction holds"
            );
            let usable = pool.usable();
            return Ok(Err(pool.shortfall(usable, target)));
        }

        let mut outputs = vec![recipient];
        if let Some(change) = selected_sum.checked_sub(target).filter(|c| !c.is_zero()) {
            let change_address = self.change_address.as_deref().unwrap_or(&self.sender);
            match TransactionOutput::new(change_address, change, curve) {
                Ok(output) => outputs.push(output),
                Err(e) => return Ok(Err(SendOutcome::invalid(format!("change address: {e}")))),
            }
        }

        let inputs = selected
            .iter()
            .map(|c| {
                TransactionInput::new(c.output.tx_hash, c.output.index, curve).with_resolution(
                    ResolvedOutput {
                        amount: c.output.amount,
                        public_key: c.owner,
                    },
                )
            })
            .collect();

        let mut tx = Transaction::new(inputs, outputs, self.message.clone())?;
        let signed = tx.sign(&self.private_keys)?;
        tracing::debug!(
            tx = %tx.hash(),
            selected = selected.len(),
            signed,
            total = %selected_sum,
            "built transaction"
        );
        Ok(Ok(tx))
    }

    /// Step 1: query keys in order until the pool can cover the amount.
    async fn collect<N>(&self, node: &N) -> Result<Pool, TransactionError>
    where
        N: NodeApi + ?Sized,
    {
        let mut pool = Pool::default();
        for key in &self.private_keys {
            let owner = key.public_point()?;
            let address = point_to_string(&owner, self.address_format);
            let info = match self.query(node, &address).await {
                Ok(info) => info,
                Err(e) => {
                    tracing::warn!(%address, error = %e, "skipping key: address query failed");
                    continue;
                }
            };
            let added = pool.add(info, owner);
            tracing::debug!(%address, added, pooled = pool.candidates.len(), "collected outputs");
            if pool.usable() >= self.amount {
                break;
            }
        }
        Ok(pool)
    }

    async fn query<N>(&self, node: &N, address: &str) -> Result<AddressInfo, NodeError>
    where
        N: NodeApi + ?Sized,
    {
        match self.query_timeout {
            Some(limit) => tokio::time::timeout(limit, node.get_address_info(address))
                .await
                .map_err(|_| NodeError::Timeout(limit))?,
            None => node.get_address_info(address).await,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::crypto::sha256;
    use crate::network::PendingTransaction;

    /// A node that answers from a fixed address book and records pushes.
    #[derive(Default)]
    struct MemoryNode {
        addresses: HashMap<String, AddressInfo>,
        queried: Mutex<Vec<String>>,
        pushed: Mutex<Vec<String>>,
        reject_with: Option<String>,
        stall: Option<Duration>,
    }

    impl MemoryNode {
        fn with_outputs(mut self, address: &str, amounts: &[&str]) -> Self {
            let info = self.addresses.entry(address.to_string()).or_default();
            for (i, amount) in amounts.iter().enumerate() {
                info.spendable_outputs.push(SpendableOutput {
                    tx_hash: TxHash::from_bytes(sha256(format!("{address}:{i}").as_bytes())),
                    index: i as u8,
                    amount: amount.parse().unwrap(),
                });
            }
            self
        }

        fn pushed(&self) -> Vec<String> {
            self.pushed.lock().unwrap().clone()
        }

        fn queried(&self) -> Vec<String> {
            self.queried.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NodeApi for MemoryNode {
        async fn get_address_info(&self, address: &str) -> Result<AddressInfo, NodeError> {
            self.queried.lock().unwrap().push(address.to_string());
            if let Some(delay) = self.stall {
                tokio::time::sleep(delay).await;
            }
            Ok(self.addresses.get(address).cloned().unwrap_or_default())
        }

        async fn push_tx(&self, tx_hex: &str) -> Result<(), NodeError> {
            if let Some(reason) = &self.reject_with {
                return Err(NodeError::Rejected(reason.clone()));
            }
            self.pushed.lock().unwrap().push(tx_hex.to_string());
            Ok(())
        }

        async fn get_transaction(&self, _tx_hash: &TxHash) -> Result<Option<String>, NodeError> {
            Ok(None)
        }
    }

    struct Wallet {
        key: PrivateKey,
        address: String,
    }

    fn wallet(curve: Curve) -> Wallet {
        let key = PrivateKey::generate(curve);
        let address = key.address(AddressFormat::Compressed).unwrap();
        Wallet { key, address }
    }

    fn coins(s: &str) -> Amount {
        s.parse().unwrap()
    }

    /// A builder paying `amount` from `sender`'s address, spending `keys`.
    fn pay(
        keys: Vec<PrivateKey>,
        sender: &str,
        recipient: &str,
        amount: &str,
    ) -> TransactionBuilder {
        TransactionBuilder::new(keys, sender, recipient, coins(amount))
    }

    #[tokio::test]
    async fn simple_payment_returns_change_to_sender() {
        let sender = wallet(Curve::Secp256k1);
        let recipient = wallet(Curve::Secp256k1);
        let node = MemoryNode::default().with_outputs(&sender.address, &["10"]);

        let outcome = pay(vec![sender.key.clone()], &sender.address, &recipient.address, "4")
            .send(&node)
            .await
            .unwrap();

        let tx = outcome.into_transaction().expect("broadcast");
        assert_eq!(tx.outputs().len(), 2);
        assert_eq!(tx.outputs()[0].address(), recipient.address);
        assert_eq!(tx.outputs()[0].amount(), coins("4"));
        assert_eq!(tx.outputs()[1].address(), sender.address);
        assert_eq!(tx.outputs()[1].amount(), coins("6"));
        assert_eq!(tx.fees().unwrap(), 0);
        assert!(tx.verify(true));
        assert_eq!(node.pushed(), vec![tx.hex(true)]);
    }

    #[tokio::test]
    async fn insufficient_funds_broadcasts_nothing() {
        let sender = wallet(Curve::P256);
        let recipient = wallet(Curve::P256);
        let node = MemoryNode::default().with_outputs(&sender.address, &["1"]);

        let outcome = pay(vec![sender.key], &sender.address, &recipient.address, "2")
            .send(&node)
            .await
            .unwrap();

        match outcome {
            SendOutcome::InsufficientFunds {
                available,
                required,
            } => {
                assert_eq!(available, coins("1"));
                assert_eq!(required, coins("2"));
            }
            other => panic!("expected InsufficientFunds, got {other}"),
        }
        assert!(node.pushed().is_empty());
    }

    #[tokio::test]
    async fn pending_transactions_are_reported() {
        let sender = wallet(Curve::Secp256k1);
        let recipient = wallet(Curve::Secp256k1);
        let mut node = MemoryNode::default();
        let pending_hash = TxHash::from_bytes([7; 32]);
        node.addresses.insert(
            sender.address.clone(),
            AddressInfo {
                pending_transactions: vec![PendingTransaction {
                    hash: pending_hash,
                    inputs: serde_json::Value::Null,
                    outputs: serde_json::Value::Null,
                }],
                ..AddressInfo::default()
            },
        );

        let outcome = pay(vec![sender.key], &sender.address, &recipient.address, "1")
            .send(&node)
            .await
            .unwrap();

        match outcome {
            SendOutcome::PendingConfirmation { pending } => assert_eq!(pending, vec![pending_hash]),
            other => panic!("expected PendingConfirmation, got {other}"),
        }
    }

    #[tokio::test]
    async fn pending_spent_outputs_are_not_selected() {
        let sender = wallet(Curve::Secp256k1);
        let recipient = wallet(Curve::Secp256k1);
        let mut node = MemoryNode::default().with_outputs(&sender.address, &["5", "5"]);
        let info = node.addresses.get_mut(&sender.address).unwrap();
        let spent = info.spendable_outputs[0].clone();
        info.pending_spent_outputs.push(OutPointRef {
            tx_hash: spent.tx_hash,
            index: spent.index,
        });

        let tx = pay(vec![sender.key], &sender.address, &recipient.address, "3")
            .send(&node)
            .await
            .unwrap()
            .into_transaction()
            .unwrap();

        assert_eq!(tx.inputs().len(), 1);
        assert_ne!(tx.inputs()[0].outpoint(), (spent.tx_hash, spent.index));
    }

    #[tokio::test]
    async fn smallest_outputs_are_spent_first() {
        let sender = wallet(Curve::Secp256k1);
        let recipient = wallet(Curve::Secp256k1);
        let node = MemoryNode::default().with_outputs(&sender.address, &["5", "1", "3"]);

        let tx = pay(vec![sender.key], &sender.address, &recipient.address, "4")
            .send(&node)
            .await
            .unwrap()
            .into_transaction()
            .unwrap();

        let spent: Vec<Amount> = tx.inputs().iter().filter_map(|i| i.amount()).collect();
        assert_eq!(spent, vec![coins("1"), coins("3")]);
        // Exact match: no change output.
        assert_eq!(tx.outputs().len(), 1);
    }

    #[tokio::test]
    async fn stops_querying_once_covered() {
        let rich = wallet(Curve::Secp256k1);
        let other = PrivateKey::generate(Curve::Secp256k1);
        let recipient = wallet(Curve::Secp256k1);
        let node = MemoryNode::default().with_outputs(&rich.address, &["10"]);

        let outcome = pay(vec![rich.key, other], &rich.address, &recipient.address, "4")
            .send(&node)
            .await
            .unwrap();

        assert!(outcome.is_broadcast());
        assert_eq!(node.queried(), vec![rich.address]);
    }

    #[tokio::test]
    async fn inputs_from_several_keys_are_all_signed() {
        let alice = wallet(Curve::P256);
        let bob = wallet(Curve::P256);
        let recipient = wallet(Curve::P256);
        let node = MemoryNode::default()
            .with_outputs(&alice.address, &["2"])
            .with_outputs(&bob.address, &["3"]);

        let tx = pay(vec![alice.key, bob.key], &alice.address, &recipient.address, "4")
            .message("split bill")
            .send(&node)
            .await
            .unwrap()
            .into_transaction()
            .unwrap();

        assert_eq!(tx.inputs().len(), 2);
        assert!(tx.is_signed());
        assert_eq!(tx.message(), Some(&b"split bill"[..]));
        assert!(tx.verify(true));
    }

    #[tokio::test]
    async fn repeated_key_does_not_double_count_outputs() {
        let sender = wallet(Curve::Secp256k1);
        let recipient = wallet(Curve::Secp256k1);
        let node = MemoryNode::default().with_outputs(&sender.address, &["3"]);
        let keys = vec![sender.key.clone(), sender.key];

        let outcome = pay(keys, &sender.address, &recipient.address, "5")
            .send(&node)
            .await
            .unwrap();

        match outcome {
            SendOutcome::InsufficientFunds {
                available,
                required,
            } => {
                assert_eq!(available, coins("3"));
                assert_eq!(required, coins("5"));
            }
            other => panic!("expected InsufficientFunds, got {other}"),
        }
        assert!(node.pushed().is_empty());
    }

    #[tokio::test]
    async fn repeated_key_spends_each_output_once() {
        let sender = wallet(Curve::P256);
        let recipient = wallet(Curve::P256);
        let node = MemoryNode::default().with_outputs(&sender.address, &["3", "4"]);
        let keys = vec![sender.key.clone(), sender.key];

        let tx = pay(keys, &sender.address, &recipient.address, "5")
            .send(&node)
            .await
            .unwrap()
            .into_transaction()
            .unwrap();

        assert_eq!(tx.inputs().len(), 2);
        assert!(!tx.has_double_spend());
        assert_eq!(tx.outputs()[1].amount(), coins("2"));
        assert!(tx.verify(true));
    }

    #[tokio::test]
    async fn output_reported_for_two_keys_is_selected_once() {
        let alice = wallet(Curve::Secp256k1);
        let bob = wallet(Curve::Secp256k1);
        let recipient = wallet(Curve::Secp256k1);
        let mut node = MemoryNode::default()
            .with_outputs(&alice.address, &["3"])
            .with_outputs(&bob.address, &["2"]);
        // A node with a stale index lists alice's output under bob as well.
        let shared = node.addresses[&alice.address].spendable_outputs[0].clone();
        node.addresses
            .get_mut(&bob.address)
            .unwrap()
            .spendable_outputs
            .push(shared.clone());

        let keys = vec![alice.key, bob.key];
        let tx = pay(keys, &alice.address, &recipient.address, "5")
            .send(&node)
            .await
            .unwrap()
            .into_transaction()
            .unwrap();

        let outpoints: Vec<_> = tx.inputs().iter().map(|i| i.outpoint()).collect();
        assert_eq!(outpoints.len(), 2);
        assert!(outpoints.contains(&(shared.tx_hash, shared.index)));
        assert!(!tx.has_double_spend());
        assert!(tx.verify(true));
        assert_eq!(node.pushed(), vec![tx.hex(true)]);
    }

    #[tokio::test]
    async fn node_rejection_is_an_outcome() {
        let sender = wallet(Curve::Secp256k1);
        let recipient = wallet(Curve::Secp256k1);
        let mut node = MemoryNode::default().with_outputs(&sender.address, &["10"]);
        node.reject_with = Some("double spend".to_string());

        let outcome = pay(vec![sender.key], &sender.address, &recipient.address, "4")
            .send(&node)
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            SendOutcome::NodeRejected { ref reason } if reason == "double spend"
        ));
        assert!(outcome.into_transaction().is_none());
    }

    #[tokio::test]
    async fn bad_recipient_is_an_invalid_request() {
        let sender = wallet(Curve::Secp256k1);
        let node = MemoryNode::default().with_outputs(&sender.address, &["10"]);

        let outcome = pay(vec![sender.key], &sender.address, "not-an-address", "4")
            .send(&node)
            .await
            .unwrap();

        assert!(matches!(outcome, SendOutcome::InvalidRequest { .. }));
        assert!(node.queried().is_empty());
    }

    #[tokio::test]
    async fn zero_amount_is_an_invalid_request() {
        let sender = wallet(Curve::Secp256k1);
        let node = MemoryNode::default();
        let keys = vec![sender.key];
        let outcome = TransactionBuilder::new(keys, &sender.address, &sender.address, Amount::ZERO)
            .send(&node)
            .await
            .unwrap();
        assert!(matches!(outcome, SendOutcome::InvalidRequest { .. }));
    }

    #[tokio::test]
    async fn mixed_address_widths_are_a_structural_error() {
        let sender = wallet(Curve::Secp256k1);
        let recipient = wallet(Curve::Secp256k1);
        let full_change = sender.key.address(AddressFormat::Full).unwrap();
        let node = MemoryNode::default().with_outputs(&sender.address, &["10"]);

        let result = pay(vec![sender.key], &sender.address, &recipient.address, "4")
            .change_address(full_change)
            .send(&node)
            .await;

        assert!(matches!(result, Err(TransactionError::MixedAddressLengths(_))));
        assert!(node.pushed().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_node_query_is_skipped() {
        let sender = wallet(Curve::Secp256k1);
        let recipient = wallet(Curve::Secp256k1);
        let mut node = MemoryNode::default().with_outputs(&sender.address, &["10"]);
        node.stall = Some(Duration::from_secs(60));

        let outcome = pay(vec![sender.key], &sender.address, &recipient.address, "4")
            .query_timeout(Duration::from_secs(1))
            .send(&node)
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            SendOutcome::InsufficientFunds { available, .. } if available.is_zero()
        ));
    }
}
