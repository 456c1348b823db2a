//! # Node API Definitions
//!
//! Request and response types for the node's HTTP JSON API. This module
//! defines types only; [`super::client::NodeClient`] does the HTTP.
//!
//! Every response is wrapped in the same envelope:
//!
//! ```json
//! { "ok": true, "result": { ... } }
//! { "ok": false, "error": "reason" }
//! ```
//!
//! ## Endpoint Index
//!
//! | Endpoint                | Method | Description                              |
//! |-------------------------|--------|------------------------------------------|
//! | `/get_address_info`     | GET    | Balance, spendable and pending outputs   |
//! | `/push_tx`              | POST   | Submit a signed transaction (hex)        |
//! | `/get_transaction`      | GET    | Fetch a transaction's hex by hash        |

use serde::{Deserialize, Serialize};

use super::client::NodeError;
use crate::transaction::{Amount, TxHash};

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// Node endpoints the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeEndpoint {
    /// Query params: `address`, `show_pending`, `transactions_count_limit`.
    GetAddressInfo,
    /// JSON body: [`PushTxRequest`].
    PushTx,
    /// Query param: `tx_hash`.
    GetTransaction,
}

impl NodeEndpoint {
    pub fn path(self) -> &'static str {
        match self {
            NodeEndpoint::GetAddressInfo => "get_address_info",
            NodeEndpoint::PushTx => "push_tx",
            NodeEndpoint::GetTransaction => "get_transaction",
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The `{ok, result, error}` envelope around every node response.
///
/// `result` is present when `ok` is true, `error` usually when it is false.
/// Nodes are not strict about either, hence the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> NodeResponse<T> {
    /// `ok` with a result, or the node's complaint as [`NodeError`].
    pub fn into_result(self) -> Result<T, NodeError> {
        if !self.ok {
            return Err(NodeError::Rejected(
                self.error.unwrap_or_else(|| "no reason given".to_string()),
            ));
        }
        self.result.ok_or(NodeError::MissingResult)
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Result of `/get_address_info`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressInfo {
    pub balance: Amount,
    pub spendable_outputs: Vec<SpendableOutput>,
    /// Outputs already consumed by a transaction still in the mempool.
    pub pending_spent_outputs: Vec<OutPointRef>,
    pub pending_transactions: Vec<PendingTransaction>,
}

/// An unspent output owned by the queried address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendableOutput {
    pub tx_hash: TxHash,
    pub index: u8,
    pub amount: Amount,
}

/// A bare `(tx_hash, index)` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPointRef {
    pub tx_hash: TxHash,
    pub index: u8,
}

/// A mempool transaction touching the queried address. Only the hash is
/// used; inputs and outputs are kept as the node sent them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingTransaction {
    pub hash: TxHash,
    #[serde(default)]
    pub inputs: serde_json::Value,
    #[serde(default)]
    pub outputs: serde_json::Value,
}

/// Body of `/push_tx`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushTxRequest {
    pub tx_hex: String,
}

/// Result of `/get_transaction`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionInfo {
    pub tx_hex: String,
}
