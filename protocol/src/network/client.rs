//! HTTP client for the node API.
//!
//! [`NodeApi`] is the seam the transaction builder depends on; [`NodeClient`]
//! is its `reqwest` implementation. Tests substitute an in-memory node.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::rpc::{AddressInfo, NodeEndpoint, NodeResponse, PushTxRequest, TransactionInfo};
use crate::config::{
    DEFAULT_NODE_URL, DEFAULT_REQUEST_TIMEOUT, DEFAULT_TRANSACTIONS_COUNT_LIMIT,
};
use crate::crypto::Curve;
use crate::transaction::{
    decode_transaction, InputResolver, ResolvedOutput, TransactionError, TxHash,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur when talking to a node.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Transport-level failure: connection refused, TLS, malformed body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The node answered `ok: false`.
    #[error("node rejected request: {0}")]
    Rejected(String),

    /// The node answered `ok: true` without a result.
    #[error("node response is missing its result")]
    MissingResult,

    #[error("node request timed out after {0:?}")]
    Timeout(Duration),

    /// The body was not the expected JSON envelope.
    #[error("undecodable node response: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Where and how to reach a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeClientConfig {
    pub base_url: String,
    /// Serialized as whole seconds.
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
    /// Ask the node to include mempool state in address queries.
    pub show_pending: bool,
    pub transactions_count_limit: u32,
}

impl Default for NodeClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_NODE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            show_pending: true,
            transactions_count_limit: DEFAULT_TRANSACTIONS_COUNT_LIMIT,
        }
    }
}

impl NodeClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

// ---------------------------------------------------------------------------
// NodeApi
// ---------------------------------------------------------------------------

/// The node operations the wallet core consumes.
#[async_trait]
pub trait NodeApi: Send + Sync {
    /// Balance, spendable outputs and mempool state of `address`.
    async fn get_address_info(&self, address: &str) -> Result<AddressInfo, NodeError>;

    /// Broadcasts a signed transaction given as full hex.
    async fn push_tx(&self, tx_hex: &str) -> Result<(), NodeError>;

    /// Hex of a known transaction, `None` if the node has never seen it.
    async fn get_transaction(&self, tx_hash: &TxHash) -> Result<Option<String>, NodeError>;
}

// ---------------------------------------------------------------------------
// NodeClient
// ---------------------------------------------------------------------------

/// `reqwest`-backed [`NodeApi`].
///
/// Also an [`InputResolver`]: inputs are resolved by fetching the referenced
/// transaction and decoding its outputs locally.
#[derive(Debug, Clone)]
pub struct NodeClient {
    config: NodeClientConfig,
    http: reqwest::Client,
}

impl NodeClient {
    pub fn new(config: NodeClientConfig) -> Result<Self, NodeError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &NodeClientConfig {
        &self.config
    }

    fn url(&self, endpoint: NodeEndpoint) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint.path())
    }

    fn transport(&self, error: reqwest::Error) -> NodeError {
        if error.is_timeout() {
            NodeError::Timeout(self.config.request_timeout)
        } else {
            NodeError::Http(error)
        }
    }

    /// Decodes the envelope regardless of HTTP status: nodes report
    /// rejections as `ok: false` bodies on 4xx responses too.
    async fn read<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<NodeResponse<T>, NodeError> {
        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport(e))?;
        serde_json::from_str(&body).map_err(|e| NodeError::Decode(format!("HTTP {status}: {e}")))
    }
}

#[async_trait]
impl NodeApi for NodeClient {
    async fn get_address_info(&self, address: &str) -> Result<AddressInfo, NodeError> {
        let show_pending = self.config.show_pending.to_string();
        let limit = self.config.transactions_count_limit.to_string();
        let response = self
            .http
            .get(self.url(NodeEndpoint::GetAddressInfo))
            .query(&[
                ("address", address),
                ("show_pending", show_pending.as_str()),
                ("transactions_count_limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        self.read::<AddressInfo>(response).await?.into_result()
    }

    async fn push_tx(&self, tx_hex: &str) -> Result<(), NodeError> {
        let body = PushTxRequest {
            tx_hex: tx_hex.to_string(),
        };
        let response = self
            .http
            .post(self.url(NodeEndpoint::PushTx))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        let envelope = self.read::<serde_json::Value>(response).await?;
        if envelope.ok {
            Ok(())
        } else {
            Err(NodeError::Rejected(
                envelope.error.unwrap_or_else(|| "no reason given".to_string()),
            ))
        }
    }

    async fn get_transaction(&self, tx_hash: &TxHash) -> Result<Option<String>, NodeError> {
        let response = self
            .http
            .get(self.url(NodeEndpoint::GetTransaction))
            .query(&[("tx_hash", tx_hash.to_hex())])
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        let missing = response.status() == reqwest::StatusCode::NOT_FOUND;
        let envelope = self.read::<TransactionInfo>(response).await?;
        if envelope.ok {
            return Ok(Some(envelope.into_result()?.tx_hex));
        }
        let reason = envelope.error;
        if missing || is_not_found(reason.as_deref()) {
            tracing::debug!(%tx_hash, error = ?reason, "node does not know transaction");
            return Ok(None);
        }
        Err(NodeError::Rejected(reason.unwrap_or_default()))
    }
}

/// Whether an `ok: false` reason means the node has no such record, as
/// opposed to failing to look it up.
fn is_not_found(reason: Option<&str>) -> bool {
    reason.map_or(true, |r| r.to_ascii_lowercase().contains("not found"))
}

#[async_trait]
impl InputResolver for NodeClient {
    async fn resolve_output(
        &self,
        tx_hash: &TxHash,
        index: u8,
        curve: Curve,
    ) -> Result<Option<ResolvedOutput>, TransactionError> {
        let Some(hex) = self
            .get_transaction(tx_hash)
            .await
            .map_err(|e| TransactionError::Resolution(e.to_string()))?
        else {
            return Ok(None);
        };

        let parsed = decode_transaction(&hex, curve)?;
        if parsed.tx_hash() != *tx_hash {
            return Err(TransactionError::Resolution(format!(
                "node returned {} when asked for {}",
                parsed.hash(),
                tx_hash
            )));
        }
        parsed.output(index).map(|o| o.resolved()).transpose()
    }
}
