//! # Network Module
//!
//! The wallet's only external dependency: a node reachable over HTTP JSON.
//!
//! ```text
//! rpc.rs     — Endpoint paths, response envelope and payload types
//! client.rs  — NodeApi trait, reqwest NodeClient, configuration, errors
//! ```
//!
//! The authoritative validation of every transaction happens on the node.
//! This side only queries spendable outputs, broadcasts, and fetches
//! transactions for input resolution.

pub mod client;
pub mod rpc;

pub use client::{NodeApi, NodeClient, NodeClientConfig, NodeError};
pub use rpc::{
    AddressInfo, NodeEndpoint, NodeResponse, OutPointRef, PendingTransaction, PushTxRequest,
    SpendableOutput, TransactionInfo,
};
