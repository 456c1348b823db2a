//! # Transaction Module
//!
//! Construction, signing, serialization, parsing and verification of
//! Ecliptic UTXO transactions. Every transfer spends previously produced
//! outputs (inputs) and creates new ones (outputs); blocks mint value through
//! a single-output [`CoinbaseTransaction`].
//!
//! ## Architecture
//!
//! ```text
//! types.rs        — Amount, TxHash, TxVersion and byte-order helpers
//! error.rs        — TransactionError
//! output.rs       — TransactionOutput (address + amount)
//! input.rs        — TransactionInput (outpoint, resolution, signature)
//! transaction.rs  — Transaction: wire bytes, hash, fees
//! signing.rs      — Transaction::sign over the shared preimage
//! verification.rs — Signature, output, double-spend and fee checks
//! coinbase.rs     — Block reward transactions
//! codec.rs        — Hex/bytes parsing into ParsedTransaction
//! resolve.rs      — InputResolver seam and in-memory OutputStore
//! builder.rs      — UTXO-selecting TransactionBuilder and SendOutcome
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build**: [`TransactionBuilder`] picks spendable outputs from the node
//!    and assembles a [`Transaction`].
//! 2. **Sign**: [`Transaction::sign`] signs the preimage once per distinct key.
//! 3. **Broadcast**: the full hex goes to the node's `push_tx`.
//! 4. **Parse**: [`decode_transaction`] reads hex back, coinbase or transfer.
//! 5. **Resolve + Verify**: [`Transaction::resolve`] looks up spent outputs,
//!    [`Transaction::verify`] checks signatures, outputs and fees.
//!
//! ## Design Decisions
//!
//! - The transaction hash is `sha256` of the full wire form, signatures
//!   included, and is memoized until the transaction is mutated.
//! - All amounts are `u64` in the smallest unit (10^-6 coin). No floating
//!   point anywhere near monetary values.
//! - Inputs signed by the same key share one signature, serialized once.

pub mod builder;
pub mod codec;
pub mod coinbase;
pub mod error;
pub mod input;
pub mod output;
pub mod resolve;
pub mod signing;
#[allow(clippy::module_inception)]
pub mod transaction;
pub mod types;
pub mod verification;

pub use builder::{SendOutcome, TransactionBuilder};
pub use codec::{decode_bytes, decode_transaction, ByteReader, ParsedTransaction};
pub use coinbase::CoinbaseTransaction;
pub use error::TransactionError;
pub use input::{Resolution, ResolvedOutput, TransactionInput};
pub use output::TransactionOutput;
pub use resolve::{InputResolver, OutputStore};
pub use transaction::Transaction;
pub use types::{Amount, AmountError, Endian, TxHash, TxVersion};
