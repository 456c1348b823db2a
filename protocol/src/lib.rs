// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Ecliptic Protocol — Core Library
//!
//! The transaction engine behind the Ecliptic wallet: a UTXO payment system
//! where value moves by spending old outputs and creating new ones, every
//! spend authorized by an ECDSA signature.
//!
//! Ecliptic speaks two curves, secp256k1 and NIST P-256, and two address
//! formats per curve: a full hex encoding of the public point and a
//! compressed Base58 one. Transactions are compact byte strings that the
//! node validates byte for byte, so this crate cares a lot about layout.
//!
//! ## Architecture
//!
//! - **config** — Wire constants: lengths, specifiers, limits, defaults.
//! - **crypto** — Curves, keys, signatures and the address codec.
//! - **transaction** — Building, signing, parsing and verifying transactions.
//! - **network** — The HTTP client for the node that holds the UTXO set.
//!
//! ## Design Philosophy
//!
//! 1. The wire format is the contract. Serialization is deterministic and
//!    parsing rejects anything it could not have produced.
//! 2. No floats near money. Amounts are integers in the smallest unit.
//! 3. Running out of funds is an outcome, not an error.
//! 4. If it touches money, it has tests. Plural.

pub mod config;
pub mod crypto;
pub mod network;
pub mod transaction;
