// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Ecliptic Wallet CLI
//!
//! Entry point for the `ecliptic` binary. Parses CLI arguments, initializes
//! logging, and dispatches to the protocol library.
//!
//! - `send`    — select outputs, sign and broadcast a payment
//! - `decode`  — print a JSON summary of a transaction hex
//! - `verify`  — resolve inputs against the node and verify
//! - `address` — derive an address from a private key
//! - `keygen`  — generate a private key
//! - `version` — print build version information

mod cli;
mod logging;

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::{json, Value};

use ecliptic_protocol::crypto::{AddressFormat, Curve, PrivateKey};
use ecliptic_protocol::network::{NodeClient, NodeClientConfig};
use ecliptic_protocol::transaction::{
    decode_transaction, CoinbaseTransaction, ParsedTransaction, SendOutcome, Transaction,
    TransactionBuilder,
};

use cli::{Commands, EclipticCli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = EclipticCli::parse();
    logging::init_logging(logging::DEFAULT_DIRECTIVES, cli.log_format);

    match cli.command {
        Commands::Send(args) => send(args).await,
        Commands::Decode(args) => decode(args),
        Commands::Verify(args) => verify(args).await,
        Commands::Address(args) => address(args),
        Commands::Keygen(args) => keygen(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

fn node_client(args: &cli::NodeArgs) -> Result<NodeClient> {
    let config = NodeClientConfig::default()
        .with_base_url(&args.node_url)
        .with_request_timeout(Duration::from_secs(args.timeout_secs));
    NodeClient::new(config).context("failed to build HTTP client")
}

fn parse_keys(keys: &[String], curve: Curve) -> Result<Vec<PrivateKey>> {
    keys.iter()
        .enumerate()
        .map(|(i, hex)| {
            PrivateKey::from_hex(curve, hex.trim())
                .with_context(|| format!("private key #{} is not a valid {curve} key", i + 1))
        })
        .collect()
}

/// Builds, signs and (unless `--dry-run`) broadcasts a payment.
async fn send(args: cli::SendArgs) -> Result<()> {
    let keys = parse_keys(&args.private_keys, args.curve)?;
    let format = AddressFormat::from(args.address_format);
    let sender = match args.sender {
        Some(sender) => sender,
        None => keys
            .first()
            .context("no private keys given")?
            .address(format)
            .context("failed to derive sender address")?,
    };
    let node = node_client(&args.node)?;

    let mut builder = TransactionBuilder::new(keys, sender, args.recipient, args.amount)
        .address_format(format)
        .curve(args.curve)
        .query_timeout(Duration::from_secs(args.node.timeout_secs));
    if let Some(message) = args.message {
        builder = builder.message(message);
    }
    if let Some(change) = args.change_address {
        builder = builder.change_address(change);
    }

    if args.dry_run {
        return match builder.prepare(&node).await? {
            Ok(tx) => {
                println!("{}", tx.hex(true));
                Ok(())
            }
            Err(outcome) => bail!("{outcome}"),
        };
    }

    match builder.send(&node).await? {
        SendOutcome::Broadcast(tx) => {
            println!("{}", tx.hash());
            Ok(())
        }
        outcome => bail!("{outcome}"),
    }
}

fn decode(args: cli::DecodeArgs) -> Result<()> {
    let parsed =
        decode_transaction(args.hex.trim(), args.curve).context("failed to decode transaction")?;
    let summary = match &parsed {
        ParsedTransaction::Transfer(tx) => transfer_json(tx),
        ParsedTransaction::Coinbase(cb) => coinbase_json(cb),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn verify(args: cli::VerifyArgs) -> Result<()> {
    let parsed =
        decode_transaction(args.hex.trim(), args.curve).context("failed to decode transaction")?;
    let (hash, valid) = match parsed {
        ParsedTransaction::Coinbase(cb) => (cb.hash(), cb.verify()),
        ParsedTransaction::Transfer(mut tx) => {
            let node = node_client(&args.node)?;
            let valid = tx
                .verify_with(&node, !args.skip_double_spend_check)
                .await
                .context("failed to resolve transaction inputs")?;
            (tx.hash(), valid)
        }
    };

    if !valid {
        bail!("transaction {hash} is invalid");
    }
    println!("transaction {hash} is valid");
    Ok(())
}

fn address(args: cli::AddressArgs) -> Result<()> {
    let key =
        PrivateKey::from_hex(args.curve, args.private_key.trim()).context("invalid private key")?;
    println!("{}", key.address(args.format.into())?);
    Ok(())
}

fn keygen(args: cli::KeygenArgs) -> Result<()> {
    let key = PrivateKey::generate(args.curve);
    let summary = json!({
        "curve": args.curve.to_string(),
        "private_key": key.to_hex(),
        "address": key.address(AddressFormat::Compressed)?,
        "full_address": key.address(AddressFormat::Full)?,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn message_json(message: &[u8]) -> Value {
    match std::str::from_utf8(message) {
        Ok(text) => json!(text),
        Err(_) => json!({ "hex": hex::encode(message) }),
    }
}

fn transfer_json(tx: &Transaction) -> Value {
    json!({
        "type": "transfer",
        "version": tx.version().as_byte(),
        "hash": tx.hash(),
        "inputs": tx.inputs().iter().map(|i| json!({
            "tx_hash": i.tx_hash().to_hex(),
            "index": i.index(),
        })).collect::<Vec<_>>(),
        "outputs": tx.outputs().iter().map(|o| json!({
            "address": o.address(),
            "amount": o.amount().to_string(),
        })).collect::<Vec<_>>(),
        "message": tx.message().map(message_json),
        "signatures": tx.signatures().len(),
    })
}

fn coinbase_json(cb: &CoinbaseTransaction) -> Value {
    json!({
        "type": "coinbase",
        "version": cb.version().as_byte(),
        "hash": cb.hash(),
        "block_hash": cb.block_hash().to_hex(),
        "address": cb.address(),
        "amount": cb.amount().to_string(),
    })
}

/// Prints version information to stdout.
fn print_version() {
    println!("ecliptic {}", env!("CARGO_PKG_VERSION"));
    println!("rustc    {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
