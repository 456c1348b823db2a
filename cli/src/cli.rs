//! # CLI Interface
//!
//! Defines the command-line argument structure for `ecliptic` using `clap`
//! derive. Subcommands: `send`, `decode`, `verify`, `address`, `keygen`
//! and `version`.

use clap::{Args, Parser, Subcommand, ValueEnum};

use ecliptic_protocol::config::DEFAULT_NODE_URL;
use ecliptic_protocol::crypto::{AddressFormat, Curve};
use ecliptic_protocol::transaction::Amount;

use crate::logging::LogFormat;

/// Ecliptic wallet.
///
/// Builds, signs and broadcasts UTXO transactions on secp256k1 or P-256,
/// and decodes or verifies transactions given as hex.
#[derive(Parser, Debug)]
#[command(
    name = "ecliptic",
    about = "Ecliptic UTXO wallet",
    version,
    propagate_version = true
)]
pub struct EclipticCli {
    /// Diagnostics format on stderr.
    #[arg(
        long,
        global = true,
        value_enum,
        ignore_case = true,
        env = "ECLIPTIC_LOG_FORMAT",
        default_value_t = LogFormat::Pretty
    )]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pay an amount to a recipient, selecting outputs owned by the given keys.
    Send(SendArgs),
    /// Print a JSON summary of a hex-encoded transaction.
    Decode(DecodeArgs),
    /// Resolve a transaction's inputs against the node and verify it.
    Verify(VerifyArgs),
    /// Derive the address of a private key.
    Address(AddressArgs),
    /// Generate a fresh private key.
    Keygen(KeygenArgs),
    /// Print version information and exit.
    Version,
}

/// Address encoding on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Full,
    Compressed,
}

impl From<FormatArg> for AddressFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Full => AddressFormat::Full,
            FormatArg::Compressed => AddressFormat::Compressed,
        }
    }
}

/// Where the node lives.
#[derive(Args, Debug, Clone)]
pub struct NodeArgs {
    /// Base URL of the node API.
    #[arg(long, env = "ECLIPTIC_NODE_URL", default_value = DEFAULT_NODE_URL)]
    pub node_url: String,

    /// Per-request timeout in seconds.
    #[arg(long, env = "ECLIPTIC_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,
}

/// Arguments for the `send` subcommand.
#[derive(Args, Debug)]
pub struct SendArgs {
    /// Recipient address, full (hex) or compressed (Base58).
    pub recipient: String,

    /// Amount in coins, up to 6 decimals.
    pub amount: Amount,

    /// Comma-separated hex private keys whose outputs may be spent.
    ///
    /// **Prefer the environment variable** over the flag so keys stay out
    /// of shell history.
    #[arg(long, env = "ECLIPTIC_PRIVATE_KEYS", value_delimiter = ',', required = true)]
    pub private_keys: Vec<String>,

    #[arg(long, env = "ECLIPTIC_CURVE", default_value = "secp256k1")]
    pub curve: Curve,

    /// Sender address for change. Defaults to the first key's address.
    #[arg(long)]
    pub sender: Option<String>,

    /// Send change here instead of to the sender.
    #[arg(long)]
    pub change_address: Option<String>,

    /// Memo attached to the transaction.
    #[arg(long, short = 'm')]
    pub message: Option<String>,

    /// Address format used to look up each key's outputs.
    #[arg(long, value_enum, default_value_t = FormatArg::Compressed)]
    pub address_format: FormatArg,

    /// Build and sign, print the hex, but do not broadcast.
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub node: NodeArgs,
}

/// Arguments for the `decode` subcommand.
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Transaction hex.
    pub hex: String,

    #[arg(long, env = "ECLIPTIC_CURVE", default_value = "secp256k1")]
    pub curve: Curve,
}

/// Arguments for the `verify` subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Transaction hex.
    pub hex: String,

    #[arg(long, env = "ECLIPTIC_CURVE", default_value = "secp256k1")]
    pub curve: Curve,

    /// Skip the check that no output is spent twice within the transaction.
    #[arg(long)]
    pub skip_double_spend_check: bool,

    #[command(flatten)]
    pub node: NodeArgs,
}

/// Arguments for the `address` subcommand.
#[derive(Args, Debug)]
pub struct AddressArgs {
    /// Hex private key.
    #[arg(long, env = "ECLIPTIC_PRIVATE_KEY")]
    pub private_key: String,

    #[arg(long, env = "ECLIPTIC_CURVE", default_value = "secp256k1")]
    pub curve: Curve,

    #[arg(long, value_enum, default_value_t = FormatArg::Compressed)]
    pub format: FormatArg,
}

/// Arguments for the `keygen` subcommand.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    #[arg(long, env = "ECLIPTIC_CURVE", default_value = "secp256k1")]
    pub curve: Curve,
}
