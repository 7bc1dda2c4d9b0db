//! # CLI Interface
//!
//! Defines the command-line argument structure for `offstore` using
//! `clap` derive. Supports four subcommands: `get`, `set`, `decode`,
//! and `version`.

use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use offstore_protocol::config::{DEFAULT_KEY, DEFAULT_RPC_URL};
use offstore_protocol::StorageKind;

use crate::connection::ConnectionSettings;
use crate::output::OutputFormat;

/// Offchain storage reader.
///
/// Connects to a node's WebSocket RPC endpoint, reads a key from its
/// offchain key-value storage and prints the value as text.
#[derive(Parser, Debug)]
#[command(
    name = "offstore",
    about = "Read and decode a node's offchain storage",
    version,
    propagate_version = true
)]
pub struct OffstoreCli {
    /// Default log filter. `RUST_LOG` takes precedence when set.
    #[arg(long, global = true, env = "OFFSTORE_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format: `pretty` or `json`. Logs always go to stderr.
    #[arg(long, global = true, default_value = "pretty")]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read a key from offchain storage and print its value.
    Get(GetArgs),
    /// Write a value to offchain storage. Needs a node with unsafe RPCs enabled.
    Set(SetArgs),
    /// Decode a hex string locally, without contacting a node.
    Decode(DecodeArgs),
    /// Print version information and exit.
    Version,
}

/// Where the node is and which partition to use.
#[derive(Args, Debug, Clone)]
pub struct NodeArgs {
    /// WebSocket RPC endpoint of the node.
    #[arg(long, env = "OFFSTORE_RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub url: String,

    /// Offchain storage partition: `persistent` or `local`.
    #[arg(long, env = "OFFSTORE_STORAGE_KIND", default_value = "persistent")]
    pub kind: StorageKind,

    /// Seconds to wait for a single RPC response.
    #[arg(long, env = "OFFSTORE_REQUEST_TIMEOUT", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Seconds to wait for the WebSocket connection to open.
    #[arg(long, env = "OFFSTORE_CONNECTION_TIMEOUT", default_value_t = 10)]
    pub connection_timeout_secs: u64,
}

impl NodeArgs {
    pub fn settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            url: self.url.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            connection_timeout: Duration::from_secs(self.connection_timeout_secs),
        }
    }
}

/// Arguments for the `get` subcommand.
#[derive(Args, Debug)]
pub struct GetArgs {
    #[command(flatten)]
    pub node: NodeArgs,

    /// Key to read. A `0x`-prefixed value is taken as raw hex bytes,
    /// anything else as a UTF-8 name.
    #[arg(default_value = DEFAULT_KEY)]
    pub key: String,

    /// How to print the value.
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Replace invalid UTF-8 with U+FFFD instead of failing.
    #[arg(long)]
    pub lossy: bool,
}

/// Arguments for the `set` subcommand.
#[derive(Args, Debug)]
pub struct SetArgs {
    #[command(flatten)]
    pub node: NodeArgs,

    /// Key to write. Same syntax as for `get`.
    pub key: String,

    /// Value to store.
    pub value: String,

    /// Treat VALUE as hex bytes rather than text.
    #[arg(long)]
    pub hex: bool,
}

/// Arguments for the `decode` subcommand.
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Hex string to decode, with or without `0x`.
    pub hex: String,

    /// Replace invalid UTF-8 with U+FFFD instead of failing.
    #[arg(long)]
    pub lossy: bool,
}
