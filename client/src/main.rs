// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Offstore
//!
//! Entry point for the `offstore` binary. Parses CLI arguments, initializes
//! logging, opens one connection to the node and runs one command against
//! its offchain storage.
//!
//! The binary supports four subcommands:
//!
//! - `get`:     read a key and print its decoded value
//! - `set`:     write a value (node must allow unsafe RPCs)
//! - `decode`:  decode a hex string offline
//! - `version`: print build version information
//!
//! ## Exit codes
//!
//! | Code | Meaning                                      |
//! |------|----------------------------------------------|
//! | 0    | Success                                      |
//! | 1    | Connection, RPC or decoding failure          |
//! | 2    | Bad command-line arguments (from clap)       |
//! | 3    | The key has no value in offchain storage     |

mod cli;
mod connection;
mod logging;
#[cfg(test)]
mod mock_node;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;

use offstore_protocol::hex::{decode_with, hex_to_bytes};
use offstore_protocol::{
    read_value, OffchainStorage, ReadError, StorageKey, StorageKind, TextPolicy,
};

use cli::{Commands, OffstoreCli};
use connection::NodeConnection;
use logging::LogFormat;
use output::OutputFormat;

/// Exit status for any failure without a more specific code.
const EXIT_FAILURE: u8 = 1;

/// Exit status for a key with no stored value.
const EXIT_NOT_FOUND: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = OffstoreCli::parse();
    let log_format = LogFormat::from_str_lossy(&cli.log_format);
    if let Err(e) = logging::init_logging(&cli.log_level, log_format) {
        eprintln!("error: failed to initialize logging: {}", e);
        return ExitCode::from(EXIT_FAILURE);
    }

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("error: {:#}", e);
            ExitCode::from(exit_status(&e))
        }
    }
}

/// Dispatches a parsed subcommand.
async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Get(args) => get_value(args).await,
        Commands::Set(args) => set_value(args).await,
        Commands::Decode(args) => decode_offline(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Maps a failure to the process exit status.
fn exit_status(error: &anyhow::Error) -> u8 {
    match error.downcast_ref::<ReadError>() {
        Some(e) if e.is_not_found() => EXIT_NOT_FOUND,
        _ => EXIT_FAILURE,
    }
}

fn text_policy(lossy: bool) -> TextPolicy {
    if lossy {
        TextPolicy::Lossy
    } else {
        TextPolicy::Strict
    }
}

fn parse_key(input: &str) -> Result<StorageKey> {
    StorageKey::parse(input).with_context(|| format!("invalid storage key {:?}", input))
}

/// `offstore get`: connect, read, decode, print.
async fn get_value(args: cli::GetArgs) -> Result<()> {
    let key = parse_key(&args.key)?;
    let settings = args.node.settings();

    let conn = NodeConnection::connect(&settings)
        .await
        .context("could not open node connection")?;
    tracing::debug!(url = conn.url(), connected = conn.is_connected(), "reading value");

    let line = fetch_and_render(
        &conn,
        args.node.kind,
        &key,
        args.output,
        text_policy(args.lossy),
    )
    .await?;
    println!("{}", line);
    Ok(())
}

/// Reads `key` from `storage` and formats it for stdout.
async fn fetch_and_render<S>(
    storage: &S,
    kind: StorageKind,
    key: &StorageKey,
    format: OutputFormat,
    policy: TextPolicy,
) -> Result<String>
where
    S: OffchainStorage + ?Sized,
{
    let value = read_value(storage, kind, key)
        .await
        .with_context(|| format!("failed to read {}/{}", kind, key))?;
    output::render(kind, key, &value, format, policy)
        .with_context(|| format!("failed to decode value at {}/{}", kind, key))
}

/// VALUE as given on the command line: UTF-8 text, or hex with `--hex`.
fn parse_value(input: &str, is_hex: bool) -> Result<Vec<u8>> {
    if is_hex {
        hex_to_bytes(input).context("VALUE is not valid hex")
    } else {
        Ok(input.as_bytes().to_vec())
    }
}

/// `offstore set`: connect and write one value.
async fn set_value(args: cli::SetArgs) -> Result<()> {
    let key = parse_key(&args.key)?;
    let value = parse_value(&args.value, args.hex)?;

    let conn = NodeConnection::connect(&args.node.settings())
        .await
        .context("could not open node connection")?;
    tracing::debug!(url = conn.url(), connected = conn.is_connected(), "writing value");

    store(&conn, args.node.kind, &key, &value).await?;
    println!("stored {} bytes at {}/{}", value.len(), args.node.kind, key);
    Ok(())
}

async fn store<S>(storage: &S, kind: StorageKind, key: &StorageKey, value: &[u8]) -> Result<()>
where
    S: OffchainStorage + ?Sized,
{
    storage
        .set(kind, key, value)
        .await
        .with_context(|| format!("failed to write {}/{}", kind, key))
}

/// `offstore decode`: no node involved.
fn decode_offline(args: cli::DecodeArgs) -> Result<()> {
    let text = decode_with(&args.hex, text_policy(args.lossy)).context("failed to decode")?;
    println!("{}", output::render_text(&text));
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("offstore {}", env!("CARGO_PKG_VERSION"));
    println!("rustc    {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
