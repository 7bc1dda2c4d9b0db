//! Rendering of a fetched storage value for stdout.

use clap::ValueEnum;
use serde::Serialize;

use offstore_protocol::config::OUTPUT_LABEL;
use offstore_protocol::{StorageKey, StorageKind, StorageValue, TextPolicy};

/// How `offstore get` prints the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `value in offchain storage: <text>`
    Text,
    /// `value in offchain storage: 0x<hex>`
    Hex,
    /// One JSON object with kind, key, hex and text.
    Json,
}

/// JSON shape for `--output json`.
#[derive(Debug, Serialize)]
struct JsonOutput {
    kind: StorageKind,
    key: String,
    hex: String,
    /// `None` when the bytes are not valid UTF-8 and the policy is strict.
    text: Option<String>,
}

/// Formats `value` as a single line.
///
/// Only the text format can fail: strict decoding of non-UTF-8 bytes is an
/// error there. The JSON format reports the same case as `"text": null`.
pub fn render(
    kind: StorageKind,
    key: &StorageKey,
    value: &StorageValue,
    format: OutputFormat,
    policy: TextPolicy,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(format!("{}{}", OUTPUT_LABEL, value.to_text(policy)?)),
        OutputFormat::Hex => Ok(format!("{}{}", OUTPUT_LABEL, value.to_hex())),
        OutputFormat::Json => {
            let out = JsonOutput {
                kind,
                key: key.to_string(),
                hex: value.to_hex(),
                text: value.to_text(policy).ok(),
            };
            Ok(serde_json::to_string(&out)?)
        }
    }
}

/// Formats a decoded text for the `decode` subcommand.
pub fn render_text(text: &str) -> String {
    format!("{}{}", OUTPUT_LABEL, text)
}
