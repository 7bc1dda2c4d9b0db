//! # Offchain Storage Types
//!
//! A node's offchain storage is a plain key-value store that lives next to
//! the chain but outside consensus. It is split into two partitions:
//!
//! | Kind         | Wire name      | Lifetime                                  |
//! |--------------|----------------|-------------------------------------------|
//! | `Persistent` | `"PERSISTENT"` | Survives restarts, shared by all workers  |
//! | `Local`      | `"LOCAL"`      | Node-local, may be pruned on forks        |
//!
//! Keys and values are opaque byte strings. On the wire both travel as
//! `0x`-prefixed hex.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DecodeError;
use crate::hex::{bytes_to_prefixed_hex, bytes_to_text, hex_to_bytes, TextPolicy, HEX_PREFIX};

// ---------------------------------------------------------------------------
// StorageKind
// ---------------------------------------------------------------------------

/// Partition of the offchain store a key lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StorageKind {
    #[default]
    #[serde(rename = "PERSISTENT")]
    Persistent,
    #[serde(rename = "LOCAL")]
    Local,
}

impl StorageKind {
    /// The name the node expects in RPC parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::Persistent => "PERSISTENT",
            StorageKind::Local => "LOCAL",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageKind {
    type Err = String;

    /// Case-insensitive: `persistent`, `PERSISTENT` and `Persistent` all work.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "persistent" => Ok(StorageKind::Persistent),
            "local" => Ok(StorageKind::Local),
            other => Err(format!(
                "unknown storage kind {:?} (expected \"persistent\" or \"local\")",
                other
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// StorageKey
// ---------------------------------------------------------------------------

/// Raw key bytes for an offchain storage entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(Vec<u8>);

impl StorageKey {
    /// Key from a human-readable name; the UTF-8 bytes of `name` are the key.
    pub fn from_name(name: &str) -> Self {
        Self(name.as_bytes().to_vec())
    }

    /// Key from a hex literal, with or without `0x`.
    pub fn from_hex(hex: &str) -> Result<Self, DecodeError> {
        Ok(Self(hex_to_bytes(hex)?))
    }

    /// Key from user input: hex when it starts with `0x`, a name otherwise.
    pub fn parse(input: &str) -> Result<Self, DecodeError> {
        if input.starts_with(HEX_PREFIX) {
            Self::from_hex(input)
        } else {
            Ok(Self::from_name(input))
        }
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// `0x`-prefixed lowercase hex, as sent in RPC parameters.
    pub fn to_wire(&self) -> String {
        bytes_to_prefixed_hex(&self.0)
    }
}

impl fmt::Display for StorageKey {
    /// Shows the key as text when it is printable UTF-8, as hex otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(s) if !s.is_empty() && !s.chars().any(char::is_control) => f.write_str(s),
            _ => f.write_str(&self.to_wire()),
        }
    }
}

// ---------------------------------------------------------------------------
// StorageValue
// ---------------------------------------------------------------------------

/// Value bytes read from offchain storage.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StorageValue(Vec<u8>);

impl StorageValue {
    /// Decodes the hex string the node returned.
    pub fn from_hex(hex: &str) -> Result<Self, DecodeError> {
        Ok(Self(hex_to_bytes(hex)?))
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The value as text, under the given UTF-8 policy.
    pub fn to_text(&self, policy: TextPolicy) -> Result<String, DecodeError> {
        bytes_to_text(&self.0, policy)
    }

    /// `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        bytes_to_prefixed_hex(&self.0)
    }
}
