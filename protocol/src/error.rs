//! Error types for offchain storage access.
//!
//! Decoding failures are [`DecodeError`], transport and node failures are
//! [`StorageError`], and the read path combines both into [`ReadError`].

use thiserror::Error;

use crate::storage::{StorageKey, StorageKind};

/// Errors produced while turning a hex string into bytes or text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The input is not valid hex (odd length or a non-hex character),
    /// checked after any `0x` prefix is stripped.
    #[error("malformed hex input: {reason}")]
    MalformedHexInput {
        /// What exactly was wrong with the input.
        reason: String,
    },

    /// The bytes decoded fine but are not valid UTF-8.
    #[error("invalid text encoding: bytes are not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidTextEncoding {
        /// Length of the longest valid UTF-8 prefix.
        valid_up_to: usize,
    },
}

impl From<::hex::FromHexError> for DecodeError {
    fn from(e: ::hex::FromHexError) -> Self {
        let reason = match e {
            ::hex::FromHexError::OddLength => "odd number of hex digits".to_string(),
            ::hex::FromHexError::InvalidHexCharacter { c, index } => {
                format!("invalid hex character {:?} at position {}", c, index)
            }
            ::hex::FromHexError::InvalidStringLength => "invalid string length".to_string(),
        };
        DecodeError::MalformedHexInput { reason }
    }
}

/// Errors surfaced by an [`OffchainStorage`](crate::reader::OffchainStorage)
/// implementation.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The connection to the node failed or was lost.
    #[error("transport error: {0}")]
    Transport(String),

    /// The node answered with a JSON-RPC error object.
    #[error("node returned RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i32,
        /// Error message from the node.
        message: String,
    },

    /// The node answered, but not with `null` or a string.
    #[error("malformed response from node: {0}")]
    Malformed(String),
}

/// Errors from the read-then-decode path.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The node has no value stored under the key.
    #[error("no value stored at {kind}/{key}")]
    NotFound {
        /// Storage partition that was queried.
        kind: StorageKind,
        /// Key that was queried.
        key: StorageKey,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl ReadError {
    /// Whether this error means the key simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ReadError::NotFound { .. })
    }
}
