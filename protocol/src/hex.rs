//! # Storage Value Decoder
//!
//! The node hands back offchain storage values as hex strings, usually
//! `0x`-prefixed. This module turns those strings into bytes and the bytes
//! into text.
//!
//! ```text
//! "0x68656c6c6f" ──strip 0x──► "68656c6c6f" ──pairs──► [68 65 6c 6c 6f] ──UTF-8──► "hello"
//! ```
//!
//! Everything here is a pure function. No I/O, no allocation beyond the
//! output buffers.
//!
//! ## Text policy
//!
//! [`decode`] is strict: bytes that are not valid UTF-8 produce
//! [`DecodeError::InvalidTextEncoding`]. [`decode_lossy`] replaces each
//! invalid sequence with U+FFFD instead. Malformed hex is an error under
//! both policies.

use crate::error::DecodeError;

/// Prefix the node puts in front of every hex-encoded byte string.
pub const HEX_PREFIX: &str = "0x";

/// How bytes that are not valid UTF-8 are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextPolicy {
    /// Reject invalid UTF-8 with [`DecodeError::InvalidTextEncoding`].
    #[default]
    Strict,
    /// Substitute U+FFFD for each invalid sequence.
    Lossy,
}

/// Strips a single leading `0x`, if present.
///
/// Only the lowercase prefix is recognized; that is what the node emits.
pub fn strip_prefix(hex: &str) -> &str {
    hex.strip_prefix(HEX_PREFIX).unwrap_or(hex)
}

/// Strips the prefix and lower-cases the digits.
///
/// This is the canonical form that [`bytes_to_hex`] produces, so
/// `bytes_to_hex(&hex_to_bytes(h)?) == normalize(h)` for any valid `h`.
pub fn normalize(hex: &str) -> String {
    strip_prefix(hex).to_ascii_lowercase()
}

/// Decodes a hex string into bytes.
///
/// The input is read two characters at a time, left to right, most
/// significant nibble first. An empty string (or a bare `0x`) yields an
/// empty vector.
///
/// # Errors
///
/// [`DecodeError::MalformedHexInput`] when the prefix-stripped input has
/// odd length or contains anything other than `0-9a-fA-F`.
pub fn hex_to_bytes(hex: &str) -> Result<Vec<u8>, DecodeError> {
    Ok(::hex::decode(strip_prefix(hex))?)
}

/// Encodes bytes as lowercase hex without a prefix.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    ::hex::encode(bytes)
}

/// Encodes bytes as lowercase hex with the `0x` prefix used on the wire.
pub fn bytes_to_prefixed_hex(bytes: &[u8]) -> String {
    format!("{}{}", HEX_PREFIX, ::hex::encode(bytes))
}

/// Interprets bytes as UTF-8 text under the given policy.
pub fn bytes_to_text(bytes: &[u8], policy: TextPolicy) -> Result<String, DecodeError> {
    match policy {
        TextPolicy::Strict => match std::str::from_utf8(bytes) {
            Ok(s) => Ok(s.to_owned()),
            Err(e) => Err(DecodeError::InvalidTextEncoding {
                valid_up_to: e.valid_up_to(),
            }),
        },
        TextPolicy::Lossy => Ok(String::from_utf8_lossy(bytes).into_owned()),
    }
}

/// Decodes a hex-encoded storage value into text, strictly.
///
/// # Example
///
/// ```
/// use offstore_protocol::hex::decode;
///
/// assert_eq!(decode("0x68656c6c6f").unwrap(), "hello");
/// assert_eq!(decode("").unwrap(), "");
/// assert!(decode("abc").is_err());
/// ```
pub fn decode(hex: &str) -> Result<String, DecodeError> {
    decode_with(hex, TextPolicy::Strict)
}

/// Decodes a hex-encoded storage value into text, replacing invalid UTF-8.
pub fn decode_lossy(hex: &str) -> Result<String, DecodeError> {
    decode_with(hex, TextPolicy::Lossy)
}

/// Decodes a hex-encoded storage value into text under `policy`.
pub fn decode_with(hex: &str, policy: TextPolicy) -> Result<String, DecodeError> {
    let bytes = hex_to_bytes(hex)?;
    bytes_to_text(&bytes, policy)
}
