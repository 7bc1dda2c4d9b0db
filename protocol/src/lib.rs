// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Offstore Protocol: Core Library
//!
//! Substrate-style nodes keep a small key-value store next to the chain,
//! written by offchain workers and readable over JSON-RPC. Values come back
//! as hex strings, which are useless to a human until they are decoded.
//! This crate does the decoding and defines everything around it.
//!
//! ## Modules
//!
//! - **hex**: Hex string to bytes to text. Pure functions, no I/O.
//! - **storage**: Storage kinds, keys and values.
//! - **rpc**: JSON-RPC request/response types for the `offchain_*` methods.
//! - **reader**: The [`reader::OffchainStorage`] seam and the
//!   read-then-decode helpers built on it.
//! - **error**: Error taxonomy shared by the modules above.
//! - **config**: Defaults: endpoint, storage kind, key, output label.
//!
//! The crate is transport-agnostic. The WebSocket client lives in the
//! `offstore` binary, so everything here can be tested without a node.

pub mod config;
pub mod error;
pub mod hex;
pub mod reader;
pub mod rpc;
pub mod storage;

pub use crate::error::{DecodeError, ReadError, StorageError};
pub use crate::hex::{decode, decode_lossy, TextPolicy};
pub use crate::reader::{read_text, read_value, write_text, MemoryStorage, OffchainStorage};
pub use crate::storage::{StorageKey, StorageKind, StorageValue};
