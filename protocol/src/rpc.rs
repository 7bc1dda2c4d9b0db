//! # JSON-RPC Wire Types
//!
//! Type-safe definitions for the slice of a Substrate node's JSON-RPC API
//! that touches offchain storage. Only types live here; the WebSocket
//! client lives in the `offstore` binary and talks through `jsonrpsee`.
//!
//! ## Method Index
//!
//! | Method                      | Params                 | Result           |
//! |-----------------------------|------------------------|------------------|
//! | `offchain_localStorageGet`  | `(kind, key)`          | `"0x…"` or null  |
//! | `offchain_localStorageSet`  | `(kind, key, value)`   | null             |
//!
//! `kind` is `"PERSISTENT"` or `"LOCAL"`; `key` and `value` are
//! `0x`-prefixed hex. Both methods are marked unsafe on real nodes, so
//! the node has to be started with `--rpc-methods=unsafe` to serve them
//! to anything but localhost.

use serde::{Deserialize, Serialize};

use crate::storage::{StorageKey, StorageKind};

// ---------------------------------------------------------------------------
// RPC Method Enumeration
// ---------------------------------------------------------------------------

/// Supported JSON-RPC methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RpcMethod {
    /// Read a value from offchain storage.
    /// Parameters: `(kind: StorageKind, key: Bytes)`
    #[serde(rename = "offchain_localStorageGet")]
    LocalStorageGet,
    /// Write a value to offchain storage.
    /// Parameters: `(kind: StorageKind, key: Bytes, value: Bytes)`
    #[serde(rename = "offchain_localStorageSet")]
    LocalStorageSet,
}

impl RpcMethod {
    /// Method name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            RpcMethod::LocalStorageGet => "offchain_localStorageGet",
            RpcMethod::LocalStorageSet => "offchain_localStorageSet",
        }
    }
}

// ---------------------------------------------------------------------------
// RPC Request / Response
// ---------------------------------------------------------------------------

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    /// JSON-RPC version. Always "2.0".
    pub jsonrpc: String,
    /// Request identifier. Echoed back in the response.
    pub id: serde_json::Value,
    /// The method to invoke.
    pub method: RpcMethod,
    /// Positional parameters.
    #[serde(default)]
    pub params: serde_json::Value,
}

impl RpcRequest {
    pub fn new(id: serde_json::Value, method: RpcMethod, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method,
            params,
        }
    }

    /// `offchain_localStorageGet(kind, key)`.
    pub fn local_storage_get(id: serde_json::Value, kind: StorageKind, key: &StorageKey) -> Self {
        Self::new(
            id,
            RpcMethod::LocalStorageGet,
            serde_json::json!([kind, key.to_wire()]),
        )
    }

    /// `offchain_localStorageSet(kind, key, value)`.
    pub fn local_storage_set(
        id: serde_json::Value,
        kind: StorageKind,
        key: &StorageKey,
        value: &[u8],
    ) -> Self {
        Self::new(
            id,
            RpcMethod::LocalStorageSet,
            serde_json::json!([kind, key.to_wire(), crate::hex::bytes_to_prefixed_hex(value)]),
        )
    }

    /// Splits positional params into `(kind, key, rest)`.
    ///
    /// Used by node-side handlers to pull the storage coordinates out of a
    /// request. Returns an `invalid_params` error when the shape is wrong.
    pub fn storage_params(&self) -> Result<(StorageKind, StorageKey, Vec<String>), RpcError> {
        let params = self
            .params
            .as_array()
            .ok_or_else(|| RpcError::invalid_params("expected positional params"))?;

        let kind: StorageKind = params
            .first()
            .cloned()
            .ok_or_else(|| RpcError::invalid_params("missing storage kind"))
            .and_then(|v| {
                serde_json::from_value(v).map_err(|e| RpcError::invalid_params(e.to_string()))
            })?;

        let key = params
            .get(1)
            .and_then(|v| v.as_str())
            .ok_or_else(|| RpcError::invalid_params("missing key"))
            .and_then(|s| {
                StorageKey::from_hex(s).map_err(|e| RpcError::invalid_params(e.to_string()))
            })?;

        let rest = params
            .iter()
            .skip(2)
            .map(|v| {
                v.as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| RpcError::invalid_params("expected hex string param"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok((kind, key, rest))
    }
}

/// A JSON-RPC 2.0 response.
///
/// Exactly one of `result` or `error` is meaningful. A successful
/// `offchain_localStorageGet` for a missing key carries `"result": null`;
/// build it with `success(id, Value::Null)` so the field is still emitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    /// JSON-RPC version. Always "2.0".
    pub jsonrpc: String,
    /// The request ID this response corresponds to.
    pub id: serde_json::Value,
    /// The successful result, if the method completed without error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// The error, if the method failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn success(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: serde_json::Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

// ---------------------------------------------------------------------------
// RPC Errors
// ---------------------------------------------------------------------------

/// JSON-RPC 2.0 error object.
///
/// Error codes follow the JSON-RPC 2.0 specification:
/// - `-32700`: Parse error
/// - `-32600`: Invalid request
/// - `-32601`: Method not found (also used by nodes to refuse unsafe calls)
/// - `-32602`: Invalid params
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    /// Numeric error code.
    pub code: i32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional error data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    fn with_code(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::with_code(-32700, msg)
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::with_code(-32600, msg)
    }

    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::with_code(-32601, format!("method not found: {}", method.into()))
    }

    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::with_code(-32602, msg)
    }

    /// What a node answers when an unsafe method is called without
    /// `--rpc-methods=unsafe`.
    pub fn unsafe_denied() -> Self {
        Self::with_code(-32601, "RPC call is unsafe to be called externally")
    }
}
