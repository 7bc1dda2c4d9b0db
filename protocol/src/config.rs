//! # Defaults & Constants
//!
//! Every default the `offstore` binary falls back to lives here, so the
//! CLI, the tests and the docs agree on one set of values.

use std::time::Duration;

use crate::storage::StorageKind;

// ---------------------------------------------------------------------------
// Node Endpoint
// ---------------------------------------------------------------------------

/// WebSocket RPC endpoint of a node started with default settings.
pub const DEFAULT_RPC_URL: &str = "ws://127.0.0.1:9944";

/// URL schemes the WebSocket client accepts.
pub const SUPPORTED_SCHEMES: [&str; 2] = ["ws://", "wss://"];

/// How long a single RPC call may take before it is abandoned.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How long establishing the WebSocket connection may take.
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Storage Lookup
// ---------------------------------------------------------------------------

/// Partition queried when none is given.
pub const DEFAULT_STORAGE_KIND: StorageKind = StorageKind::Persistent;

/// Key queried when none is given. Offchain workers in the node template
/// write their demo value under this name.
pub const DEFAULT_KEY: &str = "testkey";

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Label printed in front of a decoded value.
pub const OUTPUT_LABEL: &str = "value in offchain storage: ";

/// Returns true if `url` uses a scheme the WebSocket client can dial.
pub fn is_supported_url(url: &str) -> bool {
    SUPPORTED_SCHEMES.iter().any(|scheme| url.starts_with(scheme))
}
