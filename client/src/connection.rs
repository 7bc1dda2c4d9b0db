//! # Node Connection
//!
//! A WebSocket JSON-RPC connection to a node, built on `jsonrpsee`'s
//! `WsClient`. [`NodeConnection`] is created once in `main` and handed by
//! reference to whatever needs to talk to the node; it implements
//! [`OffchainStorage`] so the protocol crate's read helpers work on it
//! directly.
//!
//! No retries and no reconnects: a run makes one call, and any failure is
//! reported to the caller.

use std::time::Duration;

use async_trait::async_trait;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::ClientError;
use jsonrpsee::rpc_params;
use jsonrpsee::ws_client::{WsClient, WsClientBuilder};

use offstore_protocol::config::{
    is_supported_url, DEFAULT_CONNECTION_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, DEFAULT_RPC_URL,
};
use offstore_protocol::hex::bytes_to_prefixed_hex;
use offstore_protocol::rpc::RpcMethod;
use offstore_protocol::{OffchainStorage, StorageError, StorageKey, StorageKind};

/// Where to connect and how long to wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// `ws://` or `wss://` endpoint.
    pub url: String,
    /// Upper bound on a single RPC round trip.
    pub request_timeout: Duration,
    /// Upper bound on opening the WebSocket.
    pub connection_timeout: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_RPC_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
        }
    }
}

/// An open connection to a node's RPC endpoint.
pub struct NodeConnection {
    client: WsClient,
    url: String,
}

impl std::fmt::Debug for NodeConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeConnection")
            .field("url", &self.url())
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl NodeConnection {
    /// Opens the WebSocket and waits for the handshake to finish.
    ///
    /// # Errors
    ///
    /// [`StorageError::Transport`] if the URL is not a WebSocket URL or the
    /// node cannot be reached within `connection_timeout`.
    pub async fn connect(settings: &ConnectionSettings) -> Result<Self, StorageError> {
        if !is_supported_url(&settings.url) {
            return Err(StorageError::Transport(format!(
                "unsupported endpoint {:?}: expected a ws:// or wss:// URL",
                settings.url
            )));
        }

        tracing::debug!(url = %settings.url, "connecting to node");
        let client = WsClientBuilder::default()
            .request_timeout(settings.request_timeout)
            .connection_timeout(settings.connection_timeout)
            .build(&settings.url)
            .await
            .map_err(|e| {
                StorageError::Transport(format!("failed to connect to {}: {}", settings.url, e))
            })?;

        tracing::info!(url = %settings.url, "connected to node");
        Ok(Self {
            client,
            url: settings.url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_connected()
    }
}

/// Maps a jsonrpsee client error onto the storage error taxonomy.
fn map_client_error(e: ClientError) -> StorageError {
    match e {
        ClientError::Call(obj) => StorageError::Rpc {
            code: obj.code(),
            message: obj.message().to_string(),
        },
        ClientError::ParseError(e) => StorageError::Malformed(e.to_string()),
        other => StorageError::Transport(other.to_string()),
    }
}

#[async_trait]
impl OffchainStorage for NodeConnection {
    async fn get(
        &self,
        kind: StorageKind,
        key: &StorageKey,
    ) -> Result<Option<String>, StorageError> {
        let method = RpcMethod::LocalStorageGet.as_str();
        tracing::trace!(method, %kind, key = %key.to_wire(), "rpc call");

        self.client
            .request::<Option<String>, _>(method, rpc_params![kind, key.to_wire()])
            .await
            .map_err(map_client_error)
    }

    async fn set(
        &self,
        kind: StorageKind,
        key: &StorageKey,
        value: &[u8],
    ) -> Result<(), StorageError> {
        let method = RpcMethod::LocalStorageSet.as_str();
        tracing::trace!(method, %kind, key = %key.to_wire(), bytes = value.len(), "rpc call");

        self.client
            .request::<(), _>(
                method,
                rpc_params![kind, key.to_wire(), bytes_to_prefixed_hex(value)],
            )
            .await
            .map_err(map_client_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_node::MockNode;
    use offstore_protocol::{read_text, write_text, ReadError, TextPolicy};

    fn settings_for(url: String) -> ConnectionSettings {
        ConnectionSettings {
            url,
            request_timeout: Duration::from_secs(5),
            connection_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn rejects_http_endpoints() {
        let err = NodeConnection::connect(&settings_for("http://127.0.0.1:9933".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Transport(_)));
        assert!(err.to_string().contains("ws://"));
    }

    #[tokio::test]
    async fn unreachable_node_is_a_transport_error() {
        // Bind then drop to get a port nothing is listening on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = NodeConnection::connect(&settings_for(format!("ws://{}", addr)))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Transport(_)));
    }

    #[tokio::test]
    async fn reads_seeded_value() {
        let node = MockNode::start().await;
        node.storage()
            .insert(StorageKind::Persistent, &StorageKey::from_name("testkey"), "hello");

        let conn = NodeConnection::connect(&settings_for(node.url())).await.unwrap();
        assert!(conn.is_connected());
        assert_eq!(conn.url(), node.url());

        let text = read_text(
            &conn,
            StorageKind::Persistent,
            &StorageKey::from_name("testkey"),
            TextPolicy::Strict,
        )
        .await
        .unwrap();
        assert_eq!(text, "hello");
    }

    #[tokio::test]
    async fn missing_key_comes_back_as_null() {
        let node = MockNode::start().await;
        let conn = NodeConnection::connect(&settings_for(node.url())).await.unwrap();

        let raw = conn
            .get(StorageKind::Local, &StorageKey::from_name("nope"))
            .await
            .unwrap();
        assert!(raw.is_none());

        let err = read_text(
            &conn,
            StorageKind::Local,
            &StorageKey::from_name("nope"),
            TextPolicy::Strict,
        )
        .await
        .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn set_then_get_over_the_wire() {
        let node = MockNode::start().await;
        let conn = NodeConnection::connect(&settings_for(node.url())).await.unwrap();
        let key = StorageKey::parse("0x00ff").unwrap();

        write_text(&conn, StorageKind::Local, &key, "héllo").await.unwrap();
        assert_eq!(
            node.storage().lookup(StorageKind::Local, &key).as_deref(),
            Some("0x68c3a96c6c6f")
        );

        let text = read_text(&conn, StorageKind::Local, &key, TextPolicy::Strict)
            .await
            .unwrap();
        assert_eq!(text, "héllo");
    }

    #[tokio::test]
    async fn unsafe_denied_maps_to_rpc_error() {
        let node = MockNode::start_safe_only().await;
        let conn = NodeConnection::connect(&settings_for(node.url())).await.unwrap();

        let err = conn
            .set(StorageKind::Persistent, &StorageKey::from_name("k"), b"v")
            .await
            .unwrap_err();
        match err {
            StorageError::Rpc { code, message } => {
                assert_eq!(code, -32601);
                assert!(message.contains("unsafe"));
            }
            other => panic!("expected RPC error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_node_answer_is_a_decode_error() {
        let node = MockNode::start_with_fixed_result(serde_json::json!("0xabc")).await;
        let conn = NodeConnection::connect(&settings_for(node.url())).await.unwrap();

        let err = read_text(
            &conn,
            StorageKind::Persistent,
            &StorageKey::from_name("testkey"),
            TextPolicy::Strict,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ReadError::Decode(_)));
    }

    #[tokio::test]
    async fn non_string_answer_is_malformed() {
        let node = MockNode::start_with_fixed_result(serde_json::json!(42)).await;
        let conn = NodeConnection::connect(&settings_for(node.url())).await.unwrap();

        let err = conn
            .get(StorageKind::Persistent, &StorageKey::from_name("testkey"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Malformed(_)));
        assert!(err.to_string().starts_with("malformed response from node"));
    }
}
