//! # In-process Mock Node
//!
//! A tiny axum server that speaks just enough JSON-RPC over WebSocket to
//! stand in for a real node: `offchain_localStorageGet` and
//! `offchain_localStorageSet`, backed by a [`MemoryStorage`]. Binds an
//! ephemeral port on localhost and shuts down when dropped.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use std::sync::Arc;

use offstore_protocol::hex::hex_to_bytes;
use offstore_protocol::rpc::{RpcError, RpcMethod, RpcRequest, RpcResponse};
use offstore_protocol::MemoryStorage;

/// How the mock node behaves.
#[derive(Debug, Default)]
struct NodeState {
    storage: MemoryStorage,
    /// Refuse `offchain_localStorageSet` like a node without `--rpc-methods=unsafe`.
    deny_unsafe: bool,
    /// Answer every `get` with this value instead of consulting storage.
    fixed_result: Option<serde_json::Value>,
}

pub struct MockNode {
    state: Arc<NodeState>,
    addr: std::net::SocketAddr,
    server: tokio::task::JoinHandle<()>,
}

impl MockNode {
    /// Starts a node that serves both methods.
    pub async fn start() -> Self {
        Self::spawn(NodeState::default()).await
    }

    /// Starts a node that rejects writes as unsafe.
    pub async fn start_safe_only() -> Self {
        Self::spawn(NodeState {
            deny_unsafe: true,
            ..NodeState::default()
        })
        .await
    }

    /// Starts a node whose `get` always returns `result`, verbatim.
    pub async fn start_with_fixed_result(result: serde_json::Value) -> Self {
        Self::spawn(NodeState {
            fixed_result: Some(result),
            ..NodeState::default()
        })
        .await
    }

    async fn spawn(state: NodeState) -> Self {
        let state = Arc::new(state);
        let router = Router::new()
            .route("/", get(ws_handler))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock node");
        let addr = listener.local_addr().expect("mock node address");
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::warn!("mock node stopped: {}", e);
            }
        });

        Self {
            state,
            addr,
            server,
        }
    }

    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    pub fn storage(&self) -> &MemoryStorage {
        &self.state.storage
    }
}

impl Drop for MockNode {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<NodeState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state))
}

/// Answers each text frame with one JSON-RPC response until the client
/// disconnects.
async fn handle_ws_connection(mut socket: WebSocket, state: Arc<NodeState>) {
    while let Some(Ok(msg)) = socket.recv().await {
        let Message::Text(text) = msg else {
            continue;
        };
        let response = handle_request(&state, &text);
        let payload = match serde_json::to_string(&response) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("failed to serialize rpc response: {}", e);
                continue;
            }
        };
        if socket.send(Message::Text(payload.into())).await.is_err() {
            break;
        }
    }
}

fn handle_request(state: &NodeState, text: &str) -> RpcResponse {
    let raw: serde_json::Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            return RpcResponse::error(
                serde_json::Value::Null,
                RpcError::parse_error(e.to_string()),
            )
        }
    };
    let id = raw.get("id").cloned().unwrap_or(serde_json::Value::Null);
    let Some(method) = raw.get("method").and_then(|m| m.as_str()) else {
        return RpcResponse::error(id, RpcError::invalid_request("not a JSON-RPC request"));
    };

    let req: RpcRequest = match serde_json::from_value(raw.clone()) {
        Ok(r) => r,
        Err(_) => return RpcResponse::error(id, RpcError::method_not_found(method)),
    };

    let (kind, key, rest) = match req.storage_params() {
        Ok(p) => p,
        Err(e) => return RpcResponse::error(id, e),
    };

    match req.method {
        RpcMethod::LocalStorageGet => {
            if let Some(fixed) = &state.fixed_result {
                return RpcResponse::success(id, fixed.clone());
            }
            let value = state.storage.lookup(kind, &key);
            RpcResponse::success(id, serde_json::json!(value))
        }
        RpcMethod::LocalStorageSet => {
            if state.deny_unsafe {
                return RpcResponse::error(id, RpcError::unsafe_denied());
            }
            let Some(value) = rest.first() else {
                return RpcResponse::error(id, RpcError::invalid_params("missing value"));
            };
            match hex_to_bytes(value) {
                Ok(bytes) => {
                    state.storage.insert(kind, &key, bytes);
                    RpcResponse::success(id, serde_json::Value::Null)
                }
                Err(e) => RpcResponse::error(id, RpcError::invalid_params(e.to_string())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use offstore_protocol::{StorageKey, StorageKind};

    fn call(state: &NodeState, req: &RpcRequest) -> RpcResponse {
        handle_request(state, &serde_json::to_string(req).unwrap())
    }

    #[test]
    fn get_returns_null_for_missing_key() {
        let state = NodeState::default();
        let req = RpcRequest::local_storage_get(
            serde_json::json!(1),
            StorageKind::Persistent,
            &StorageKey::from_name("testkey"),
        );
        let resp = call(&state, &req);
        assert!(resp.error.is_none());
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json["result"].is_null());
        assert_eq!(json["id"], 1);
    }

    #[test]
    fn set_then_get() {
        let state = NodeState::default();
        let key = StorageKey::from_name("k");
        let set =
            RpcRequest::local_storage_set(serde_json::json!(1), StorageKind::Local, &key, b"v");
        assert!(call(&state, &set).error.is_none());

        let get = RpcRequest::local_storage_get(serde_json::json!(2), StorageKind::Local, &key);
        let resp = call(&state, &get);
        assert_eq!(resp.result, Some(serde_json::json!("0x76")));
    }

    #[test]
    fn unknown_method_is_rejected() {
        let state = NodeState::default();
        let resp = handle_request(
            &state,
            r#"{"jsonrpc":"2.0","id":9,"method":"system_health","params":[]}"#,
        );
        let err = resp.error.unwrap();
        assert_eq!(err.code, -32601);
        assert!(err.message.contains("system_health"));
        assert_eq!(resp.id, serde_json::json!(9));
    }

    #[test]
    fn body_without_method_is_an_invalid_request() {
        let state = NodeState::default();
        for body in [r#"{"jsonrpc":"2.0","id":4}"#, "[1,2]", r#"{"id":5,"method":7}"#] {
            let resp = handle_request(&state, body);
            assert_eq!(resp.error.unwrap().code, -32600, "body: {}", body);
        }
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let resp = handle_request(&NodeState::default(), "not json");
        assert_eq!(resp.error.unwrap().code, -32700);
    }
}
