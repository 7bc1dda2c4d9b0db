//! # Storage Access
//!
//! [`OffchainStorage`] is the seam between the decoder and whatever
//! actually talks to a node. The binary implements it over a WebSocket
//! connection; tests use [`MemoryStorage`].
//!
//! The functions below take the storage handle explicitly. Nothing in this
//! crate holds a connection of its own.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{ReadError, StorageError};
use crate::hex::{bytes_to_prefixed_hex, TextPolicy};
use crate::storage::{StorageKey, StorageKind, StorageValue};

/// Something that can read and write a node's offchain storage.
#[async_trait]
pub trait OffchainStorage: Send + Sync {
    /// Fetches the raw hex string stored under `key`, exactly as the node
    /// returned it. `None` when nothing is stored there.
    async fn get(
        &self,
        kind: StorageKind,
        key: &StorageKey,
    ) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(
        &self,
        kind: StorageKind,
        key: &StorageKey,
        value: &[u8],
    ) -> Result<(), StorageError>;
}

/// Reads the value under `key` and decodes its hex into bytes.
///
/// # Errors
///
/// - [`ReadError::NotFound`] if the node has nothing stored there.
/// - [`ReadError::Decode`] if the node's answer is not valid hex.
/// - [`ReadError::Storage`] for transport or RPC failures.
pub async fn read_value<S>(
    storage: &S,
    kind: StorageKind,
    key: &StorageKey,
) -> Result<StorageValue, ReadError>
where
    S: OffchainStorage + ?Sized,
{
    tracing::debug!(%kind, %key, "reading offchain storage");

    let raw = storage
        .get(kind, key)
        .await?
        .ok_or_else(|| ReadError::NotFound {
            kind,
            key: key.clone(),
        })?;

    let value = StorageValue::from_hex(&raw)?;
    tracing::debug!(%kind, %key, bytes = value.len(), "offchain value decoded");
    Ok(value)
}

/// Reads the value under `key` and decodes it all the way to text.
pub async fn read_text<S>(
    storage: &S,
    kind: StorageKind,
    key: &StorageKey,
    policy: TextPolicy,
) -> Result<String, ReadError>
where
    S: OffchainStorage + ?Sized,
{
    let value = read_value(storage, kind, key).await?;
    Ok(value.to_text(policy)?)
}

/// Stores `text` as its UTF-8 bytes under `key`.
pub async fn write_text<S>(
    storage: &S,
    kind: StorageKind,
    key: &StorageKey,
    text: &str,
) -> Result<(), StorageError>
where
    S: OffchainStorage + ?Sized,
{
    tracing::debug!(%kind, %key, bytes = text.len(), "writing offchain storage");
    storage.set(kind, key, text.as_bytes()).await
}

// ---------------------------------------------------------------------------
// In-memory storage
// ---------------------------------------------------------------------------

/// An [`OffchainStorage`] backed by a map. Behaves like a node: values come
/// back as `0x`-prefixed lowercase hex and the two kinds are separate
/// namespaces.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<(StorageKind, Vec<u8>), Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Synchronous insert, handy for seeding fixtures.
    pub fn insert(&self, kind: StorageKind, key: &StorageKey, value: impl Into<Vec<u8>>) {
        self.entries
            .write()
            .insert((kind, key.as_bytes().to_vec()), value.into());
    }

    /// Synchronous lookup returning the wire form of the value.
    pub fn lookup(&self, kind: StorageKind, key: &StorageKey) -> Option<String> {
        self.entries
            .read()
            .get(&(kind, key.as_bytes().to_vec()))
            .map(|v| bytes_to_prefixed_hex(v))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl OffchainStorage for MemoryStorage {
    async fn get(
        &self,
        kind: StorageKind,
        key: &StorageKey,
    ) -> Result<Option<String>, StorageError> {
        Ok(self.lookup(kind, key))
    }

    async fn set(
        &self,
        kind: StorageKind,
        key: &StorageKey,
        value: &[u8],
    ) -> Result<(), StorageError> {
        self.insert(kind, key, value);
        Ok(())
    }
}
