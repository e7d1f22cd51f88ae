//! Shared Durable Medium
//!
//! The seam between the conversation store and the device's shared
//! key-value storage. Every execution context of the app (each window or
//! tab) reads and writes the same slots synchronously; a successful write
//! is delivered asynchronously, fire-and-forget, to every *other* live
//! context as a `StorageEvent` carrying the key and the new serialized
//! value. There is no lock, transaction, or version check on the medium.

use std::sync::mpsc::Receiver;

use thiserror::Error;
use uuid::Uuid;

pub mod memory;

pub use memory::InMemoryStorage;

/// Identifies one execution context so the medium can skip the writer when
/// delivering change events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(Uuid);

impl ContextId {
    /// Create a fresh context id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ContextId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Change event delivered to every context except the writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// The mutated key
    pub key: String,
    /// The newly serialized value
    pub new_value: String,
}

/// A context's subscription to change events
pub struct StorageSubscription {
    /// The subscribing context's id; pass it to `set_item` so the medium
    /// does not echo the context's own writes back to it
    pub context_id: ContextId,
    /// Channel of change events; drain with `try_recv` from the context's
    /// event loop
    pub events: Receiver<StorageEvent>,
}

/// Errors reported by the shared medium
#[derive(Debug, Error, Clone)]
pub enum StorageError {
    /// The medium ran out of capacity; the write was abandoned
    #[error("storage quota exceeded writing '{key}' ({size} bytes)")]
    QuotaExceeded {
        /// The key being written
        key: String,
        /// Size of the rejected value in bytes
        size: usize,
    },
}

/// The shared durable medium interface
pub trait SharedStorage: Send + Sync {
    /// Read the current value under `key`, if any
    fn get_item(&self, key: &str) -> Option<String>;

    /// Write `value` under `key` and deliver a change event to every
    /// subscribed context except `writer`
    fn set_item(&self, writer: ContextId, key: &str, value: &str) -> Result<(), StorageError>;

    /// Register a new execution context and return its event subscription
    fn subscribe(&self) -> StorageSubscription;
}
