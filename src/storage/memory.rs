//! In-Process Shared Storage
//!
//! Process-shared implementation of the shared medium: one `InMemoryStorage`
//! wrapped in an `Arc` stands in for the device's storage area, and every
//! facade holding a clone of that `Arc` is one execution context. Delivery
//! uses a plain channel per subscriber; sends never block and carry no
//! acknowledgement, so a context that stops draining its channel simply
//! stops seeing updates.
//!
//! An optional byte quota models the medium's capacity limit: a write that
//! would push the total stored bytes past the quota is rejected whole and
//! the previous value stays in place.

use std::collections::HashMap;
use std::sync::mpsc::{channel, Sender};
use std::sync::Mutex;

use super::{ContextId, SharedStorage, StorageError, StorageEvent, StorageSubscription};

struct Subscriber {
    context_id: ContextId,
    sender: Sender<StorageEvent>,
}

/// In-process shared key-value storage with change propagation
pub struct InMemoryStorage {
    data: Mutex<HashMap<String, String>>,
    subscribers: Mutex<Vec<Subscriber>>,
    quota_bytes: Option<usize>,
}

impl InMemoryStorage {
    /// Create an unbounded storage area
    pub fn new() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
            subscribers: Mutex::new(Vec::new()),
            quota_bytes: None,
        }
    }

    /// Create a storage area that rejects writes once the total stored
    /// bytes (keys plus values) would exceed `quota_bytes`
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::new()
        }
    }

    fn stored_bytes_after(data: &HashMap<String, String>, key: &str, value: &str) -> usize {
        let current: usize = data
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum();
        current + key.len() + value.len()
    }

    fn broadcast(&self, writer: ContextId, event: StorageEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        subscribers.retain(|subscriber| {
            if subscriber.context_id == writer {
                return true;
            }
            match subscriber.sender.send(event.clone()) {
                Ok(()) => true,
                Err(_) => {
                    // Receiver dropped: that context is gone.
                    tracing::debug!(context = %subscriber.context_id, "dropping dead subscriber");
                    false
                }
            }
        });
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedStorage for InMemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.data
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }

    fn set_item(&self, writer: ContextId, key: &str, value: &str) -> Result<(), StorageError> {
        {
            let mut data = self
                .data
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(quota) = self.quota_bytes {
                if Self::stored_bytes_after(&data, key, value) > quota {
                    return Err(StorageError::QuotaExceeded {
                        key: key.to_string(),
                        size: value.len(),
                    });
                }
            }
            data.insert(key.to_string(), value.to_string());
        }

        self.broadcast(
            writer,
            StorageEvent {
                key: key.to_string(),
                new_value: value.to_string(),
            },
        );
        Ok(())
    }

    fn subscribe(&self) -> StorageSubscription {
        let (sender, events) = channel();
        let context_id = ContextId::new();
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Subscriber { context_id, sender });
        StorageSubscription { context_id, events }
    }
}
