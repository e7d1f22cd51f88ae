//! Store Codec
//!
//! Serializes the entire thread map to and from the shared medium. Loading
//! never fails toward the caller: an absent or unparsable snapshot decodes
//! to an empty map, because stale-or-empty conversation data must degrade
//! gracefully rather than crash the host app.

use crate::error::ChatError;
use crate::model::ThreadStore;
use crate::storage::{ContextId, SharedStorage};

/// Decode a raw snapshot, falling back to an empty map on malformed input
pub fn decode(raw: &str) -> ThreadStore {
    match serde_json::from_str(raw) {
        Ok(store) => store,
        Err(err) => {
            tracing::warn!("discarding malformed thread snapshot: {}", err);
            ThreadStore::new()
        }
    }
}

/// Encode the thread map as a JSON snapshot
pub fn encode(store: &ThreadStore) -> Result<String, ChatError> {
    Ok(serde_json::to_string(store)?)
}

/// Read and decode the thread map from the shared medium; absent or
/// unparsable values yield an empty map
pub fn load(storage: &dyn SharedStorage, key: &str) -> ThreadStore {
    storage
        .get_item(key)
        .map(|raw| decode(&raw))
        .unwrap_or_default()
}

/// Serialize the full thread map and write it under `key`
pub fn save(
    storage: &dyn SharedStorage,
    writer: ContextId,
    key: &str,
    store: &ThreadStore,
) -> Result<(), ChatError> {
    let raw = encode(store)?;
    storage.set_item(writer, key, &raw).map_err(ChatError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{append_message, Participant};
    use crate::storage::InMemoryStorage;

    #[test]
    fn test_load_absent_key_yields_empty_store() {
        let storage = InMemoryStorage::new();
        assert!(load(&storage, "ridechat.threads").is_empty());
    }

    #[test]
    fn test_load_malformed_snapshot_yields_empty_store() {
        let storage = InMemoryStorage::new();
        let ctx = storage.subscribe().context_id;
        storage
            .set_item(ctx, "ridechat.threads", "{ not json }")
            .unwrap();
        assert!(load(&storage, "ridechat.threads").is_empty());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let storage = InMemoryStorage::new();
        let ctx = storage.subscribe().context_id;

        let mut store = ThreadStore::new();
        let ana = Participant::new("ana", "Ana");
        let bruno = Participant::new("bruno", "Bruno");
        append_message(&mut store, &ana, &bruno, Some("oi".to_string()), None, None).unwrap();
        append_message(&mut store, &bruno, &ana, Some("oi!".to_string()), None, None).unwrap();

        save(&storage, ctx, "ridechat.threads", &store).unwrap();
        let loaded = load(&storage, "ridechat.threads");
        assert_eq!(loaded, store);
    }
}
