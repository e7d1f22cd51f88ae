//! Conversation Facade
//!
//! The public API consumed by the UI and other collaborators: send, read,
//! react, list threads, list messages, total unread. Each
//! `ConversationService` is one execution context. It owns an in-memory
//! copy of the whole thread map, persists a full snapshot through the codec
//! after every mutation, and drains the propagation channel in `sync`.
//!
//! Conflict policy is last-writer-wins over the whole store: an incoming
//! snapshot replaces the local cache outright, so two contexts mutating
//! within the same delivery window race and the later persist silently
//! discards the earlier one from durable state. The losing context keeps
//! its change in memory until its next snapshot replacement. This is a
//! documented property of the storage model, asserted by test.

use std::sync::Arc;

use crate::codec;
use crate::config::ChatConfig;
use crate::identity::IdentityProvider;
use crate::model::{self, Message, MessageMeta, Participant, ThreadStore};
use crate::notify::{diff_alerts, Notifier};
use crate::storage::{ContextId, SharedStorage, StorageEvent, StorageSubscription};

/// One row of the thread list, sorted by recency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadSummary {
    /// Canonical thread id
    pub id: String,
    /// The other participant's snapshot
    pub partner: Participant,
    /// Last message in the thread, for preview
    pub last_message: Option<Message>,
    /// Current user's unread count for this thread
    pub unread_count: u32,
    /// RFC 3339 timestamp of the last mutation
    pub updated_at: String,
}

/// The conversation store facade for one execution context
pub struct ConversationService {
    storage: Arc<dyn SharedStorage>,
    identity: Arc<dyn IdentityProvider>,
    notifier: Arc<dyn Notifier>,
    config: ChatConfig,
    context_id: ContextId,
    events: std::sync::mpsc::Receiver<StorageEvent>,
    threads: ThreadStore,
}

impl ConversationService {
    /// Create a facade for a new execution context, loading the current
    /// snapshot from the shared medium
    pub fn new(
        storage: Arc<dyn SharedStorage>,
        identity: Arc<dyn IdentityProvider>,
        notifier: Arc<dyn Notifier>,
        config: ChatConfig,
    ) -> Self {
        let StorageSubscription { context_id, events } = storage.subscribe();
        let threads = codec::load(storage.as_ref(), &config.threads_key);
        tracing::debug!(context = %context_id, threads = threads.len(), "conversation store loaded");
        Self {
            storage,
            identity,
            notifier,
            config,
            context_id,
            events,
            threads,
        }
    }

    /// Send a message to `recipient`. Requires a signed-in identity and a
    /// recipient; otherwise a no-op.
    pub fn send_message(
        &mut self,
        recipient: Option<&Participant>,
        text: Option<String>,
        image: Option<String>,
        meta: Option<MessageMeta>,
    ) {
        let Some(me) = self.identity.current_user() else {
            tracing::debug!("send_message skipped: no current user");
            return;
        };
        let Some(recipient) = recipient else {
            tracing::debug!("send_message skipped: no recipient");
            return;
        };
        match model::append_message(&mut self.threads, &me, recipient, text, image, meta) {
            Ok(_) => self.persist(),
            Err(err) => tracing::warn!("send_message rejected: {}", err),
        }
    }

    /// Zero the current user's unread counter on `thread_id`. Persists only
    /// when the counter actually changed.
    pub fn mark_as_read(&mut self, thread_id: &str) {
        let Some(me) = self.identity.current_user() else {
            return;
        };
        if model::mark_thread_read(&mut self.threads, thread_id, &me.id) {
            self.persist();
        }
    }

    /// Toggle the current user's `emoji` reaction on a message
    pub fn add_reaction(&mut self, thread_id: &str, message_id: &str, emoji: &str) {
        let Some(me) = self.identity.current_user() else {
            return;
        };
        if model::toggle_reaction(&mut self.threads, thread_id, message_id, &me.id, emoji) {
            self.persist();
        }
    }

    /// Messages exchanged with `recipient_id`, oldest first; empty when the
    /// thread does not exist or no one is signed in
    pub fn get_conversation(&self, recipient_id: &str) -> Vec<Message> {
        let Some(me) = self.identity.current_user() else {
            return Vec::new();
        };
        let Ok(thread_id) = model::canonical_pair_id(&me.id, recipient_id) else {
            return Vec::new();
        };
        self.threads
            .get(&thread_id)
            .map(|thread| thread.messages.clone())
            .unwrap_or_default()
    }

    /// Thread summaries for the current user, most recently updated first
    pub fn get_threads(&self) -> Vec<ThreadSummary> {
        let Some(me) = self.identity.current_user() else {
            return Vec::new();
        };
        let mut summaries: Vec<ThreadSummary> = self
            .threads
            .values()
            .filter(|thread| thread.participants.contains_key(&me.id))
            .filter_map(|thread| {
                let partner = thread.partner(&me.id)?.clone();
                Some(ThreadSummary {
                    id: thread.id.clone(),
                    partner,
                    last_message: thread.last_message.clone(),
                    unread_count: thread.unread_counts.get(&me.id).copied().unwrap_or(0),
                    updated_at: thread.updated_at.clone(),
                })
            })
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        summaries
    }

    /// Sum of the current user's unread counts across all threads
    pub fn total_unread(&self) -> u32 {
        self.get_threads().iter().map(|t| t.unread_count).sum()
    }

    /// Drain pending propagation events from other contexts. For each event
    /// on our key: parse the snapshot (malformed payloads are ignored), run
    /// the dedup engine against the previous local snapshot, raise its
    /// alerts, then replace the whole in-memory store.
    pub fn sync(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            if event.key != self.config.threads_key {
                continue;
            }
            self.apply_snapshot(&event.new_value);
        }
    }

    /// This context's id on the shared medium
    pub fn context_id(&self) -> ContextId {
        self.context_id
    }

    fn apply_snapshot(&mut self, raw: &str) {
        let incoming: ThreadStore = match serde_json::from_str(raw) {
            Ok(store) => store,
            Err(err) => {
                tracing::warn!("ignoring malformed propagated snapshot: {}", err);
                return;
            }
        };
        if let Some(me) = self.identity.current_user() {
            for alert in diff_alerts(
                &self.threads,
                &incoming,
                &me.id,
                self.config.alert_preview_len,
            ) {
                self.notifier
                    .notify(&alert.title, &alert.body, alert.icon.as_deref());
            }
        }
        self.threads = incoming;
    }

    fn persist(&mut self) {
        if let Err(err) = codec::save(
            self.storage.as_ref(),
            self.context_id,
            &self.config.threads_key,
            &self.threads,
        ) {
            // The in-memory state is kept so the user does not lose the
            // message from their own view; the next mutation retries.
            tracing::warn!("failed to persist conversation store: {}", err);
            self.notifier.notify(
                "Storage full",
                "Your latest change could not be saved on this device.",
                None,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::FixedIdentity;
    use crate::notify::LogNotifier;
    use crate::storage::InMemoryStorage;

    fn ana() -> Participant {
        Participant::new("ana", "Ana")
    }

    fn bruno() -> Participant {
        Participant::new("bruno", "Bruno")
    }

    fn service_for(storage: &Arc<InMemoryStorage>, user: Participant) -> ConversationService {
        ConversationService::new(
            Arc::clone(storage) as Arc<dyn SharedStorage>,
            Arc::new(FixedIdentity::signed_in(user)),
            Arc::new(LogNotifier),
            ChatConfig::default(),
        )
    }

    #[test]
    fn test_send_message_without_identity_is_a_noop() {
        let storage = Arc::new(InMemoryStorage::new());
        let mut service = ConversationService::new(
            Arc::clone(&storage) as Arc<dyn SharedStorage>,
            Arc::new(FixedIdentity::signed_out()),
            Arc::new(LogNotifier),
            ChatConfig::default(),
        );
        service.send_message(Some(&bruno()), Some("oi".to_string()), None, None);
        assert!(service.get_threads().is_empty());
        assert!(storage.get_item("ridechat.threads").is_none());
    }

    #[test]
    fn test_send_message_without_recipient_is_a_noop() {
        let storage = Arc::new(InMemoryStorage::new());
        let mut service = service_for(&storage, ana());
        service.send_message(None, Some("oi".to_string()), None, None);
        assert!(storage.get_item("ridechat.threads").is_none());
    }

    #[test]
    fn test_send_message_persists_snapshot() {
        let storage = Arc::new(InMemoryStorage::new());
        let mut service = service_for(&storage, ana());
        service.send_message(Some(&bruno()), Some("oi".to_string()), None, None);

        let raw = storage.get_item("ridechat.threads").unwrap();
        assert!(raw.contains("ana:bruno"));
        assert_eq!(service.get_conversation("bruno").len(), 1);
    }

    #[test]
    fn test_get_conversation_without_thread_is_empty() {
        let storage = Arc::new(InMemoryStorage::new());
        let service = service_for(&storage, ana());
        assert!(service.get_conversation("bruno").is_empty());
        assert!(service.get_conversation("").is_empty());
    }

    #[test]
    fn test_mark_as_read_persists_only_nontrivial_changes() {
        let storage = Arc::new(InMemoryStorage::new());
        let mut sender = service_for(&storage, ana());
        sender.send_message(Some(&bruno()), Some("oi".to_string()), None, None);

        let mut reader = service_for(&storage, bruno());
        assert_eq!(reader.total_unread(), 1);

        reader.mark_as_read("ana:bruno");
        assert_eq!(reader.total_unread(), 0);
        let snapshot_after_read = storage.get_item("ridechat.threads").unwrap();

        // Second call changes nothing, so nothing is rewritten.
        reader.mark_as_read("ana:bruno");
        assert_eq!(
            storage.get_item("ridechat.threads").unwrap(),
            snapshot_after_read,
        );
    }

    #[test]
    fn test_threads_sorted_by_recency_with_partner_resolved() {
        let storage = Arc::new(InMemoryStorage::new());
        let mut service = service_for(&storage, ana());
        service.send_message(Some(&bruno()), Some("oi".to_string()), None, None);
        let carla = Participant::new("carla", "Carla");
        service.send_message(Some(&carla), Some("bora?".to_string()), None, None);

        // Make recency unambiguous regardless of timer resolution.
        service.threads.get_mut("ana:bruno").unwrap().updated_at =
            "2026-08-26T10:00:00.000Z".to_string();
        service.threads.get_mut("ana:carla").unwrap().updated_at =
            "2026-08-26T11:00:00.000Z".to_string();

        let threads = service.get_threads();
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].partner.id, "carla");
        assert_eq!(threads[1].partner.id, "bruno");
    }

    #[test]
    fn test_quota_failure_keeps_message_in_memory() {
        let storage = Arc::new(InMemoryStorage::with_quota(8));
        let mut service = service_for(&storage, ana());
        service.send_message(Some(&bruno()), Some("oi".to_string()), None, None);

        // Durable write was abandoned, local view keeps the message.
        assert!(storage.get_item("ridechat.threads").is_none());
        assert_eq!(service.get_conversation("bruno").len(), 1);
    }

    #[test]
    fn test_sync_ignores_foreign_keys_and_malformed_snapshots() {
        let storage = Arc::new(InMemoryStorage::new());
        let mut sender = service_for(&storage, ana());
        sender.send_message(Some(&bruno()), Some("oi".to_string()), None, None);

        let mut receiver = service_for(&storage, bruno());
        let writer = storage.subscribe().context_id;
        storage
            .set_item(writer, "ridechat.active_route", "{\"route\":1}")
            .unwrap();
        storage
            .set_item(writer, "ridechat.threads", "{ corrupted }")
            .unwrap();
        receiver.sync();

        // Neither event disturbed the loaded state.
        assert_eq!(receiver.get_conversation("ana").len(), 1);
    }
}
