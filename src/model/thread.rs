//! Thread Model
//!
//! A thread is a 1:1 conversation container keyed by the canonical pairing
//! of its two participant ids. This module holds the thread data structure
//! and the pure operations over the in-memory thread map: canonical thread
//! identity, message append, read-state accounting, and reaction toggling.
//! Persistence is the facade's job; nothing here touches storage.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::message::{Message, MessageMeta};
use super::participant::Participant;
use crate::error::ChatError;

/// The whole store: thread id -> thread, for every conversation on the device
pub type ThreadStore = BTreeMap<String, Thread>;

/// A 1:1 conversation between exactly two participants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Thread {
    /// Canonical pair id of the two participants
    pub id: String,
    /// Participant id -> display snapshot; exactly the two ids forming `id`
    pub participants: BTreeMap<String, Participant>,
    /// Insertion-ordered messages; append-only, never reordered or truncated
    pub messages: Vec<Message>,
    /// Denormalized pointer to the final element of `messages`
    pub last_message: Option<Message>,
    /// Participant id -> unread count; keys always match `participants`
    pub unread_counts: BTreeMap<String, u32>,
    /// RFC 3339 timestamp of the last local mutation
    pub updated_at: String,
}

impl Thread {
    /// Create an empty thread seeded with both participant snapshots and
    /// zeroed unread counters
    fn new(id: String, a: &Participant, b: &Participant, now: DateTime<Utc>) -> Self {
        let mut participants = BTreeMap::new();
        participants.insert(a.id.clone(), a.clone());
        participants.insert(b.id.clone(), b.clone());
        let unread_counts = participants.keys().map(|id| (id.clone(), 0)).collect();
        Self {
            id,
            participants,
            messages: Vec::new(),
            last_message: None,
            unread_counts,
            updated_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Get the other participant's snapshot (for direct threads)
    pub fn partner(&self, current_user_id: &str) -> Option<&Participant> {
        self.participants
            .values()
            .find(|p| p.id != current_user_id)
            .or_else(|| self.participants.get(current_user_id))
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    }
}

/// Canonical id for the pair of participants, identical regardless of
/// argument order. Fails if either id is empty.
pub fn canonical_pair_id(id_a: &str, id_b: &str) -> Result<String, ChatError> {
    if id_a.is_empty() || id_b.is_empty() {
        return Err(ChatError::validation(
            "participant_id",
            "participant id cannot be empty",
        ));
    }
    let (lo, hi) = if id_a <= id_b { (id_a, id_b) } else { (id_b, id_a) };
    Ok(format!("{}:{}", lo, hi))
}

/// Append a message from `sender` to `recipient`, creating the thread lazily.
///
/// Seeds both participant snapshots and zeroed unread counters on creation,
/// sets `last_message`, increments the recipient's unread counter by 1, and
/// refreshes both participant snapshots to the passed-in values so stale
/// display data heals on every send. Returns the thread id.
pub fn append_message(
    store: &mut ThreadStore,
    sender: &Participant,
    recipient: &Participant,
    text: Option<String>,
    image: Option<String>,
    meta: Option<MessageMeta>,
) -> Result<String, ChatError> {
    let thread_id = canonical_pair_id(&sender.id, &recipient.id)?;
    let now = Utc::now();

    let thread = store
        .entry(thread_id.clone())
        .or_insert_with(|| Thread::new(thread_id.clone(), sender, recipient, now));

    thread.participants.insert(sender.id.clone(), sender.clone());
    thread
        .participants
        .insert(recipient.id.clone(), recipient.clone());

    let message = Message::new(&sender.id, text, image, meta, now);
    thread.last_message = Some(message.clone());
    thread.messages.push(message);

    if let Some(count) = thread.unread_counts.get_mut(&recipient.id) {
        *count += 1;
    }
    thread.touch(now);

    Ok(thread_id)
}

/// Zero the reader's unread counter. Returns `true` when state changed;
/// a missing thread or an already-zero counter is a no-op so callers can
/// skip redundant persist cycles.
pub fn mark_thread_read(store: &mut ThreadStore, thread_id: &str, reader_id: &str) -> bool {
    let Some(thread) = store.get_mut(thread_id) else {
        return false;
    };
    match thread.unread_counts.get_mut(reader_id) {
        Some(count) if *count > 0 => {
            *count = 0;
            thread.touch(Utc::now());
            true
        }
        _ => false,
    }
}

/// Flip `participant_id`'s membership in `reactions[emoji]` on the given
/// message, pruning the emoji key when its set empties. Calling twice with
/// identical arguments returns to the original state. Returns `true` when
/// the thread and message were found and the toggle applied.
pub fn toggle_reaction(
    store: &mut ThreadStore,
    thread_id: &str,
    message_id: &str,
    participant_id: &str,
    emoji: &str,
) -> bool {
    let Some(thread) = store.get_mut(thread_id) else {
        return false;
    };
    let Some(message) = thread.messages.iter_mut().find(|m| m.id == message_id) else {
        return false;
    };

    let who = message.reactions.entry(emoji.to_string()).or_default();
    if !who.insert(participant_id.to_string()) {
        who.remove(participant_id);
    }
    if who.is_empty() {
        message.reactions.remove(emoji);
    }

    // Keep the denormalized copy in step with the canonical message.
    let reactions = message.reactions.clone();
    if let Some(last) = thread.last_message.as_mut() {
        if last.id == message_id {
            last.reactions = reactions;
        }
    }
    thread.touch(Utc::now());
    true
}
