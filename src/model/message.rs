//! Chat Message Data Structure
//!
//! Represents one message in a thread. Messages are immutable after creation
//! except for their `reactions` field, which is mutated only by the reaction
//! toggle in the thread model.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Typed metadata payload: a tagged reference to another domain entity
/// shared into the conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageMeta {
    /// A shared riding route
    Route { route_id: String },
    /// A shared club event
    Event { event_id: String },
    /// A shared marketplace listing
    Listing { listing_id: String },
}

/// Represents a chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Time-based message ID; not guaranteed globally unique across
    /// concurrent senders
    pub id: String,
    /// User who sent the message
    pub sender_id: String,
    /// Text content, if any
    pub text: Option<String>,
    /// Image reference, if any
    pub image: Option<String>,
    /// Typed metadata payload, if any
    #[serde(default)]
    pub meta: Option<MessageMeta>,
    /// When the message was sent (RFC 3339 string)
    pub timestamp: String,
    /// Reactions: emoji symbol -> participant ids who applied it.
    /// An emoji key is either absent or maps to a non-empty set.
    #[serde(default)]
    pub reactions: BTreeMap<String, BTreeSet<String>>,
}

impl Message {
    /// Create a new message at the given send instant
    pub fn new(
        sender_id: impl Into<String>,
        text: Option<String>,
        image: Option<String>,
        meta: Option<MessageMeta>,
        sent_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: sent_at.timestamp_micros().to_string(),
            sender_id: sender_id.into(),
            text,
            image,
            meta,
            timestamp: sent_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            reactions: BTreeMap::new(),
        }
    }

    /// Get a preview of the message text (first N characters)
    pub fn preview(&self, max_len: usize) -> Option<String> {
        let text = self.text.as_ref()?;
        if text.chars().count() <= max_len {
            Some(text.clone())
        } else {
            let mut preview: String = text.chars().take(max_len - 3).collect();
            preview.push_str("...");
            Some(preview)
        }
    }

    /// Whether the given participant has applied the given emoji
    pub fn has_reaction(&self, emoji: &str, participant_id: &str) -> bool {
        self.reactions
            .get(emoji)
            .map(|who| who.contains(participant_id))
            .unwrap_or(false)
    }
}
