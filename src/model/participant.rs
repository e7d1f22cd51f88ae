//! Participant Snapshot
//!
//! Display data for one side of a conversation, captured at message-send
//! time and denormalized into the thread. Snapshots are not live-joined
//! against the identity backend: a participant's display data in a dormant
//! thread may go stale until that participant sends again, which refreshes
//! both snapshots.

use serde::{Deserialize, Serialize};

/// A participant's display data as captured at send time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    /// Participant user ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Avatar image reference
    pub avatar: Option<String>,
    /// Club badge image reference
    pub club_badge: Option<String>,
}

impl Participant {
    /// Create a snapshot with only an id and display name
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar: None,
            club_badge: None,
        }
    }

    /// Set the avatar reference
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    /// Set the club badge reference
    pub fn with_club_badge(mut self, badge: impl Into<String>) -> Self {
        self.club_badge = Some(badge.into());
        self
    }
}
