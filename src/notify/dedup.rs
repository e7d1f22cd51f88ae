//! Notification Dedup Engine
//!
//! Pure comparison of the previous local snapshot against an incoming one,
//! deciding which threads deserve a user-facing alert. Keeping this a pure
//! function of (old, new, my id) isolates the only effectful part of the
//! sync path and makes the once-per-message-id guarantee independently
//! testable.
//!
//! A thread alerts iff its new last message exists, was not authored by the
//! current user, and its id differs from the last message the previous
//! snapshot carried for that thread (or the thread is new). Every sync
//! cycle re-runs the comparison, so the id check is what prevents duplicate
//! alerts for the same message across cycles.

use crate::model::{Message, MessageMeta, Thread, ThreadStore};

use super::Alert;

/// Placeholder body for image-only messages
const IMAGE_BODY: &str = "Sent a photo";
/// Placeholder title when the sender snapshot is missing from the thread
const FALLBACK_TITLE: &str = "New message";

/// Compare snapshots and return the alerts to raise, at most one per
/// distinct incoming message id, none for messages the current user sent
pub fn diff_alerts(
    old: &ThreadStore,
    new: &ThreadStore,
    my_id: &str,
    preview_len: usize,
) -> Vec<Alert> {
    let mut alerts = Vec::new();
    for (thread_id, thread) in new {
        let Some(last) = &thread.last_message else {
            continue;
        };
        if last.sender_id == my_id {
            continue;
        }
        let already_seen = old
            .get(thread_id)
            .and_then(|t| t.last_message.as_ref())
            .is_some_and(|prev| prev.id == last.id);
        if already_seen {
            continue;
        }
        alerts.push(build_alert(thread_id, thread, last, preview_len));
    }
    alerts
}

fn build_alert(thread_id: &str, thread: &Thread, message: &Message, preview_len: usize) -> Alert {
    let sender = thread.participants.get(&message.sender_id);
    Alert {
        thread_id: thread_id.to_string(),
        title: sender
            .map(|p| p.name.clone())
            .unwrap_or_else(|| FALLBACK_TITLE.to_string()),
        body: body_for(message, preview_len),
        icon: sender.and_then(|p| p.avatar.clone()),
    }
}

fn body_for(message: &Message, preview_len: usize) -> String {
    if let Some(preview) = message.preview(preview_len) {
        return preview;
    }
    if message.image.is_some() {
        return IMAGE_BODY.to_string();
    }
    match &message.meta {
        Some(MessageMeta::Route { .. }) => "Shared a route".to_string(),
        Some(MessageMeta::Event { .. }) => "Shared an event".to_string(),
        Some(MessageMeta::Listing { .. }) => "Shared a listing".to_string(),
        None => IMAGE_BODY.to_string(),
    }
}
