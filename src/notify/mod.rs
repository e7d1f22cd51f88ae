//! Notification Seam
//!
//! The conversation store never talks to the OS notification system
//! directly. The sync handler computes `Alert` values through the pure
//! dedup engine and hands them to a `Notifier` collaborator; delivery is
//! fire-and-forget and its result is never awaited.

pub mod dedup;

pub use dedup::diff_alerts;

/// A user-facing alert for one new inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    /// Thread the message arrived in
    pub thread_id: String,
    /// Sender display name, resolved from the thread's participant snapshot
    pub title: String,
    /// Message text preview, or a fixed placeholder for text-less messages
    pub body: String,
    /// Sender avatar reference, when available
    pub icon: Option<String>,
}

/// Collaborator that performs OS-level notification delivery
pub trait Notifier: Send + Sync {
    /// Deliver one alert; implementations must not block
    fn notify(&self, title: &str, body: &str, icon: Option<&str>);
}

/// Default notifier that only logs
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, body: &str, _icon: Option<&str>) {
        tracing::info!(title, body, "notification");
    }
}
