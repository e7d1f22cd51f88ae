//! Cross-context propagation behavior
//!
//! Exercises alert dedup across sync cycles, the documented
//! last-writer-wins race between concurrent contexts, and degradation when
//! the shared medium rejects a write.

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use ridechat::{
    codec, ChatConfig, ConversationService, FixedIdentity, InMemoryStorage, Notifier, Participant,
    SharedStorage,
};

/// Notifier that records every delivered alert
#[derive(Default)]
struct RecordingNotifier {
    alerts: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    fn delivered(&self) -> Vec<(String, String)> {
        self.alerts.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, body: &str, _icon: Option<&str>) {
        self.alerts
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
    }
}

fn ana() -> Participant {
    Participant::new("ana", "Ana").with_avatar("avatars/ana.png")
}

fn bruno() -> Participant {
    Participant::new("bruno", "Bruno")
}

fn context_with_notifier(
    storage: &Arc<InMemoryStorage>,
    user: Participant,
    notifier: Arc<RecordingNotifier>,
) -> ConversationService {
    ConversationService::new(
        Arc::clone(storage) as Arc<dyn SharedStorage>,
        Arc::new(FixedIdentity::signed_in(user)),
        notifier,
        ChatConfig::default(),
    )
}

#[test]
fn inbound_message_alerts_exactly_once() {
    let storage = Arc::new(InMemoryStorage::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let mut ana_ctx =
        context_with_notifier(&storage, ana(), Arc::new(RecordingNotifier::default()));
    let mut bruno_ctx = context_with_notifier(&storage, bruno(), Arc::clone(&notifier));

    ana_ctx.send_message(Some(&bruno()), Some("oi".to_string()), None, None);
    bruno_ctx.sync();

    assert_eq!(
        notifier.delivered(),
        vec![("Ana".to_string(), "oi".to_string())],
    );

    // Ana reacts to her own message: a new snapshot arrives, but the last
    // message id is unchanged, so no further alert.
    let thread_id = bruno_ctx.get_threads()[0].id.clone();
    let message_id = bruno_ctx.get_conversation("ana")[0].id.clone();
    ana_ctx.add_reaction(&thread_id, &message_id, "👍");
    bruno_ctx.sync();

    assert_eq!(notifier.delivered().len(), 1);
}

#[test]
fn no_alert_for_own_messages() {
    let storage = Arc::new(InMemoryStorage::new());
    let ana_notifier = Arc::new(RecordingNotifier::default());
    let mut ana_ctx = context_with_notifier(&storage, ana(), Arc::clone(&ana_notifier));
    let mut bruno_ctx =
        context_with_notifier(&storage, bruno(), Arc::new(RecordingNotifier::default()));

    ana_ctx.send_message(Some(&bruno()), Some("oi".to_string()), None, None);
    bruno_ctx.sync();
    bruno_ctx.send_message(Some(&ana()), Some("oi, Ana!".to_string()), None, None);
    ana_ctx.sync();

    // Ana is only alerted about Bruno's reply, never her own send.
    assert_eq!(
        ana_notifier.delivered(),
        vec![("Bruno".to_string(), "oi, Ana!".to_string())],
    );
}

#[test]
fn concurrent_writers_race_as_last_writer_wins() {
    let storage = Arc::new(InMemoryStorage::new());
    let mut ana_ctx =
        context_with_notifier(&storage, ana(), Arc::new(RecordingNotifier::default()));

    ana_ctx.send_message(Some(&bruno()), Some("oi".to_string()), None, None);

    // Bruno's context loads the one-message snapshot.
    let mut bruno_ctx =
        context_with_notifier(&storage, bruno(), Arc::new(RecordingNotifier::default()));
    let thread_id = bruno_ctx.get_threads()[0].id.clone();
    let message_id = bruno_ctx.get_conversation("ana")[0].id.clone();

    // Within the same delivery window: Ana appends a second message, then
    // Bruno reacts without having synced Ana's write.
    ana_ctx.send_message(Some(&bruno()), Some("chegou?".to_string()), None, None);
    bruno_ctx.add_reaction(&thread_id, &message_id, "👍");

    // Bruno persisted last, so durable state carries his reaction and has
    // silently lost Ana's second message. This is the documented
    // last-writer-wins property of the storage model, not a defect.
    let durable = codec::load(storage.as_ref(), "ridechat.threads");
    assert_eq!(durable[&thread_id].messages.len(), 1);
    assert!(durable[&thread_id].messages[0].has_reaction("👍", "bruno"));

    // Ana still sees her own message in memory until she next syncs.
    assert_eq!(ana_ctx.get_conversation("bruno").len(), 2);
    ana_ctx.sync();
    assert_eq!(ana_ctx.get_conversation("bruno").len(), 1);
}

#[test]
fn quota_failure_warns_and_keeps_local_state() {
    let storage = Arc::new(InMemoryStorage::with_quota(8));
    let notifier = Arc::new(RecordingNotifier::default());
    let mut ana_ctx = context_with_notifier(&storage, ana(), Arc::clone(&notifier));

    ana_ctx.send_message(Some(&bruno()), Some("oi".to_string()), None, None);

    // Durable write abandoned, user warned, message kept locally.
    assert!(storage.get_item("ridechat.threads").is_none());
    assert_eq!(ana_ctx.get_conversation("bruno").len(), 1);
    let delivered = notifier.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].0, "Storage full");
}

#[test]
fn malformed_propagated_snapshot_is_ignored() {
    let storage = Arc::new(InMemoryStorage::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let mut ana_ctx =
        context_with_notifier(&storage, ana(), Arc::new(RecordingNotifier::default()));
    let mut bruno_ctx = context_with_notifier(&storage, bruno(), Arc::clone(&notifier));

    ana_ctx.send_message(Some(&bruno()), Some("oi".to_string()), None, None);
    bruno_ctx.sync();

    let vandal = storage.subscribe().context_id;
    storage
        .set_item(vandal, "ridechat.threads", "not even json")
        .unwrap();
    bruno_ctx.sync();

    // The bad snapshot neither crashed the context nor clobbered its state.
    assert_eq!(bruno_ctx.get_conversation("ana").len(), 1);
    assert_eq!(notifier.delivered().len(), 1);
}
