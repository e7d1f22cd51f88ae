//! RideChat Conversation Store
//!
//! Client-side peer-to-peer conversation store for the RideChat app:
//! persists 1:1 direct-message threads, reactions, and read state in a
//! single shared durable slot on the device, and propagates every mutation
//! to all other concurrently running execution contexts (windows, tabs) of
//! the app on the same device, without a coordinating server.
//!
//! # Module Structure
//!
//! - **`model`** - pure data operations: canonical thread identity, message
//!   append, reaction toggle, unread accounting
//! - **`codec`** - serializes the whole thread map to and from the shared
//!   medium; malformed or absent snapshots decode to an empty map
//! - **`storage`** - the shared durable medium seam and its in-process
//!   implementation, including the change propagation channel
//! - **`notify`** - the pure notification dedup engine and the OS
//!   notification collaborator trait
//! - **`identity`** - the current-user collaborator trait
//! - **`service`** - the `ConversationService` facade the UI talks to
//! - **`config`** / **`error`** - configuration and error types
//!
//! # Control Flow
//!
//! A facade mutates its in-memory cache, the codec persists a full snapshot
//! to the shared medium, the medium fires a change event in every other
//! live context, and each receiving facade runs the dedup engine against
//! its previous snapshot, raises alerts for genuinely new inbound messages,
//! then replaces its cache wholesale.
//!
//! # Consistency
//!
//! The store is last-writer-wins at whole-map granularity: there is no
//! lock, transaction, or version check on the medium, so two contexts
//! mutating within the same delivery window race and the later persist
//! wins. See `ConversationService` for the full statement of this
//! documented limitation.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use ridechat::{
//!     ChatConfig, ConversationService, FixedIdentity, InMemoryStorage, LogNotifier, Participant,
//! };
//!
//! let storage = Arc::new(InMemoryStorage::new());
//! let ana = Participant::new("ana", "Ana");
//! let mut service = ConversationService::new(
//!     storage,
//!     Arc::new(FixedIdentity::signed_in(ana)),
//!     Arc::new(LogNotifier),
//!     ChatConfig::default(),
//! );
//!
//! let bruno = Participant::new("bruno", "Bruno");
//! service.send_message(Some(&bruno), Some("oi".to_string()), None, None);
//! assert_eq!(service.get_conversation("bruno").len(), 1);
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod identity;
pub mod model;
pub mod notify;
pub mod service;
pub mod storage;

pub use config::{ChatConfig, ChatConfigBuilder, ConfigError};
pub use error::ChatError;
pub use identity::{FixedIdentity, IdentityProvider};
pub use model::{
    append_message, canonical_pair_id, mark_thread_read, toggle_reaction, Message, MessageMeta,
    Participant, Thread, ThreadStore,
};
pub use notify::{diff_alerts, Alert, LogNotifier, Notifier};
pub use service::{ConversationService, ThreadSummary};
pub use storage::{
    ContextId, InMemoryStorage, SharedStorage, StorageError, StorageEvent, StorageSubscription,
};
