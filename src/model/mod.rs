//! Conversation Data Model
//!
//! Pure data structures and operations for the conversation store:
//!
//! - `Participant` - display snapshot of one side of a thread
//! - `Message` - a single chat message with reactions and optional metadata
//! - `Thread` - a 1:1 conversation container
//! - thread operations: `canonical_pair_id`, `append_message`,
//!   `mark_thread_read`, `toggle_reaction`
//!
//! Everything here operates on the in-memory `ThreadStore`; persistence and
//! propagation live in `codec` and `storage`.

pub mod message;
pub mod participant;
pub mod thread;

// Re-export all types
pub use message::{Message, MessageMeta};
pub use participant::Participant;
pub use thread::{
    append_message, canonical_pair_id, mark_thread_read, toggle_reaction, Thread, ThreadStore,
};
