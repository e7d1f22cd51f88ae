//! Identity Collaborator
//!
//! Supplies the current user's display snapshot. Absence of an identity
//! disables every mutating operation on the conversation facade.

use crate::model::Participant;

/// Collaborator that knows who the current user is
pub trait IdentityProvider: Send + Sync {
    /// The current user's snapshot, or `None` when no one is signed in
    fn current_user(&self) -> Option<Participant>;
}

/// Identity provider with a fixed answer, for app shells and tests
#[derive(Debug, Clone, Default)]
pub struct FixedIdentity(Option<Participant>);

impl FixedIdentity {
    /// A signed-in identity
    pub fn signed_in(user: Participant) -> Self {
        Self(Some(user))
    }

    /// A signed-out identity
    pub fn signed_out() -> Self {
        Self(None)
    }
}

impl IdentityProvider for FixedIdentity {
    fn current_user(&self) -> Option<Participant> {
        self.0.clone()
    }
}
