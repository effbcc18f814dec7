use std::sync::{PoisonError, RwLock};

use carelock_application::IdentityProvider;
use carelock_domain::UserIdentity;

/// Session-scoped holder of the authenticated identity.
///
/// Owned by the application shell; signed in after authentication completes
/// and cleared on sign-out or session expiry. The security services only
/// read it through the [`IdentityProvider`] port.
#[derive(Default)]
pub struct SessionIdentityProvider {
    identity: RwLock<Option<UserIdentity>>,
}

impl SessionIdentityProvider {
    /// Creates a provider with no authenticated user.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the authenticated identity for the session.
    pub fn sign_in(&self, identity: UserIdentity) {
        *self
            .identity
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(identity);
    }

    /// Clears the session identity.
    pub fn sign_out(&self) {
        *self
            .identity
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl IdentityProvider for SessionIdentityProvider {
    fn current_identity(&self) -> Option<UserIdentity> {
        self.identity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
