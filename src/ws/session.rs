//! Per-connection identity binding.
//!
//! A socket starts anonymous. `join`/`joinChat`/`connect` binds it to an
//! [`Identity`]; closing the socket releases whatever is bound.

use crate::domain::Identity;
use crate::error::GatewayError;

/// The identity a single WebSocket connection is bound to, if any.
#[derive(Debug, Default)]
pub struct SessionBinding {
    identity: Option<Identity>,
}

impl SessionBinding {
    /// Creates an unbound session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds to `identity`, returning the previous identity if it differs.
    pub fn bind(&mut self, identity: Identity) -> Option<Identity> {
        match self.identity.replace(identity) {
            Some(previous) if Some(&previous) != self.identity.as_ref() => Some(previous),
            _ => None,
        }
    }

    /// The bound identity, if any.
    #[must_use]
    pub fn current(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// The bound identity.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotJoined`] if the session is unbound.
    pub fn require(&self) -> Result<&Identity, GatewayError> {
        self.identity.as_ref().ok_or(GatewayError::NotJoined)
    }

    /// Unbinds, returning the identity that was bound.
    pub fn release(&mut self) -> Option<Identity> {
        self.identity.take()
    }
}
