//! Session port
//!
//! The credential and the cached identity live in a persisted store outside
//! the feed. They are injected through this trait instead of being read from
//! global state.

use crate::domain::entities::Identity;

pub trait SessionProvider: Send + Sync {
    /// Bearer token attached to every request, if signed in
    fn token(&self) -> Option<String>;

    /// Identity of the signed-in user, if known
    fn cached_identity(&self) -> Option<Identity>;

    /// Called when the backend rejects the credential (or none exists).
    /// Implementations notify whatever drives the login flow.
    fn unauthenticated(&self);
}
