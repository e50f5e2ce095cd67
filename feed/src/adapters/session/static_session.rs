use std::sync::RwLock;

use super::listeners::UnauthenticatedListeners;
use crate::domain::entities::Identity;
use crate::domain::ports::SessionProvider;

/// Session with a token supplied up front. A rejected token is dropped so
/// later requests fail fast as unauthenticated.
#[derive(Default)]
pub struct StaticSession {
    token: RwLock<Option<String>>,
    identity: Option<Identity>,
    listeners: UnauthenticatedListeners,
}

impl StaticSession {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token),
            ..Default::default()
        }
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Register a callback for rejected credentials
    pub fn on_unauthenticated<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listeners.push(callback);
    }
}

impl SessionProvider for StaticSession {
    fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn cached_identity(&self) -> Option<Identity> {
        self.identity.clone()
    }

    fn unauthenticated(&self) {
        self.token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        self.listeners.notify();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_unauthenticated_clears_token_and_notifies() {
        let session = StaticSession::new(Some("tok".to_string()));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        session.on_unauthenticated(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(session.token().as_deref(), Some("tok"));
        session.unauthenticated();
        assert!(session.token().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
