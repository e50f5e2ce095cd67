//! File-backed session store
//!
//! Holds the same two keys a browser frontend keeps in local storage:
//! the bearer `token` and the cached `user` profile.

use std::path::PathBuf;
use std::sync::RwLock;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::listeners::UnauthenticatedListeners;
use crate::domain::entities::{Identity, UserId};
use crate::domain::ports::SessionProvider;
use crate::error::SessionError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Identity>,
}

pub struct StoredSession {
    path: PathBuf,
    data: RwLock<SessionData>,
    listeners: UnauthenticatedListeners,
}

impl StoredSession {
    /// Load the store. A missing file is an empty (signed-out) session.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let data = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => SessionData::default(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => SessionData::default(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
            listeners: UnauthenticatedListeners::default(),
        })
    }

    /// Register a callback for rejected credentials
    pub fn on_unauthenticated<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listeners.push(callback);
    }

    /// Replace the token and persist
    pub fn store_token(&self, token: Option<String>) -> Result<(), SessionError> {
        self.write().token = token;
        self.save()
    }

    /// Cache the signed-in profile and persist
    pub fn store_identity(&self, identity: Identity) -> Result<(), SessionError> {
        self.write().user = Some(identity);
        self.save()
    }

    pub fn save(&self) -> Result<(), SessionError> {
        let json = serde_json::to_string_pretty(&*self.read())?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, SessionData> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, SessionData> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionProvider for StoredSession {
    fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    /// The cached profile, or an id-only identity recovered from the token
    fn cached_identity(&self) -> Option<Identity> {
        let data = self.read();
        data.user
            .clone()
            .or_else(|| data.token.as_deref().and_then(identity_from_token))
    }

    fn unauthenticated(&self) {
        self.write().token = None;
        if let Err(e) = self.save() {
            tracing::warn!("Failed to persist cleared session: {}", e);
        }
        self.listeners.notify();
    }
}

/// Read the `sub` claim of a JWT without verifying it. The server is the
/// only authority; this is just enough to tell which posts are ours.
pub fn identity_from_token(token: &str) -> Option<Identity> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;

    let id = match claims.get("sub")? {
        serde_json::Value::Number(n) => n.as_i64()?,
        serde_json::Value::String(s) => s.parse().ok()?,
        _ => return None,
    };

    Some(Identity::from_id(UserId(id)))
}
