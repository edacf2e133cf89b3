//! Session handle owning the access token.
//!
//! The session is the single owner of the credential: requests read it,
//! login and refresh replace it, logout and refresh failure clear it.
//! Interested layers observe authentication changes through a watch
//! channel, so a forced logout (failed refresh) can move a UI back to
//! its unauthenticated view.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::warn;

use super::CredentialStore;

struct SessionInner {
    token: Mutex<Option<String>>,
    authed: watch::Sender<bool>,
    store: Option<CredentialStore>,
}

/// Shared, cloneable session handle. All clones see the same token.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Session backed by the OS keychain. Picks up a previously stored
    /// token, so a restart stays logged in until the server says no.
    pub fn with_store(store: CredentialStore) -> Self {
        let token = store.load().unwrap_or_else(|err| {
            warn!(error = %err, "could not read stored token, starting unauthenticated");
            None
        });
        Self::build(token, Some(store))
    }

    /// In-memory session starting unauthenticated. Nothing is persisted.
    pub fn in_memory() -> Self {
        Self::build(None, None)
    }

    fn build(token: Option<String>, store: Option<CredentialStore>) -> Self {
        let (authed, _) = watch::channel(token.is_some());
        Self {
            inner: Arc::new(SessionInner {
                token: Mutex::new(token),
                authed,
                store,
            }),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<String>> {
        self.inner.token.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current bearer token, if any.
    pub fn token(&self) -> Option<String> {
        self.slot().clone()
    }

    /// Install a new credential (login or refresh success). Persistence
    /// failures degrade to an in-memory session rather than failing the
    /// request that produced the token.
    pub fn set_token(&self, token: String) {
        if let Some(store) = &self.inner.store {
            if let Err(err) = store.store(&token) {
                warn!(error = %err, "could not persist token, keeping it in memory only");
            }
        }
        *self.slot() = Some(token);
        let _ = self.inner.authed.send_replace(true);
    }

    /// Drop the credential (logout or irrecoverable refresh failure).
    pub fn clear(&self) {
        if let Some(store) = &self.inner.store {
            if let Err(err) = store.delete() {
                warn!(error = %err, "could not remove stored token");
            }
        }
        *self.slot() = None;
        let _ = self.inner.authed.send_replace(false);
    }

    /// True iff a credential is present.
    pub fn is_authenticated(&self) -> bool {
        self.slot().is_some()
    }

    /// Observe authentication changes. The value flips to false on
    /// logout and on refresh failure.
    pub fn watch(&self) -> watch::Receiver<bool> {
        self.inner.authed.subscribe()
    }
}
