//! Session context: the single owner of session state.
//!
//! Screens never mutate session state directly; they observe snapshots
//! through a watch channel. The context is the only writer, and the only
//! place that clears credentials.

use std::sync::Arc;

use signalo_core::credential::CredentialStore;
use signalo_core::error::Result;
use signalo_core::session::{SessionPhase, SessionSnapshot};
use signalo_core::user::UserProfile;
use tokio::sync::watch;

/// Owns the session's phase and cached profile.
pub struct SessionContext {
    store: Arc<dyn CredentialStore>,
    tx: watch::Sender<SessionSnapshot>,
}

impl SessionContext {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            tx: watch::Sender::new(SessionSnapshot::default()),
        }
    }

    /// Subscribes to session snapshots. The receiver sees the current
    /// snapshot immediately and every change afterwards.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.tx.borrow().phase
    }

    /// The stored token, for callers that need to know whether anyone is
    /// logged in at all.
    pub async fn token(&self) -> Result<Option<String>> {
        self.store.get().await
    }

    fn publish(&self, snapshot: SessionSnapshot) {
        // send_replace never fails; subscribers may come and go freely.
        self.tx.send_replace(snapshot);
    }

    pub(crate) fn set_validating(&self) {
        self.publish(SessionSnapshot {
            phase: SessionPhase::Validating,
            profile: None,
        });
    }

    /// Marks the session valid. The profile may arrive later (login knows
    /// the token before anyone has called whoami).
    pub(crate) fn set_valid(&self, profile: Option<UserProfile>) {
        tracing::info!("session is valid");
        self.publish(SessionSnapshot {
            phase: SessionPhase::Valid,
            profile,
        });
    }

    /// Replaces the cached profile without touching the phase.
    pub(crate) fn update_profile(&self, profile: UserProfile) {
        let phase = self.phase();
        self.publish(SessionSnapshot {
            phase,
            profile: Some(profile),
        });
    }

    /// Marks the session invalid without touching the store (used when
    /// there was no token to begin with).
    pub(crate) fn set_invalid(&self) {
        self.publish(SessionSnapshot {
            phase: SessionPhase::Invalid,
            profile: None,
        });
    }

    /// Clears the stored token and publishes the unauthenticated state.
    ///
    /// This is the redirect signal: subscribers seeing `Invalid` route to
    /// the login area.
    pub async fn invalidate(&self) -> Result<()> {
        self.store.clear().await?;
        tracing::info!("session invalidated, credentials cleared");
        self.set_invalid();
        Ok(())
    }
}
