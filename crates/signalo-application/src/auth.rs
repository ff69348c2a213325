//! Authentication actions: login, registration, password reset, logout.

use std::sync::Arc;

use signalo_core::api::TransitApi;
use signalo_core::credential::CredentialStore;
use signalo_core::error::{Result, SignaloError};

use crate::notifier::{NoticeLevel, Notifier, surface_error};
use crate::session_context::SessionContext;

/// Drives the unauthenticated flows and the logout action.
pub struct AuthService {
    api: Arc<dyn TransitApi>,
    store: Arc<dyn CredentialStore>,
    context: Arc<SessionContext>,
    notifier: Arc<dyn Notifier>,
}

impl AuthService {
    pub fn new(
        api: Arc<dyn TransitApi>,
        store: Arc<dyn CredentialStore>,
        context: Arc<SessionContext>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            store,
            context,
            notifier,
        }
    }

    /// Signs in and persists the returned token.
    ///
    /// The profile is not fetched here; the first user-scoped load caches
    /// it. Empty fields are rejected before any network call.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        if email.trim().is_empty() || password.is_empty() {
            let err = SignaloError::validation("please enter your email and password");
            self.fail(&err, "Please enter your email and password.")
                .await;
            return Err(err);
        }

        match self.api.login(email, password).await {
            Ok(token) => {
                self.store.set(&token).await?;
                self.context.set_valid(None);
                tracing::info!("login succeeded");
                self.notifier.notify(NoticeLevel::Info, "Welcome back!");
                Ok(())
            }
            Err(err) => {
                self.fail(&err, "Unable to sign in. Check your connection.")
                    .await;
                Err(err)
            }
        }
    }

    /// Creates an account. The user still signs in afterwards.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<()> {
        match self.api.register(username, email, password).await {
            Ok(()) => {
                self.notifier
                    .notify(NoticeLevel::Info, "Account created. You can sign in now.");
                Ok(())
            }
            Err(err) => {
                self.fail(&err, "Unable to create the account.").await;
                Err(err)
            }
        }
    }

    /// Requests a password-reset email.
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        if email.trim().is_empty() {
            let err = SignaloError::validation("please enter your email address");
            self.fail(&err, "Please enter your email address.").await;
            return Err(err);
        }

        match self.api.forgot_password(email).await {
            Ok(()) => {
                self.notifier
                    .notify(NoticeLevel::Info, "A reset link has been sent to your email.");
                Ok(())
            }
            Err(err) => {
                self.fail(&err, "Unable to send the reset email.").await;
                Err(err)
            }
        }
    }

    /// Signs out: tells the backend best-effort, then always clears the
    /// local session.
    pub async fn logout(&self) -> Result<()> {
        if let Err(err) = self.api.logout().await {
            tracing::warn!(error = %err, "server-side logout failed, clearing locally anyway");
        }
        self.context.invalidate().await
    }

    async fn fail(&self, err: &SignaloError, fallback: &str) {
        surface_error(&self.notifier, &self.context, err, fallback).await;
    }
}
