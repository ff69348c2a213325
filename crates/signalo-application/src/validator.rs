//! Boot-time session validation.
//!
//! Drives the context through `Unknown -> Validating -> {Valid, Invalid}`
//! and decides the initial route. The whoami call races a wall-clock
//! deadline; on timeout the session is declared invalid and the in-flight
//! call is left to finish on its own, its result ignored.

use std::sync::Arc;
use std::time::Duration;

use signalo_core::api::TransitApi;
use signalo_core::credential::CredentialStore;
use signalo_core::error::Result;
use signalo_core::session::InitialRoute;

use crate::session_context::SessionContext;

/// How long the boot validation may take before the session is presumed
/// invalid.
pub const VALIDATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Validates the stored token against the backend at startup.
pub struct SessionValidator {
    api: Arc<dyn TransitApi>,
    store: Arc<dyn CredentialStore>,
    context: Arc<SessionContext>,
    timeout: Duration,
}

impl SessionValidator {
    pub fn new(
        api: Arc<dyn TransitApi>,
        store: Arc<dyn CredentialStore>,
        context: Arc<SessionContext>,
    ) -> Self {
        Self {
            api,
            store,
            context,
            timeout: VALIDATION_TIMEOUT,
        }
    }

    /// Overrides the validation deadline (for testing).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs the boot validation and returns the initial route.
    ///
    /// With no stored token the result is `Login` without any network
    /// call. A rejected token, transport failure, or deadline overrun all
    /// settle as `Login` with the stored token cleared. The outcome is
    /// terminal for this boot cycle.
    ///
    /// # Errors
    ///
    /// Only credential-store failures propagate; network problems settle
    /// the state machine instead of erroring.
    pub async fn validate_on_boot(&self) -> Result<InitialRoute> {
        self.context.set_validating();

        if self.store.get().await?.is_none() {
            tracing::debug!("no stored token, skipping validation call");
            self.context.set_invalid();
            return Ok(InitialRoute::Login);
        }

        // Spawn the call so the deadline only abandons the result; the
        // request itself is not cancelled.
        let api = self.api.clone();
        let call = tokio::spawn(async move { api.whoami().await });

        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(Ok(profile))) => {
                self.context.set_valid(Some(profile));
                Ok(InitialRoute::Authenticated)
            }
            Ok(Ok(Err(err))) => {
                tracing::warn!(error = %err, "boot validation rejected");
                self.context.invalidate().await?;
                Ok(InitialRoute::Login)
            }
            Ok(Err(join_err)) => {
                tracing::warn!(error = %join_err, "boot validation task failed");
                self.context.invalidate().await?;
                Ok(InitialRoute::Login)
            }
            Err(_elapsed) => {
                tracing::warn!(timeout = ?self.timeout, "boot validation timed out");
                self.context.invalidate().await?;
                Ok(InitialRoute::Login)
            }
        }
    }
}
