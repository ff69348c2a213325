//! Screen-scoped cancellation.
//!
//! Each screen owns a scope for the fetches it triggers. When the screen is
//! torn down the scope is cancelled (explicitly or by drop), and any load
//! still in flight resolves to `Cancelled` instead of settling state for a
//! screen nobody is looking at.

use signalo_core::error::{Result, SignaloError};
use tokio_util::sync::CancellationToken;

/// Cancellation handle tied to a screen's lifetime.
#[derive(Debug)]
pub struct ScreenScope {
    token: CancellationToken,
}

impl ScreenScope {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Cancels everything running under this scope.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Runs a fallible future under this scope.
    ///
    /// Returns `Cancelled` as soon as the scope is cancelled; the late
    /// result of the underlying work is discarded.
    pub async fn run<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::select! {
            _ = self.token.cancelled() => Err(SignaloError::Cancelled),
            result = fut => result,
        }
    }
}

impl Default for ScreenScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ScreenScope {
    fn drop(&mut self) {
        // Navigating away drops the scope; in-flight work is abandoned.
        self.token.cancel();
    }
}
