//! User-notification boundary.
//!
//! Every service in this crate catches its errors and converts them to a
//! user-visible notification here; nothing propagates past the action
//! boundary except the typed result the caller needs.

use std::sync::Arc;

use signalo_core::error::SignaloError;

use crate::session_context::SessionContext;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Sink for user-facing notifications (the UI shows these as alerts).
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// Default notifier that writes notices to the log.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Info => tracing::info!(notice = message),
            NoticeLevel::Error => tracing::warn!(notice = message),
        }
    }
}

/// Converts a failure into user-visible behavior.
///
/// - `Cancelled`: the owning screen is gone; nobody is looking, stay quiet.
/// - `SessionInvalid`: notify, clear credentials, publish the redirect.
/// - anything else: notify with the server-provided message when there is
///   one, otherwise with `fallback`. The session is left alone.
pub(crate) async fn surface_error(
    notifier: &Arc<dyn Notifier>,
    context: &SessionContext,
    err: &SignaloError,
    fallback: &str,
) {
    if err.is_cancelled() {
        tracing::debug!("suppressing notification for cancelled request");
        return;
    }

    if err.is_session_invalid() {
        notifier.notify(
            NoticeLevel::Error,
            "Your session has expired. Please sign in again.",
        );
        if let Err(clear_err) = context.invalidate().await {
            tracing::warn!(error = %clear_err, "failed to clear credentials on invalidation");
        }
        return;
    }

    let message = err.server_message().unwrap_or(fallback);
    notifier.notify(NoticeLevel::Error, message);
}
