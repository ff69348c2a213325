//! Application layer for Signalo.
//!
//! This crate provides the session lifecycle and data-fetch orchestration
//! that sits between the UI shell and the backend: boot-time session
//! validation, coordinated multi-resource loads, mutation submission, and
//! the notification boundary where every failure becomes user-visible.

pub mod auth;
pub mod bootstrap;
pub mod notifier;
pub mod orchestrator;
pub mod scope;
pub mod session_context;
pub mod singleflight;
pub mod submitter;
pub mod validator;

#[cfg(test)]
mod test_support;

pub use auth::AuthService;
pub use bootstrap::ClientStack;
pub use notifier::{LogNotifier, NoticeLevel, Notifier};
pub use orchestrator::{FetchOrchestrator, ReferenceData, UserScopedData};
pub use scope::ScreenScope;
pub use session_context::SessionContext;
pub use submitter::MutationSubmitter;
pub use validator::{SessionValidator, VALIDATION_TIMEOUT};
