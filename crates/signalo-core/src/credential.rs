//! Credential store trait.
//!
//! Defines the interface for the one durable secret the client keeps: the
//! backend auth token.
//!
//! # Security Note
//!
//! Implementations should ensure that:
//! - The token is never logged or embedded in error messages
//! - Backing files have appropriate permissions (e.g. 600 on Unix)

use tokio::sync::RwLock;

use crate::error::Result;

/// Durable key-value store holding the auth token.
///
/// Writes happen only at login and at logout/invalidation; reads happen on
/// every authenticated request. Implementations must survive process
/// restarts (the in-memory implementation below is for tests and ephemeral
/// use only).
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persists the token, replacing any previous one.
    async fn set(&self, token: &str) -> Result<()>;

    /// Returns the stored token, or `None` when no one is logged in.
    async fn get(&self) -> Result<Option<String>>;

    /// Removes the stored token. Clearing an empty store is not an error.
    async fn clear(&self) -> Result<()>;
}

/// In-memory credential store.
///
/// Suitable for tests and for runs that should not leave a token on disk.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with a token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

#[async_trait::async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn set(&self, token: &str) -> Result<()> {
        *self.token.write().await = Some(token.to_string());
        Ok(())
    }

    async fn get(&self) -> Result<Option<String>> {
        Ok(self.token.read().await.clone())
    }

    async fn clear(&self) -> Result<()> {
        *self.token.write().await = None;
        Ok(())
    }
}
