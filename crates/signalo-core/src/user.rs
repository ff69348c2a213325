//! User profile domain model and profile edit draft.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;
use crate::error::{Result, SignaloError};

/// The logged-in user's profile as returned by the whoami endpoint.
///
/// Held in memory only, for the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Origin-relative path to the avatar image, when one is set.
    pub avatar_path: Option<String>,
}

impl UserProfile {
    /// Resolves the avatar path against the backend origin.
    ///
    /// The backend stores avatar paths relative to the bare origin (not the
    /// `/api` base), so resolution goes through [`ApiConfig::origin`].
    pub fn avatar_url(&self, config: &ApiConfig) -> Option<String> {
        self.avatar_path
            .as_ref()
            .map(|path| format!("{}{}", config.origin(), path))
    }
}

/// A profile edit being composed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDraft {
    pub username: String,
    pub email: String,
    /// New password; `None` leaves the current one untouched.
    pub password: Option<String>,
    /// Newly picked avatar image, staged to a stable path.
    pub avatar: Option<PathBuf>,
}

impl ProfileDraft {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: None,
            avatar: None,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_avatar(mut self, path: impl Into<PathBuf>) -> Self {
        self.avatar = Some(path.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(SignaloError::validation("username cannot be empty"));
        }
        if self.email.trim().is_empty() {
            return Err(SignaloError::validation("email cannot be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avatar_url_resolves_against_origin() {
        let profile = UserProfile {
            id: 1,
            username: "lea".to_string(),
            email: "lea@example.org".to_string(),
            avatar_path: Some("/storage/avatars/1.jpg".to_string()),
        };
        let config = ApiConfig::new("10.1.2.3", 8000);
        assert_eq!(
            profile.avatar_url(&config),
            Some("http://10.1.2.3:8000/storage/avatars/1.jpg".to_string())
        );
    }

    #[test]
    fn test_avatar_url_absent_without_path() {
        let profile = UserProfile {
            id: 1,
            username: "lea".to_string(),
            email: "lea@example.org".to_string(),
            avatar_path: None,
        };
        assert_eq!(profile.avatar_url(&ApiConfig::default()), None);
    }

    #[test]
    fn test_profile_draft_requires_username_and_email() {
        assert!(
            ProfileDraft::new("lea", "lea@example.org")
                .validate()
                .is_ok()
        );
        assert!(
            ProfileDraft::new("", "lea@example.org")
                .validate()
                .unwrap_err()
                .is_validation()
        );
        assert!(
            ProfileDraft::new("lea", "  ")
                .validate()
                .unwrap_err()
                .is_validation()
        );
    }
}
