//! Unified path management for signalo client files.
//!
//! All durable client state (backend configuration, the auth token) lives
//! under the platform config directory; staged image copies live under the
//! platform cache directory.

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for signalo.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/signalo/           # Config directory
/// ├── config.toml              # Backend host/port
/// └── token.json               # The auth token
///
/// ~/.cache/signalo/            # Cache directory
/// └── staged-images/           # Local copies of picked images, pre-upload
/// ```
pub struct SignaloPaths;

impl SignaloPaths {
    /// Returns the signalo configuration directory.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join("signalo"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the signalo cache directory.
    pub fn cache_dir() -> Result<PathBuf, PathError> {
        dirs::cache_dir()
            .map(|dir| dir.join("signalo"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the token file.
    ///
    /// # Security Note
    ///
    /// This file holds the session secret; it is written with 600
    /// permissions on Unix.
    pub fn token_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("token.json"))
    }

    /// Returns the directory holding staged image copies awaiting upload.
    pub fn staging_dir() -> Result<PathBuf, PathError> {
        Ok(Self::cache_dir()?.join("staged-images"))
    }
}
