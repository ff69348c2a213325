//! Backend endpoint configuration.

use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;

/// Where the backend lives, resolved once at startup.
///
/// The REST surface hangs off `/api`, but some resources the server hands
/// back (avatar paths) are relative to the bare origin, so both forms are
/// exposed.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl ApiConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Base URL for API calls, e.g. `http://192.168.1.10:8000/api`.
    pub fn base_url(&self) -> String {
        format!("{}/api", self.origin())
    }

    /// Bare origin, e.g. `http://192.168.1.10:8000`.
    ///
    /// Avatar paths returned by the backend are relative to this, not to
    /// the API base.
    pub fn origin(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}
