//! Backend configuration loading.
//!
//! Resolution order: `~/.config/signalo/config.toml`, then the
//! `SIGNALO_HOST` / `SIGNALO_PORT` environment variables, then built-in
//! defaults. Environment always wins over the file.

use std::env;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use signalo_core::config::ApiConfig;
use signalo_core::error::{Result, SignaloError};

use crate::paths::SignaloPaths;

pub const HOST_ENV: &str = "SIGNALO_HOST";
pub const PORT_ENV: &str = "SIGNALO_PORT";

/// On-disk shape of config.toml; every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
struct FileConfig {
    host: Option<String>,
    port: Option<u16>,
}

/// Loads [`ApiConfig`] from the config file with environment overrides.
pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    /// Creates a storage reading the default path
    /// (~/.config/signalo/config.toml).
    pub fn new() -> Result<Self> {
        let path = SignaloPaths::config_file()
            .map_err(|e| SignaloError::config(format!("cannot resolve config path: {e}")))?;
        Ok(Self { path })
    }

    /// Creates a storage with a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads the configuration.
    ///
    /// A missing file is not an error; defaults apply. A present but
    /// unparsable file is a `Config` error.
    pub fn load(&self) -> Result<ApiConfig> {
        let host_env = env::var(HOST_ENV).ok();
        let port_env = env::var(PORT_ENV).ok();
        self.load_with_env(host_env, port_env)
    }

    fn load_with_env(&self, host_env: Option<String>, port_env: Option<String>) -> Result<ApiConfig> {
        let file = if self.path.exists() {
            let content = fs::read_to_string(&self.path)
                .map_err(|e| SignaloError::config(format!("cannot read config file: {e}")))?;
            toml::from_str::<FileConfig>(&content)?
        } else {
            FileConfig::default()
        };

        let mut config = ApiConfig::default();
        if let Some(host) = file.host {
            config.host = host;
        }
        if let Some(port) = file.port {
            config.port = port;
        }

        if let Some(host) = host_env {
            config.host = host;
        }
        if let Some(port) = port_env {
            config.port = port
                .parse()
                .map_err(|_| SignaloError::config(format!("{PORT_ENV} is not a valid port: {port}")))?;
        }

        Ok(config)
    }
}
