//! Startup configuration.
//!
//! Loaded once in `main` from `gatepost.yaml` (path overridable via
//! `GATEPOST_CONFIG`). A missing file is not an error: defaults apply and
//! a default file is written next to the binary so operators have
//! something to edit. `GATEPOST_PORT` overrides the configured port.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_FILE: &str = "gatepost.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080, listen: "0.0.0.0".to_owned() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    /// Directory for the SQLite database.
    pub data_dir: PathBuf,
    /// Built SPA assets served at `/`.
    pub dist_dir: PathBuf,
    /// Settings-cache reload period in seconds; 0 disables the reloader.
    pub reload_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            data_dir: PathBuf::from("data"),
            dist_dir: PathBuf::from("web/dist"),
            reload_interval_secs: 300,
        }
    }
}

impl Config {
    /// Load from the given path, or the `GATEPOST_CONFIG` env var, or
    /// `gatepost.yaml`. Writes a default file when none exists.
    ///
    /// # Errors
    ///
    /// Returns an error only for an unreadable or malformed existing file.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = explicit_path.map_or_else(
            || PathBuf::from(std::env::var("GATEPOST_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_owned())),
            Path::to_path_buf,
        );

        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .map_err(|source| ConfigError::Read { path: path.clone(), source })?;
            serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse { path: path.clone(), source })?
        } else {
            let config = Self::default();
            match serde_yaml::to_string(&config) {
                Ok(yaml) => {
                    if let Err(e) = std::fs::write(&path, yaml) {
                        tracing::warn!(path = %path.display(), error = %e, "could not write default config");
                    } else {
                        tracing::info!(path = %path.display(), "wrote default config");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "could not serialize default config"),
            }
            config
        };

        if let Some(port) = std::env::var("GATEPOST_PORT").ok().and_then(|v| v.parse::<u16>().ok()) {
            config.server.port = port;
        }

        Ok(config)
    }

    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.listen, self.server.port)
    }

    #[must_use]
    pub fn reload_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.reload_interval_secs)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
