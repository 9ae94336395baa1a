//! JSON file configuration adapter.
//!
//! A missing file is not an error: the controller runs on defaults.  A file
//! that exists but does not parse or validate stops startup.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::info;

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;

/// Environment variable consulted when no path is given on the command line.
pub const CONFIG_ENV: &str = "SMARTBIN_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "smartbin.json";

pub struct FileConfigAdapter {
    path: PathBuf,
}

impl FileConfigAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// First CLI argument, else `$SMARTBIN_CONFIG`, else `smartbin.json`.
    pub fn resolve(cli_arg: Option<String>, env_value: Option<String>) -> Self {
        let path = cli_arg
            .or(env_value)
            .unwrap_or_else(|| String::from(DEFAULT_CONFIG_PATH));
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for FileConfigAdapter {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Config: {} not found, using defaults", self.path.display());
                return Ok(SystemConfig::default());
            }
            Err(e) => return Err(ConfigError::Io(format!("{}: {e}", self.path.display()))),
        };
        let config: SystemConfig = serde_json::from_str(&text)
            .map_err(|e| ConfigError::Corrupted(format!("{}: {e}", self.path.display())))?;
        config.validate().map_err(ConfigError::ValidationFailed)?;
        info!("Config: loaded {}", self.path.display());
        Ok(config)
    }
}
