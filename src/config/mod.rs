use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{ErrorCode, Result, StreamError};

/// Capacity of a stream buffer when nothing else is configured
pub const DEFAULT_BUFFER_CAPACITY: usize = 4096;

/// Shell used to interpret process stream command lines
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Location of the per-user config file, if a home directory exists
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "streamio").map(|dirs| dirs.config_dir().join("config.toml"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Bytes held by each stream buffer; fixed for the stream's lifetime.
    pub buffer_capacity: usize,
    pub shell: PathBuf,
    pub log_level: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            shell: PathBuf::from(DEFAULT_SHELL),
            log_level: "info".to_string(),
        }
    }
}

impl StreamConfig {
    /// Load defaults, then the config file, then environment overrides.
    ///
    /// An explicit `path` must exist; the default per-user file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.merge_env_vars();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading stream config from {}", path.display());
        let contents = fs::read_to_string(path).map_err(|e| {
            StreamError::config_with_code(
                ErrorCode::CONFIG_NOT_FOUND,
                format!("cannot read {}: {}", path.display(), e),
            )
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| {
            StreamError::config_with_code(ErrorCode::CONFIG_PARSE_ERROR, e.to_string())
        })
    }

    pub fn merge_env_vars(&mut self) {
        self.merge_env_from(|key| std::env::var(key).ok());
    }

    /// Apply `STREAMIO_*` overrides from an arbitrary lookup.
    pub fn merge_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(size) = lookup("STREAMIO_BUFFER_SIZE") {
            match size.parse::<usize>() {
                Ok(value) => self.buffer_capacity = value,
                Err(_) => warn!("Ignoring unparsable STREAMIO_BUFFER_SIZE={:?}", size),
            }
        }

        if let Some(shell) = lookup("STREAMIO_SHELL") {
            self.shell = PathBuf::from(shell);
        }

        if let Some(level) = lookup("STREAMIO_LOG_LEVEL") {
            self.log_level = level;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.buffer_capacity == 0 {
            return Err(StreamError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                "buffer_capacity must be at least 1 byte",
            ));
        }
        if self.shell.as_os_str().is_empty() {
            return Err(StreamError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                "shell must not be empty",
            ));
        }
        Ok(())
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests;
