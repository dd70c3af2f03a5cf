use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::args::Options;
use crate::config::types::TaskFile;

/// Errors that can occur when loading a task file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read task file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse task file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to parse task file '{path}': {source}")]
    JsonParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Task file validation failed: {message}")]
    ValidationError { message: String },
}

/// Syntax of a task file, picked from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFormat {
    Toml,
    Json,
}

impl TaskFormat {
    /// `.json` files are JSON; everything else is TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => TaskFormat::Json,
            _ => TaskFormat::Toml,
        }
    }
}

impl TaskFile {
    /// File name looked up in the working directory when none is given.
    pub const DEFAULT_FILE: &'static str = "compass.toml";

    /// Returns the path to the task file in the current directory.
    pub fn default_path() -> PathBuf {
        PathBuf::from(Self::DEFAULT_FILE)
    }

    /// Loads and validates a task file.
    ///
    /// - Missing or unreadable files are an error; there is no implicit default.
    /// - The format follows the extension (see [`TaskFormat`]).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let task: TaskFile = match TaskFormat::from_path(path) {
            TaskFormat::Toml => toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?,
            TaskFormat::Json => {
                serde_json::from_str(&content).map_err(|e| ConfigError::JsonParseError {
                    path: path.to_path_buf(),
                    source: e,
                })?
            }
        };

        task.validate()?;
        tracing::debug!(path = %path.display(), targets = task.targets.len(), "Loaded task file");
        Ok(task)
    }

    /// Validates the task file.
    ///
    /// Checks:
    /// - Target names are not blank
    /// - No option key is blank
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(name) = self.targets.keys().find(|name| name.trim().is_empty()) {
            return Err(ConfigError::ValidationError {
                message: format!("Target name '{}' is blank", name),
            });
        }

        let scopes = std::iter::once(("task options", &self.options)).chain(
            self.targets
                .iter()
                .map(|(name, target)| (name.as_str(), &target.options)),
        );
        for (scope, options) in scopes {
            if options.keys().any(|key| key.trim().is_empty()) {
                return Err(ConfigError::ValidationError {
                    message: format!("Blank option name in '{}'", scope),
                });
            }
        }

        Ok(())
    }

    /// Target names, alphabetically.
    pub fn target_names(&self) -> Vec<&str> {
        self.targets.keys().map(String::as_str).collect()
    }

    /// Options for one run: task-level options overlaid with the target's.
    ///
    /// Overridden keys keep their task-level position; new keys are
    /// appended in the target's order.
    pub fn options_for(&self, target: Option<&str>) -> Result<Options, ConfigError> {
        let mut options = self.options.clone();

        if let Some(name) = target {
            let target = self
                .targets
                .get(name)
                .ok_or_else(|| ConfigError::ValidationError {
                    message: format!("Target '{}' not found in task file", name),
                })?;
            for (key, value) in &target.options {
                options.insert(key.clone(), value.clone());
            }
        }

        Ok(options)
    }
}
