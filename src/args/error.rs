//! Errors raised while turning options into a Compass invocation.

use std::path::PathBuf;

use thiserror::Error;

use crate::fs::DiscoveryError;

/// Errors that can occur while building a Compass command.
///
/// Every configuration variant names the offending option(s) so the
/// message is actionable without a stack trace.
#[derive(Debug, Error)]
pub enum ArgsError {
    /// An option value had the wrong shape for where it ends up.
    #[error("Option `{option}` must be {expected}")]
    InvalidOptionValue {
        option: String,
        expected: &'static str,
    },

    /// `raw` and `config` both given.
    #[error("The options `raw` and `config` are mutually exclusive")]
    RawWithConfig,

    /// Script-only options given alongside an external config file.
    #[error("The option `config` cannot be combined with these options: {}.", .keys.join(", "))]
    ConfigWithRawOptions { keys: Vec<String> },

    /// `banner` needs `specify` to know which files to touch.
    #[error("You can only use the `banner` option in combination with `specify`.")]
    BannerWithoutSpecify,

    /// The temporary config script could not be created or written.
    #[error("Failed to write temporary config script{}: {source}", dir_suffix(.dir))]
    ScriptCreation {
        dir: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    /// A `specify` pattern was rejected by the file system.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
}

fn dir_suffix(dir: &Option<PathBuf>) -> String {
    match dir {
        Some(dir) => format!(" in '{}'", dir.display()),
        None => String::new(),
    }
}

impl ArgsError {
    /// True for errors caused by the user's options rather than the environment.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ArgsError::InvalidOptionValue { .. }
                | ArgsError::RawWithConfig
                | ArgsError::ConfigWithRawOptions { .. }
                | ArgsError::BannerWithoutSpecify
        )
    }
}
