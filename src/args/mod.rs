//! Option handling pipeline for compass-task.
//!
//! This module turns a task's option map into everything needed to run Compass:
//!
//! ```text
//! Options → Classify → Config script → Assemble → argv
//! ```
//!
//! Classification and assembly are pure functions over an owned [`Options`]
//! map; only the config script and file discovery touch the outside world.

mod assembler;
mod classifier;
mod error;
mod pipeline;
mod registry;
mod script;

pub use assembler::{assemble, Assembly, Mode};
pub use classifier::{classify, ClassifiedOptions};
pub use error::ArgsError;
pub use pipeline::{plan, prepare, Plan, Prepared};
pub use registry::{
    canonical_name, flag_name, raw_option_kind, RawOptionDef, RawOptionKind, CLI_EXCLUDED,
    RAW_OPTIONS,
};
pub use script::{build_script, check_conflicts, ConfigScript, ScriptSettings};

use serde_json::Value;

/// Task options keyed by camelCase name, in the order they were written.
pub type Options = serde_json::Map<String, Value>;

/// Platform the Compass command will run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Executables are invoked through their `.bat` shims.
    Windows,
    Posix,
}

impl Platform {
    /// The platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }

    /// Invocation name for a Ruby executable (`compass` → `compass.bat`).
    pub fn executable(self, name: &str) -> String {
        match self {
            Platform::Windows => format!("{}.bat", name),
            Platform::Posix => name.to_string(),
        }
    }

    /// Line terminator used when rewriting generated files.
    pub fn line_ending(self) -> &'static str {
        match self {
            Platform::Windows => "\r\n",
            Platform::Posix => "\n",
        }
    }
}

/// Settings that come from the invoking environment rather than the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalFlags {
    /// Colored output disabled; adds `--boring`.
    pub no_color: bool,
    pub platform: Platform,
}

impl GlobalFlags {
    /// Current platform, colors disabled when `NO_COLOR` is set and non-empty.
    pub fn from_env() -> Self {
        let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self {
            no_color,
            platform: Platform::current(),
        }
    }
}

impl Default for GlobalFlags {
    fn default() -> Self {
        Self {
            no_color: false,
            platform: Platform::current(),
        }
    }
}

/// Whether an option counts as "set": not null, false, zero or an empty string.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Read an option that must be a string when set.
pub(crate) fn string_option(options: &Options, key: &str) -> Result<Option<String>, ArgsError> {
    match options.get(key) {
        Some(value) if is_truthy(value) => match value {
            Value::String(s) => Ok(Some(s.clone())),
            _ => Err(ArgsError::InvalidOptionValue {
                option: key.to_string(),
                expected: "a string",
            }),
        },
        _ => Ok(None),
    }
}

/// Read an option holding one pattern or a list of patterns.
///
/// `None` when unset. A configured empty list stays `Some`.
pub(crate) fn pattern_list(
    key: &str,
    value: Option<&Value>,
) -> Result<Option<Vec<String>>, ArgsError> {
    let invalid = || ArgsError::InvalidOptionValue {
        option: key.to_string(),
        expected: "a pattern or a list of patterns",
    };

    match value {
        None => Ok(None),
        Some(value) if !is_truthy(value) => Ok(None),
        Some(Value::String(pattern)) => Ok(Some(vec![pattern.clone()])),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(String::from).ok_or_else(invalid))
            .collect::<Result<_, _>>()
            .map(Some),
        Some(_) => Err(invalid()),
    }
}
