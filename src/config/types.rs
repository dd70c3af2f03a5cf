use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::args::Options;

/// Root of a task file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFile {
    /// Task-level options shared by every target.
    #[serde(default)]
    pub options: Options,
    /// Named targets; their options override the task-level ones.
    #[serde(default)]
    pub targets: BTreeMap<String, Target>,
    #[serde(default)]
    pub settings: RunSettings,
}

/// A named set of option overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Target {
    #[serde(default)]
    pub options: Options,
}

/// How the runner behaves, independent of Compass options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSettings {
    /// Directory for temporary config scripts (default: system temp dir).
    #[serde(default)]
    pub script_dir: Option<PathBuf>,
    /// Force `--boring` even when colors are available.
    #[serde(default)]
    pub no_color: bool,
}
