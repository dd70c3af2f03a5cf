//! Task file: Compass options, per-target overrides and runner settings.

mod loader;
mod types;

pub use loader::{ConfigError, TaskFormat};
pub use types::{RunSettings, Target, TaskFile};
