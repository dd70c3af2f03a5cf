//! Config script builder — materializes script-only options as a temporary `config.rb`.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::TempPath;

use crate::args::classifier::ClassifiedOptions;
use crate::args::error::ArgsError;
use crate::args::{is_truthy, Options};

/// Where temporary scripts are created.
#[derive(Debug, Clone, Default)]
pub struct ScriptSettings {
    /// Directory for the script; the system temp dir when `None`.
    pub dir: Option<PathBuf>,
}

/// A temporary config script on disk.
///
/// The file is deleted when this guard is dropped, so keep it alive until
/// the Compass process has exited.
#[derive(Debug)]
pub struct ConfigScript {
    path: TempPath,
}

impl ConfigScript {
    /// Path passed to Compass as `--config`.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the script now, reporting any failure instead of ignoring it.
    pub fn close(self) -> io::Result<()> {
        self.path.close()
    }
}

/// Reject option combinations that cannot be expressed together.
///
/// `original` is the option map as the user wrote it, before classification.
pub fn check_conflicts(classified: &ClassifiedOptions, original: &Options) -> Result<(), ArgsError> {
    let has_config = original.get("config").is_some_and(is_truthy);

    if has_config && original.get("raw").is_some_and(is_truthy) {
        return Err(ArgsError::RawWithConfig);
    }

    if has_config && !classified.consumed_keys.is_empty() {
        return Err(ArgsError::ConfigWithRawOptions {
            keys: classified.consumed_keys.clone(),
        });
    }

    Ok(())
}

/// Write the classified script text to a fresh temporary file.
///
/// Returns `None` without touching the disk when there is nothing to write.
pub async fn build_script(
    classified: &ClassifiedOptions,
    original: &Options,
    settings: &ScriptSettings,
) -> Result<Option<ConfigScript>, ArgsError> {
    check_conflicts(classified, original)?;

    if !classified.needs_script() {
        tracing::debug!("No script-only options, skipping config script");
        return Ok(None);
    }

    let raw = classified.raw_text.clone();
    let dir = settings.dir.clone();
    let created = tokio::task::spawn_blocking(move || write_script(&raw, dir.as_deref()))
        .await
        .unwrap_or_else(|join| Err(io::Error::other(join)));

    let path = created.map_err(|source| ArgsError::ScriptCreation {
        dir: settings.dir.clone(),
        source,
    })?;

    tracing::debug!(path = %path.display(), bytes = classified.raw_text.len(), "Wrote config script");
    Ok(Some(ConfigScript { path }))
}

fn write_script(raw: &str, dir: Option<&Path>) -> io::Result<TempPath> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("compass-").suffix(".rb");

    let mut file = match dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    file.write_all(raw.as_bytes())?;
    file.flush()?;

    Ok(file.into_temp_path())
}
