//! File system seam — discovery, reads and writes.
//!
//! The pipeline never touches the disk directly; it goes through
//! [`FileSystem`] so callers (and tests) can substitute their own.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

/// Discovery failed before producing any paths.
#[derive(Debug, Error)]
#[error("Invalid file pattern '{pattern}': {message}")]
pub struct DiscoveryError {
    pub pattern: String,
    pub message: String,
}

/// File access used by argument assembly and the banner pass.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Expand one glob pattern into matching paths, keeping those `filter` accepts.
    ///
    /// Paths come back in a stable order; the caller preserves it.
    fn expand(
        &self,
        pattern: &str,
        filter: &(dyn Fn(&Path) -> bool + Sync),
    ) -> Result<Vec<PathBuf>, DiscoveryError>;

    /// Read a whole file.
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replace a file's contents.
    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// True for Sass partials (`_mixins.scss`), which are never compiled on their own.
pub fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('_'))
}

/// Expand a list of patterns, skipping partials.
///
/// Patterns are applied in order. A pattern starting with `!` removes
/// earlier matches instead of adding; a path matched twice is kept once,
/// at its first position.
pub fn discover<F: FileSystem + ?Sized>(
    fs: &F,
    patterns: &[String],
) -> Result<Vec<PathBuf>, DiscoveryError> {
    let keep = |path: &Path| !is_partial(path);
    let mut found: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        if let Some(negated) = pattern.strip_prefix('!') {
            let excluded = fs.expand(negated, &|_: &Path| true)?;
            found.retain(|path| !excluded.contains(path));
            continue;
        }
        for path in fs.expand(pattern, &keep)? {
            if !found.contains(&path) {
                found.push(path);
            }
        }
    }

    tracing::debug!(patterns = ?patterns, matched = found.len(), "Expanded file patterns");
    Ok(found)
}

/// The real file system: `glob` for discovery, `tokio::fs` for I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

#[async_trait]
impl FileSystem for LocalFs {
    fn expand(
        &self,
        pattern: &str,
        filter: &(dyn Fn(&Path) -> bool + Sync),
    ) -> Result<Vec<PathBuf>, DiscoveryError> {
        let entries = glob::glob(pattern).map_err(|e| DiscoveryError {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) if filter(&path) => paths.push(path),
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!("Skipping unreadable match for '{}': {}", pattern, e);
                }
            }
        }
        Ok(paths)
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        tokio::fs::write(path, contents).await
    }
}
