//! Banner pass — prepends a fixed header to compiled CSS files.
//!
//! Targets are derived from the `specify` sources: the Sass directory is
//! swapped for the CSS directory and the Sass extension becomes `.css`.
//! Each file is rewritten independently; one failure does not stop the
//! others, and all failures are reported together once every file has
//! been attempted.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinSet;

use crate::args::{ArgsError, Platform};
use crate::fs::{discover, FileSystem};

/// A file the banner could not be written to.
#[derive(Debug, Error)]
#[error("{}: {source}", .path.display())]
pub struct BannerFailure {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Errors from applying a banner plan.
#[derive(Debug, Error)]
pub enum BannerError {
    /// One or more files could not be rewritten.
    #[error("Failed to write CSS banner to {} file(s): {}", .failures.len(), format_failures(.failures))]
    Apply { failures: Vec<BannerFailure> },
}

fn format_failures(failures: &[BannerFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Files that were given a banner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BannerReport {
    pub written: Vec<PathBuf>,
}

/// Which files get which banner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BannerPlan {
    banner: String,
    line_ending: &'static str,
    targets: Vec<PathBuf>,
}

impl BannerPlan {
    /// A plan that touches nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// Resolve banner targets from the `specify` patterns.
    ///
    /// Without a banner the plan is a no-op. A banner with `specify` unset
    /// is an error; a configured pattern list that matches nothing is a no-op.
    pub fn build<F: FileSystem + ?Sized>(
        banner: Option<&str>,
        patterns: Option<&[String]>,
        sass_dir: Option<&str>,
        css_dir: Option<&str>,
        platform: Platform,
        fs: &F,
    ) -> Result<Self, ArgsError> {
        let Some(banner) = banner.filter(|b| !b.is_empty()) else {
            return Ok(Self::none());
        };
        let Some(patterns) = patterns else {
            return Err(ArgsError::BannerWithoutSpecify);
        };

        let targets = discover(fs, patterns)?
            .iter()
            .map(|source| destination_path(source, sass_dir, css_dir))
            .collect();

        Ok(Self {
            banner: banner.to_string(),
            line_ending: platform.line_ending(),
            targets,
        })
    }

    pub fn is_noop(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn targets(&self) -> &[PathBuf] {
        &self.targets
    }

    /// Prepend the banner to every target, concurrently.
    pub async fn apply<F: FileSystem + 'static>(&self, fs: Arc<F>) -> Result<BannerReport, BannerError> {
        if self.is_noop() {
            return Ok(BannerReport::default());
        }

        tracing::debug!("Writing CSS banners.");
        let mut tasks = JoinSet::new();
        for target in &self.targets {
            let fs = Arc::clone(&fs);
            let path = target.clone();
            let header = format!("{}{}", self.banner, self.line_ending);
            tasks.spawn(async move {
                let result = prepend(fs.as_ref(), &path, header.as_bytes()).await;
                (path, result)
            });
        }

        let mut pending = self.targets.clone();
        let mut written = Vec::new();
        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (path, result) = match joined {
                Ok(done) => done,
                Err(err) => {
                    tracing::warn!("CSS banner task failed: {}", err);
                    continue;
                }
            };
            if let Some(index) = pending.iter().position(|p| *p == path) {
                pending.swap_remove(index);
            }
            match result {
                Ok(()) => {
                    tracing::debug!("Writing CSS banner for {}", path.display());
                    written.push(path);
                }
                Err(source) => {
                    tracing::warn!("Failed to write CSS banner for {}: {}", path.display(), source);
                    failures.push(BannerFailure { path, source });
                }
            }
        }

        // Whatever is still pending belongs to a task that died before reporting.
        failures.extend(pending.into_iter().map(|path| BannerFailure {
            path,
            source: io::Error::other("banner task did not complete"),
        }));

        if !failures.is_empty() {
            failures.sort_by(|a, b| a.path.cmp(&b.path));
            return Err(BannerError::Apply { failures });
        }

        written.sort();
        tracing::info!(files = written.len(), "Wrote CSS banners");
        Ok(BannerReport { written })
    }
}

async fn prepend<F: FileSystem + ?Sized>(fs: &F, path: &Path, header: &[u8]) -> io::Result<()> {
    let original = fs.read(path).await?;
    let mut contents = Vec::with_capacity(header.len() + original.len());
    contents.extend_from_slice(header);
    contents.extend_from_slice(&original);
    fs.write(path, &contents).await
}

/// Map a Sass source to the CSS file Compass writes for it.
///
/// The first occurrence of `sass_dir` is replaced by `css_dir` (skipped
/// unless both are set), then a trailing `.scss`, `.sass`, `.css.scss` or
/// `.css.sass` (any case) becomes `.css`.
pub fn destination_path(source: &Path, sass_dir: Option<&str>, css_dir: Option<&str>) -> PathBuf {
    let mut path = source.to_string_lossy().into_owned();
    if let (Some(from), Some(to)) = (sass_dir.filter(|d| !d.is_empty()), css_dir) {
        path = path.replacen(from, to, 1);
    }
    PathBuf::from(rewrite_extension(&path))
}

fn rewrite_extension(path: &str) -> String {
    let lower = path.to_ascii_lowercase();
    for suffix in [".css.scss", ".css.sass", ".scss", ".sass"] {
        if lower.ends_with(suffix) {
            return format!("{}.css", &path[..path.len() - suffix.len()]);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sass_extensions_become_css() {
        assert_eq!(rewrite_extension("a/b.scss"), "a/b.css");
        assert_eq!(rewrite_extension("a/b.SASS"), "a/b.css");
        assert_eq!(rewrite_extension("a/b.css.scss"), "a/b.css");
        assert_eq!(rewrite_extension("a/b.css.Sass"), "a/b.css");
        assert_eq!(rewrite_extension("a/b.less"), "a/b.less");
    }

    #[test]
    fn only_first_directory_occurrence_is_replaced() {
        let dest = destination_path(Path::new("src/src/x.scss"), Some("src"), Some("dist"));
        assert_eq!(dest, PathBuf::from("dist/src/x.css"));
    }

    #[test]
    fn missing_dirs_leave_path_alone() {
        let dest = destination_path(Path::new("src/x.scss"), None, Some("dist"));
        assert_eq!(dest, PathBuf::from("src/x.css"));
    }
}
