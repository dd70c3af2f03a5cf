//! Runs a prepared Compass command and the banner pass after it.
//!
//! The child is spawned once with inherited stdio. Its exit status is
//! handed back untouched; deciding what a non-zero status means is up to
//! the caller.

use std::io;
use std::process::ExitStatus;
use std::sync::Arc;

use thiserror::Error;
use tokio::process::Command;

use crate::args::{Assembly, Prepared};
use crate::banner::{BannerError, BannerReport};
use crate::fs::FileSystem;

/// Errors that can occur while running Compass.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Failed to start '{program}'{}: {source}", install_hint(.source))]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed waiting for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Banner(#[from] BannerError),
}

fn install_hint(source: &io::Error) -> &'static str {
    if source.kind() == io::ErrorKind::NotFound {
        " (you need to have Ruby and Compass installed and in your PATH)"
    } else {
        ""
    }
}

/// What happened to a prepared run.
#[derive(Debug)]
pub enum RunOutcome {
    /// `specify` matched nothing; no process was started.
    Skipped,
    /// Compass ran; the banner pass only runs after a successful exit.
    Exited {
        status: ExitStatus,
        banner: Option<BannerReport>,
    },
}

/// Spawn Compass, wait for it, then apply the banner plan on success.
///
/// The config script (if any) lives until the child has exited.
pub async fn run<F: FileSystem + 'static>(
    prepared: Prepared,
    fs: Arc<F>,
) -> Result<RunOutcome, RunError> {
    let Prepared {
        assembly,
        script,
        banner,
    } = prepared;

    let args = match assembly {
        Assembly::Command(args) => args,
        Assembly::NoMatchingFiles { .. } => return Ok(RunOutcome::Skipped),
    };
    let Some((program, rest)) = args.split_first() else {
        return Ok(RunOutcome::Skipped);
    };

    tracing::info!("Running {} {}", program, rest.join(" "));
    let mut child = Command::new(program)
        .args(rest)
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| RunError::Spawn {
            program: program.clone(),
            source,
        })?;

    let status = child.wait().await.map_err(|source| RunError::Wait {
        program: program.clone(),
        source,
    })?;

    if let Some(script) = script {
        if let Err(e) = script.close() {
            tracing::warn!("Failed to remove temporary config script: {}", e);
        }
    }

    if !status.success() {
        tracing::debug!(?status, "Compass exited unsuccessfully, skipping banners");
        return Ok(RunOutcome::Exited {
            status,
            banner: None,
        });
    }

    let report = banner.apply(fs).await?;
    Ok(RunOutcome::Exited {
        status,
        banner: Some(report),
    })
}
