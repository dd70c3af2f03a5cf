use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use compass_task::args::{self, Assembly, GlobalFlags, ScriptSettings};
use compass_task::config::TaskFile;
use compass_task::fs::LocalFs;
use compass_task::runner::{self, RunOutcome};

#[derive(Debug, Parser)]
#[command(name = "compass-task", version, about = "Run Compass from a declarative task file")]
struct Cli {
    /// Task file (TOML, or JSON by extension).
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Run only this target instead of all of them.
    #[arg(short, long, global = true)]
    target: Option<String>,

    /// Pass `--boring` to Compass.
    #[arg(long, global = true)]
    no_color: bool,

    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Print the command and config script without running anything.
    Plan,
    /// Run Compass, then write banners.
    Run,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();
}

/// Which targets to run: the requested one, every target, or the bare task options.
fn selected_targets(task: &TaskFile, requested: Option<&str>) -> Vec<Option<String>> {
    match requested {
        Some(name) => vec![Some(name.to_string())],
        None if task.targets.is_empty() => vec![None],
        None => task
            .target_names()
            .into_iter()
            .map(|name| Some(name.to_string()))
            .collect(),
    }
}

fn label(target: &Option<String>) -> &str {
    target.as_deref().unwrap_or("default")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let path = cli.file.clone().unwrap_or_else(TaskFile::default_path);
    let task = TaskFile::load(&path).with_context(|| format!("Cannot load {}", path.display()))?;

    let mut flags = GlobalFlags::from_env();
    flags.no_color |= cli.no_color || task.settings.no_color;
    let settings = ScriptSettings {
        dir: task.settings.script_dir.clone(),
    };
    let fs = Arc::new(LocalFs);

    for target in selected_targets(&task, cli.target.as_deref()) {
        let options = task.options_for(target.as_deref())?;
        let name = label(&target);

        match cli.command {
            CliCommand::Plan => {
                let plan = args::plan(options, &flags, fs.as_ref())
                    .with_context(|| format!("Target '{}'", name))?;
                println!("# target: {}", name);
                match &plan.assembly {
                    Assembly::Command(argv) => argv.iter().for_each(|arg| println!("{}", arg)),
                    Assembly::NoMatchingFiles { patterns } => {
                        println!("# nothing to run, no files match {}", patterns.join(", "))
                    }
                }
                if !plan.raw_text.is_empty() {
                    println!("# config script:");
                    print!("{}", plan.raw_text);
                }
                for dest in plan.banner.targets() {
                    println!("# banner: {}", dest.display());
                }
            }
            CliCommand::Run => {
                let prepared = args::prepare(options, &flags, fs.as_ref(), &settings)
                    .await
                    .with_context(|| format!("Target '{}'", name))?;
                match runner::run(prepared, Arc::clone(&fs)).await? {
                    RunOutcome::Skipped => {}
                    RunOutcome::Exited { status, .. } if !status.success() => {
                        tracing::error!(target_name = name, %status, "Compass failed");
                        std::process::exit(status.code().unwrap_or(1));
                    }
                    RunOutcome::Exited { .. } => {}
                }
            }
        }
    }

    Ok(())
}
