//! Pipeline — ties all option processing stages together.

use std::path::Path;

use crate::args::assembler::{assemble, Assembly};
use crate::args::classifier::{classify, ClassifiedOptions};
use crate::args::error::ArgsError;
use crate::args::script::{build_script, check_conflicts, ConfigScript, ScriptSettings};
use crate::args::{pattern_list, string_option, GlobalFlags, Options};
use crate::banner::BannerPlan;
use crate::fs::FileSystem;

/// Stand-in for the script path in dry runs.
const PLANNED_SCRIPT_PATH: &str = "<temporary config script>";

/// Everything needed to run Compass once.
///
/// `script` must stay alive until the Compass process exits; dropping it
/// deletes the file.
#[derive(Debug)]
pub struct Prepared {
    pub assembly: Assembly,
    pub script: Option<ConfigScript>,
    pub banner: BannerPlan,
}

/// A dry run: what would be executed and written, without creating files.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub assembly: Assembly,
    /// Contents the config script would have; empty when none is needed.
    pub raw_text: String,
    pub banner: BannerPlan,
}

/// Stages shared by [`prepare`] and [`plan`]: everything up to the script.
struct Staged {
    original: Options,
    classified: ClassifiedOptions,
    banner: BannerPlan,
}

fn stage<F: FileSystem + ?Sized>(
    mut options: Options,
    flags: &GlobalFlags,
    fs: &F,
) -> Result<Staged, ArgsError> {
    // Stage 1: Take the banner out, it is never a Compass flag
    let banner = string_option(&options, "banner")?;
    options.shift_remove("banner");
    let original = options.clone();

    // Stage 2: Classify options
    let classified = classify(options)?;
    check_conflicts(&classified, &original)?;

    // Stage 3: Resolve banner targets
    let banner = match banner {
        Some(banner) => BannerPlan::build(
            Some(&banner),
            pattern_list("specify", original.get("specify"))?.as_deref(),
            string_option(&original, "sassDir")?.as_deref(),
            string_option(&original, "cssDir")?.as_deref(),
            flags.platform,
            fs,
        )?,
        None => BannerPlan::none(),
    };

    Ok(Staged {
        original,
        classified,
        banner,
    })
}

/// Build the Compass invocation from task options.
///
/// This is the main entry point for the option pipeline. Configuration
/// conflicts are reported before anything is written to disk.
///
/// # Arguments
///
/// * `options` - Task options as written by the user
/// * `flags` - Color and platform settings of the invoking environment
/// * `fs` - File discovery used for `specify`
/// * `settings` - Where to create the temporary config script
pub async fn prepare<F: FileSystem + ?Sized>(
    options: Options,
    flags: &GlobalFlags,
    fs: &F,
    settings: &ScriptSettings,
) -> Result<Prepared, ArgsError> {
    let staged = stage(options, flags, fs)?;

    // Stage 4: Write config script
    let script = build_script(&staged.classified, &staged.original, settings).await?;

    // Stage 5: Assemble arguments
    let assembly = assemble(
        staged.classified.remaining,
        script.as_ref().map(ConfigScript::path),
        flags,
        fs,
    )?;

    Ok(Prepared {
        assembly,
        script,
        banner: staged.banner,
    })
}

/// Same as [`prepare`] but writes nothing.
///
/// The script path in the argv is a placeholder when a script would be needed.
pub fn plan<F: FileSystem + ?Sized>(
    options: Options,
    flags: &GlobalFlags,
    fs: &F,
) -> Result<Plan, ArgsError> {
    let staged = stage(options, flags, fs)?;
    let raw_text = staged.classified.raw_text;
    let script = (!raw_text.is_empty()).then(|| Path::new(PLANNED_SCRIPT_PATH));

    let assembly = assemble(staged.classified.remaining, script, flags, fs)?;

    Ok(Plan {
        assembly,
        raw_text,
        banner: staged.banner,
    })
}
