//! Argument assembler — remaining options → Compass argv.

use std::path::Path;

use serde_json::{Number, Value};

use crate::args::error::ArgsError;
use crate::args::registry::{flag_name, CLI_EXCLUDED};
use crate::args::{is_truthy, pattern_list, string_option, GlobalFlags, Options};
use crate::fs::{discover, FileSystem};

/// Compass subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Compile,
    Clean,
    Watch,
}

impl Mode {
    /// `clean` wins over `watch`; `compile` otherwise.
    pub fn from_options(options: &Options) -> Self {
        let set = |key: &str| options.get(key).is_some_and(is_truthy);
        if set("clean") {
            Mode::Clean
        } else if set("watch") {
            Mode::Watch
        } else {
            Mode::Compile
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Compile => "compile",
            Mode::Clean => "clean",
            Mode::Watch => "watch",
        }
    }
}

/// Outcome of assembling a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assembly {
    /// Full argv; `argv[0]` is the program to run.
    Command(Vec<String>),
    /// `specify` matched nothing, so there is nothing to run.
    NoMatchingFiles { patterns: Vec<String> },
}

impl Assembly {
    pub fn args(&self) -> Option<&[String]> {
        match self {
            Assembly::Command(args) => Some(args),
            Assembly::NoMatchingFiles { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Separator {
    Pending,
    Inserted,
}

/// Builder for the argv handed to the Compass process.
#[derive(Debug, Clone)]
struct ArgAssembler {
    args: Vec<String>,
    separator: Separator,
}

impl ArgAssembler {
    /// Executable prefix and subcommand.
    fn new(mode: Mode, bundle_exec: bool, flags: &GlobalFlags) -> Self {
        let mut args = Vec::new();
        if bundle_exec {
            args.push(flags.platform.executable("bundle"));
            args.push("exec".to_string());
        }
        args.push(flags.platform.executable("compass"));
        args.push(mode.as_str().to_string());

        Self {
            args,
            separator: Separator::Pending,
        }
    }

    /// Converted flags, in option order.
    fn with_options(mut self, options: &Options) -> Self {
        for (key, value) in options {
            push_flag(&mut self.args, key, value);
        }
        self
    }

    fn with_color(mut self, no_color: bool) -> Self {
        if no_color {
            self.args.push("--boring".into());
        }
        self
    }

    /// Append a positional, preceded by `--` the first time.
    fn push_positional(&mut self, value: String) {
        if self.separator == Separator::Pending {
            self.args.push("--".into());
            self.separator = Separator::Inserted;
        }
        self.args.push(value);
    }

    fn build(self) -> Vec<String> {
        self.args
    }
}

/// Integral floats print without a fraction, so `2.0` is passed as `2`.
fn number_arg(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 => {
            // `+ 0.0` folds `-0` into `0`.
            format!("{:.0}", f + 0.0)
        }
        _ => n.to_string(),
    }
}

/// `key: value` → zero or more CLI tokens.
fn push_flag(args: &mut Vec<String>, key: &str, value: &Value) {
    let flag = format!("--{}", flag_name(key));
    match value {
        Value::Bool(true) => args.push(flag),
        Value::String(s) => {
            args.push(flag);
            args.push(s.clone());
        }
        Value::Number(n) => {
            args.push(flag);
            args.push(number_arg(n));
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::String(s) => {
                        args.push(flag.clone());
                        args.push(s.clone());
                    }
                    Value::Number(n) => {
                        args.push(flag.clone());
                        args.push(number_arg(n));
                    }
                    _ => {}
                }
            }
        }
        // Disabled flags and nested tables have no CLI form.
        Value::Bool(false) | Value::Null | Value::Object(_) => {}
    }
}

/// Build the Compass argv from classified options.
///
/// `options` is consumed: the task-level keys in [`CLI_EXCLUDED`] are taken
/// out, and when `script` is given its path becomes the `config` option.
pub fn assemble<F: FileSystem + ?Sized>(
    mut options: Options,
    script: Option<&Path>,
    flags: &GlobalFlags,
    fs: &F,
) -> Result<Assembly, ArgsError> {
    let mode = Mode::from_options(&options);
    let bundle_exec = options.get("bundleExec").is_some_and(is_truthy);

    if let Some(script) = script {
        options.insert("config".into(), Value::String(script.display().to_string()));
    }

    let base_path = string_option(&options, "basePath")?;
    let patterns = pattern_list("specify", options.get("specify"))?;

    for key in CLI_EXCLUDED {
        options.shift_remove(*key);
    }

    let mut assembler = ArgAssembler::new(mode, bundle_exec, flags)
        .with_options(&options)
        .with_color(flags.no_color);

    if let Some(base_path) = base_path {
        assembler.push_positional(base_path);
    }

    if let Some(patterns) = patterns {
        let files = discover(fs, &patterns)?;
        if files.is_empty() {
            tracing::info!("`specify` option used, but no files were found.");
            return Ok(Assembly::NoMatchingFiles { patterns });
        }
        for file in files {
            assembler.push_positional(file.display().to_string());
        }
    }

    let args = assembler.build();
    tracing::debug!(?args, "Assembled compass command");
    Ok(Assembly::Command(args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flags_for(value: Value) -> Vec<String> {
        let mut args = Vec::new();
        push_flag(&mut args, "outputStyle", &value);
        args
    }

    #[test]
    fn scalar_values_become_flag_and_value() {
        assert_eq!(flags_for(json!("compressed")), vec!["--output-style", "compressed"]);
        assert_eq!(flags_for(json!(3)), vec!["--output-style", "3"]);
        assert_eq!(flags_for(json!(2.5)), vec!["--output-style", "2.5"]);
        assert_eq!(flags_for(json!(true)), vec!["--output-style"]);
    }

    #[test]
    fn disabled_and_nested_values_are_dropped() {
        assert!(flags_for(json!(false)).is_empty());
        assert!(flags_for(json!(null)).is_empty());
        assert!(flags_for(json!({"a": 1})).is_empty());
    }

    #[test]
    fn integral_floats_drop_the_fraction() {
        assert_eq!(flags_for(json!(2.0)), vec!["--output-style", "2"]);
        assert_eq!(flags_for(json!(-0.0)), vec!["--output-style", "0"]);
        assert_eq!(
            flags_for(json!([1.0, 1.5])),
            vec!["--output-style", "1", "--output-style", "1.5"]
        );
    }

    #[test]
    fn list_values_repeat_the_flag() {
        assert_eq!(
            flags_for(json!(["a", "b"])),
            vec!["--output-style", "a", "--output-style", "b"]
        );
    }

    #[test]
    fn separator_is_inserted_once() {
        let flags = GlobalFlags {
            no_color: false,
            platform: crate::args::Platform::Posix,
        };
        let mut assembler = ArgAssembler::new(Mode::Compile, false, &flags);
        assembler.push_positional("a".into());
        assembler.push_positional("b".into());
        assert_eq!(assembler.build(), vec!["compass", "compile", "--", "a", "b"]);
    }
}
