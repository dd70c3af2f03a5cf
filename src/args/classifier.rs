//! Option classifier — task options → script text + CLI options.

use serde_json::Value;

use crate::args::error::ArgsError;
use crate::args::registry::{canonical_name, raw_option_kind, RawOptionKind};
use crate::args::Options;

/// Result of classifying task options.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedOptions {
    /// Accumulated `config.rb` statements, seeded by the `raw` option.
    pub raw_text: String,
    /// Keys moved into `raw_text`, in the order they appeared.
    pub consumed_keys: Vec<String>,
    /// Options left for the command line.
    pub remaining: Options,
}

impl ClassifiedOptions {
    /// Whether a config script has to be written.
    pub fn needs_script(&self) -> bool {
        !self.raw_text.is_empty()
    }
}

/// Split script-only options out of `options`.
///
/// Script-only keys are removed and rendered into `raw_text`; every other
/// key, including `raw` itself, stays in `remaining` in its original order.
pub fn classify(mut options: Options) -> Result<ClassifiedOptions, ArgsError> {
    let mut raw_text = match options.get("raw") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => String::new(),
        Some(Value::String(raw)) => raw.clone(),
        Some(_) => {
            return Err(ArgsError::InvalidOptionValue {
                option: "raw".to_string(),
                expected: "a string",
            })
        }
    };

    let keys: Vec<String> = options.keys().cloned().collect();
    let mut consumed_keys = Vec::new();

    for key in keys {
        let name = canonical_name(&key);
        let kind = raw_option_kind(&name);
        let value = &options[&key];

        match kind {
            RawOptionKind::Passthrough => continue,
            RawOptionKind::AssignString => {
                let Value::String(value) = value else {
                    return Err(ArgsError::InvalidOptionValue {
                        option: key,
                        expected: "a string",
                    });
                };
                raw_text.push_str(&format!("{} = '{}'\n", name, value.replace('\'', "\\'")));
            }
            RawOptionKind::CacheBusterToggle => {
                // Inline Ruby blocks can't be expressed; only `false` maps to `:none`.
                if *value == Value::Bool(false) {
                    raw_text.push_str(&format!("{} :none\n", name));
                }
            }
            RawOptionKind::AppendLoadPath => {
                for entry in load_path_entries(&key, value)? {
                    raw_text.push_str(&format!("{} << \"{}\"\n", name, entry.replace('"', "\\\"")));
                }
            }
        }

        tracing::debug!(option = %key, "Moved option into config script");
        options.shift_remove(&key);
        consumed_keys.push(key);
    }

    Ok(ClassifiedOptions {
        raw_text,
        consumed_keys,
        remaining: options,
    })
}

/// Normalize a `spriteLoadPath` value to its entries.
fn load_path_entries<'a>(key: &str, value: &'a Value) -> Result<Vec<&'a str>, ArgsError> {
    let invalid = || ArgsError::InvalidOptionValue {
        option: key.to_string(),
        expected: "a string or a list of strings",
    };

    match value {
        Value::Null | Value::Bool(false) => Ok(Vec::new()),
        Value::String(s) if s.is_empty() => Ok(Vec::new()),
        Value::String(s) => Ok(vec![s.as_str()]),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().ok_or_else(invalid))
            .collect(),
        _ => Err(invalid()),
    }
}
