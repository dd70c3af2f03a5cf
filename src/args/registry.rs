//! Option registry — single source of truth for how each option is handled.

/// How a configuration option reaches Compass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawOptionKind {
    /// Path-like setting written as `name = 'value'` in the config script.
    AssignString,
    /// `asset_cache_buster` — only `false` is representable, as `:none`.
    CacheBusterToggle,
    /// `sprite_load_path` — one `name << "entry"` line per entry.
    AppendLoadPath,
    /// Not a script option; left for the command line.
    Passthrough,
}

/// A single script-only option definition.
#[derive(Debug, Clone, Copy)]
pub struct RawOptionDef {
    /// Canonical snake-case name as Compass spells it in `config.rb`.
    pub name: &'static str,
    pub kind: RawOptionKind,
}

const fn assign(name: &'static str) -> RawOptionDef {
    RawOptionDef {
        name,
        kind: RawOptionKind::AssignString,
    }
}

/// Options the Compass CLI has no flag for.
pub static RAW_OPTIONS: &[RawOptionDef] = &[
    assign("css_path"),
    assign("http_stylesheets_path"),
    assign("sass_path"),
    assign("images_path"),
    assign("http_images_path"),
    assign("generated_images_dir"),
    assign("generated_images_path"),
    assign("http_generated_images_path"),
    assign("javascripts_path"),
    assign("http_javascripts_path"),
    assign("fonts_path"),
    assign("http_fonts_path"),
    assign("http_fonts_dir"),
    assign("extensions_dir"),
    assign("extension_path"),
    assign("cache_dir"),
    RawOptionDef {
        name: "asset_cache_buster",
        kind: RawOptionKind::CacheBusterToggle,
    },
    RawOptionDef {
        name: "sprite_load_path",
        kind: RawOptionKind::AppendLoadPath,
    },
];

/// Task-level keys that never become `--flags`.
///
/// They either pick the subcommand and executable, or are emitted as
/// positionals after the `--` separator.
pub static CLI_EXCLUDED: &[&str] = &["raw", "clean", "bundleExec", "basePath", "specify", "watch"];

/// Look up the handler for a canonical (snake-case) option name.
pub fn raw_option_kind(canonical: &str) -> RawOptionKind {
    RAW_OPTIONS
        .iter()
        .find(|def| def.name == canonical)
        .map(|def| def.kind)
        .unwrap_or(RawOptionKind::Passthrough)
}

/// `httpFontsPath` → `http_fonts_path`.
///
/// An underscore goes between a lowercase ASCII letter and the uppercase
/// letter after it; everything is then lowercased. Runs of capitals are
/// not split (`cacheDIR` → `cache_dir`).
pub fn canonical_name(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev_lower = false;
    for c in key.chars() {
        if prev_lower && c.is_ascii_uppercase() {
            out.push('_');
        }
        prev_lower = c.is_ascii_lowercase();
        out.extend(c.to_lowercase());
    }
    out
}

/// `outputStyle` → `output-style`, the way config keys become long flags.
///
/// Every uppercase ASCII letter gets a leading `-`.
pub fn flag_name(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_name_splits_camel_case() {
        assert_eq!(canonical_name("httpFontsPath"), "http_fonts_path");
        assert_eq!(canonical_name("cssPath"), "css_path");
        assert_eq!(canonical_name("css_path"), "css_path");
        assert_eq!(canonical_name("cacheDIR"), "cache_dir");
    }

    #[test]
    fn flag_name_is_kebab_case() {
        assert_eq!(flag_name("outputStyle"), "output-style");
        assert_eq!(flag_name("force"), "force");
        assert_eq!(flag_name("noLineComments"), "no-line-comments");
    }

    #[test]
    fn lookup_falls_back_to_passthrough() {
        assert_eq!(raw_option_kind("css_path"), RawOptionKind::AssignString);
        assert_eq!(
            raw_option_kind("asset_cache_buster"),
            RawOptionKind::CacheBusterToggle
        );
        assert_eq!(
            raw_option_kind("sprite_load_path"),
            RawOptionKind::AppendLoadPath
        );
        assert_eq!(raw_option_kind("output_style"), RawOptionKind::Passthrough);
    }
}
