//! Shared test utilities and an in-memory file system.

#![allow(dead_code, unused_imports)]

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use compass_task::args::{GlobalFlags, Options, Platform};
use compass_task::fs::{DiscoveryError, FileSystem};
use glob::{MatchOptions, Pattern};
use serde_json::Value;

/// Build an option map from a `json!` object literal.
pub fn options(value: Value) -> Options {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn posix() -> GlobalFlags {
    GlobalFlags {
        no_color: false,
        platform: Platform::Posix,
    }
}

pub fn windows() -> GlobalFlags {
    GlobalFlags {
        no_color: false,
        platform: Platform::Windows,
    }
}

/// File system held in memory; paths are matched with `/` as a literal separator.
#[derive(Default)]
pub struct MemoryFs {
    files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
    read_only: BTreeSet<PathBuf>,
    panics_on: BTreeSet<PathBuf>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// A file system with empty files at `paths`.
    pub fn with_files(paths: &[&str]) -> Self {
        let fs = Self::new();
        for path in paths {
            fs.insert(path, "");
        }
        fs
    }

    pub fn insert(&self, path: &str, contents: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(PathBuf::from(path), contents.as_bytes().to_vec());
    }

    /// Writes to `path` will fail with `PermissionDenied`.
    pub fn read_only(mut self, path: &str) -> Self {
        self.read_only.insert(PathBuf::from(path));
        self
    }

    /// Reads of `path` panic, killing the task doing the read.
    pub fn panics_on(mut self, path: &str) -> Self {
        self.panics_on.insert(PathBuf::from(path));
        self
    }

    pub fn contents(&self, path: &str) -> Option<String> {
        self.files
            .lock()
            .unwrap()
            .get(Path::new(path))
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

#[async_trait]
impl FileSystem for MemoryFs {
    fn expand(
        &self,
        pattern: &str,
        filter: &(dyn Fn(&Path) -> bool + Sync),
    ) -> Result<Vec<PathBuf>, DiscoveryError> {
        let compiled = Pattern::new(pattern).map_err(|e| DiscoveryError {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        let options = MatchOptions {
            require_literal_separator: true,
            ..MatchOptions::default()
        };

        Ok(self
            .files
            .lock()
            .unwrap()
            .keys()
            .filter(|path| compiled.matches_path_with(path, options) && filter(path))
            .cloned()
            .collect())
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        if self.panics_on.contains(path) {
            panic!("read of {} blew up", path.display());
        }
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        if self.read_only.contains(path) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        }
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }
}
