//! Source loading
//!
//! The compiler never touches the filesystem directly. Include expansion and
//! [`Compiler::compile_file`](crate::pipeline::Compiler::compile_file) go through
//! a [`SourceLoader`], which reads a file's text and maps an include target to a
//! canonical identity. Two includes refer to the same file exactly when their
//! identities are equal.

use crate::error::LoadError;
use rustc_hash::FxHashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub trait SourceLoader {
    /// Text of the file with identity `path`.
    fn read_file(&self, path: &str) -> Result<String, LoadError>;

    /// Identity of `target` as written in an include inside `source_file`.
    fn resolve_include_path(&self, source_file: &str, target: &str) -> Result<String, LoadError>;
}

/// Reads from disk. Identities are canonical paths when the file exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn read_file(&self, path: &str) -> Result<String, LoadError> {
        fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_string(),
            source,
        })
    }

    fn resolve_include_path(&self, source_file: &str, target: &str) -> Result<String, LoadError> {
        let direct = Path::new(target);
        let path = if direct.exists() {
            direct.to_path_buf()
        } else {
            Path::new(source_file)
                .parent()
                .map(|dir| dir.join(target))
                .unwrap_or_else(|| PathBuf::from(target))
        };

        let path = fs::canonicalize(&path).unwrap_or(path);
        Ok(path.to_string_lossy().into_owned())
    }
}

/// In-memory file set keyed by `/`-separated paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: FxHashMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.files.insert(normalize(&path.into()), text.into());
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(&normalize(path))
    }
}

impl SourceLoader for MemoryLoader {
    fn read_file(&self, path: &str) -> Result<String, LoadError> {
        self.files
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| LoadError::Missing(path.to_string()))
    }

    fn resolve_include_path(&self, source_file: &str, target: &str) -> Result<String, LoadError> {
        let direct = normalize(target);
        if self.files.contains_key(&direct) {
            return Ok(direct);
        }

        let relative = match source_file.rfind('/') {
            Some(slash) => normalize(&format!("{}/{}", &source_file[..slash], target)),
            None => direct,
        };
        if self.files.contains_key(&relative) {
            Ok(relative)
        } else {
            Err(LoadError::Missing(target.to_string()))
        }
    }
}

/// Collapse `.` and `..` segments and repeated slashes.
fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." if segments.last().is_some_and(|s| *s != "..") => {
                segments.pop();
            }
            ".." if absolute => {}
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}
