use crate::errors::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fs::File;
use std::io::Read;
use std::path::{Component, Path};

/// Directories that are never scanned, regardless of flags.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] =
    &[".git", "node_modules", "__pycache__", ".vscode", ".idea"];

/// How many bytes of a file are inspected to decide text vs. binary.
const SNIFF_LEN: u64 = 512;

/// Decides whether a path under the search root should be skipped.
///
/// The filter combines three rules, all additive (nothing re-includes a
/// path): dot-directories and the built-in tool directories are always
/// pruned, `old` directories are pruned unless explicitly included, and
/// user-supplied exclusion globs are matched against the root-relative
/// path. A glob with no separator and no wildcard also matches any single
/// path component, so `--exclude build` prunes a `build/` directory at any
/// depth.
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    globs: Option<GlobSet>,
    fragments: Vec<String>,
    include_old: bool,
}

impl ExclusionFilter {
    pub fn new(excludes: &[String], include_old: bool) -> Result<Self> {
        let mut fragments = Vec::new();
        let mut builder = GlobSetBuilder::new();
        let mut any_glob = false;
        for pattern in excludes {
            if !pattern.contains('/') && !pattern.contains('*') && !pattern.contains('?') {
                fragments.push(pattern.clone());
            }
            builder.add(Glob::new(pattern)?);
            any_glob = true;
        }
        let globs = if any_glob { Some(builder.build()?) } else { None };
        Ok(Self {
            globs,
            fragments,
            include_old,
        })
    }

    /// Returns true if the root-relative `path` should be skipped.
    ///
    /// `is_dir` describes the final component; every earlier component is a
    /// directory by construction.
    pub fn is_excluded(&self, path: &Path, is_dir: bool) -> bool {
        let components: Vec<&str> = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => name.to_str(),
                _ => None,
            })
            .collect();

        for (i, name) in components.iter().enumerate() {
            let treat_as_dir = i + 1 < components.len() || is_dir;
            if treat_as_dir && self.is_excluded_dir_name(name) {
                return true;
            }
            if self.fragments.iter().any(|f| f == name) {
                return true;
            }
        }

        if let Some(set) = &self.globs {
            if set.is_match(path) {
                return true;
            }
        }

        false
    }

    fn is_excluded_dir_name(&self, name: &str) -> bool {
        if name.len() > 1 && name.starts_with('.') && name != ".." {
            return true;
        }
        if DEFAULT_EXCLUDED_DIRS.contains(&name) {
            return true;
        }
        !self.include_old && name == "old"
    }
}

/// Decides whether a file's content is binary.
///
/// Classification peeks at a bounded prefix of the file, never the whole
/// content. With the `--binary` override set, every file classifies as
/// text.
#[derive(Debug, Clone, Copy)]
pub struct BinaryClassifier {
    allow_binary: bool,
}

impl BinaryClassifier {
    pub fn new(allow_binary: bool) -> Self {
        Self { allow_binary }
    }

    /// Returns true if `path` should be treated as non-text and excluded
    /// from content search and replace. Unreadable files classify as
    /// binary; the caller's per-file error path surfaces the read failure
    /// when it actually tries to use the content.
    pub fn is_binary(&self, path: &Path) -> bool {
        if self.allow_binary {
            return false;
        }
        sniff_binary(path)
    }
}

fn sniff_binary(path: &Path) -> bool {
    let Ok(file) = File::open(path) else {
        return true;
    };
    let mut prefix = Vec::with_capacity(SNIFF_LEN as usize);
    if file.take(SNIFF_LEN).read_to_end(&mut prefix).is_err() {
        return true;
    }
    content_inspector::inspect(&prefix).is_binary()
}
