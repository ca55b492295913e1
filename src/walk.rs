use crate::errors::Result;
use crate::filter::ExclusionFilter;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// One deterministic pass over the tree beneath a root.
///
/// Entries are sorted by file name, so the emitted sequence is stable for a
/// fixed filesystem snapshot. The exclusion filter prunes whole subtrees
/// inline; the optional type filter restricts which file names are
/// candidates. Every top-level operation builds its own `Walker` and
/// traverses independently.
pub struct Walker {
    root: PathBuf,
    filter: ExclusionFilter,
    types: Option<GlobSet>,
    include_dirs: bool,
}

impl Walker {
    pub fn new(
        root: &Path,
        filter: ExclusionFilter,
        types: &[String],
        include_dirs: bool,
    ) -> Result<Self> {
        Ok(Self {
            root: root.to_path_buf(),
            filter,
            types: build_type_set(types)?,
            include_dirs,
        })
    }

    /// Candidate entries: regular files, plus directories when the walker
    /// was built with directory inclusion (rename mode).
    pub fn entries(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.walk(self.include_dirs)
    }

    /// Candidate regular files only, regardless of the directory flag.
    /// Content passes use this.
    pub fn files(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.walk(false)
    }

    fn walk(&self, include_dirs: bool) -> impl Iterator<Item = PathBuf> + '_ {
        let mut builder = WalkBuilder::new(&self.root);
        // The exclusion rules here are this tool's own contract, not the
        // ignore-file stack.
        builder
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        let filter = self.filter.clone();
        let root = self.root.clone();
        builder.filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            let rel = entry.path().strip_prefix(&root).unwrap_or(entry.path());
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !filter.is_excluded(rel, is_dir)
        });

        builder.build().filter_map(move |result| {
            let entry = match result {
                Ok(entry) => entry,
                // A single inaccessible entry never aborts the run.
                Err(err) => {
                    eprintln!("frep: {err}");
                    return None;
                }
            };
            if entry.depth() == 0 {
                return None;
            }
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                return include_dirs.then(|| entry.into_path());
            }
            if !file_type.is_file() {
                return None;
            }
            if let Some(types) = &self.types {
                if !types.is_match(Path::new(entry.file_name())) {
                    return None;
                }
            }
            Some(entry.into_path())
        })
    }
}

/// Compiles `-t/--type` patterns into a glob set over file names. A bare
/// extension like `py` or `.py` is normalized to `*.py`; anything carrying
/// a wildcard is used as written.
fn build_type_set(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for raw in patterns {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        let glob = if trimmed.contains('*') || trimmed.contains('?') {
            trimmed.to_string()
        } else {
            format!("*.{}", trimmed.trim_start_matches('.'))
        };
        builder.add(Glob::new(&glob)?);
    }
    Ok(Some(builder.build()?))
}
