use crate::config::ReplaceConfig;
use crate::errors::{Error, Result};
use crate::filter::{BinaryClassifier, ExclusionFilter};
use crate::matcher::PatternMatcher;
use crate::report::{OutputSink, RunCounters};
use crate::walk::Walker;
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Runs the rename phase and the content phase, in that order, each gated
/// by the config's scope. Dry-run by default: without `apply`, every change
/// is computed and reported but nothing on disk is touched, so running the
/// same dry run twice produces identical output.
pub fn run_replace(cfg: &ReplaceConfig, sink: &mut OutputSink) -> Result<RunCounters> {
    let search = &cfg.search;
    let matcher = PatternMatcher::new(&search.pattern, search.is_regex, search.ignore_case)?;
    let filter = ExclusionFilter::new(&search.excludes, search.include_old)?;
    let classifier = BinaryClassifier::new(search.allow_binary);
    let mut counters = RunCounters::default();

    if search.scope.names() {
        rename_phase(cfg, &matcher, &filter, sink, &mut counters)?;
    }
    if search.scope.contents() {
        content_phase(cfg, &matcher, &filter, &classifier, sink, &mut counters)?;
    }

    sink.summary(&counters);
    if !cfg.apply {
        sink.plain(
            "\nDry run: nothing was changed. Re-run with --apply to write these changes; \
             add --backup to keep .bak copies and --diff to preview them.",
        );
    }
    Ok(counters)
}

fn rename_phase(
    cfg: &ReplaceConfig,
    matcher: &PatternMatcher,
    filter: &ExclusionFilter,
    sink: &mut OutputSink,
    counters: &mut RunCounters,
) -> Result<()> {
    let search = &cfg.search;
    let walker = Walker::new(&search.root, filter.clone(), &search.types, search.include_dirs)?;
    // Collected up front: renaming while walking would perturb the
    // traversal. Children sort before parents so a directory rename cannot
    // orphan deeper candidates still in the list.
    let mut candidates: Vec<_> = walker.entries().collect();
    candidates.sort_by_key(|p| std::cmp::Reverse(p.components().count()));

    for path in candidates {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !matcher.is_match(name) {
            continue;
        }
        let new_name = matcher.substitute(name, &cfg.replacement);
        if new_name == name || new_name.is_empty() {
            continue;
        }
        counters.matched += 1;
        let target = path.with_file_name(&new_name);

        let shown_old = path.display().to_string();
        let shown_new = target.display().to_string();

        if !cfg.apply {
            let plain = format!("rename {shown_old} -> {shown_new}");
            let styled = format!(
                "rename {} -> {}",
                shown_old.as_str().magenta(),
                shown_new.as_str().green()
            );
            sink.emit(&styled, &plain);
            continue;
        }

        if target.symlink_metadata().is_ok() {
            eprintln!(
                "frep: cannot rename {shown_old}: {}",
                Error::RenameCollision(target.clone())
            );
            continue;
        }
        match fs::rename(&path, &target) {
            Ok(()) => {
                counters.modified += 1;
                let plain = format!("renamed {shown_old} -> {shown_new}");
                let styled = format!(
                    "renamed {} -> {}",
                    shown_old.as_str().magenta(),
                    shown_new.as_str().green()
                );
                sink.emit(&styled, &plain);
            }
            Err(err) => {
                eprintln!("frep: rename {shown_old}: {err}");
            }
        }
    }
    Ok(())
}

fn content_phase(
    cfg: &ReplaceConfig,
    matcher: &PatternMatcher,
    filter: &ExclusionFilter,
    classifier: &BinaryClassifier,
    sink: &mut OutputSink,
    counters: &mut RunCounters,
) -> Result<()> {
    let search = &cfg.search;
    let walker = Walker::new(&search.root, filter.clone(), &search.types, false)?;

    for path in walker.files() {
        if classifier.is_binary(&path) {
            continue;
        }
        counters.scanned += 1;
        // Rewriting demands valid UTF-8; a lossy round-trip would corrupt
        // bytes the user never asked to touch.
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                eprintln!("frep: {}: {err}", path.display());
                continue;
            }
        };

        let hits = matcher.count(&content);
        if hits == 0 {
            continue;
        }
        counters.matched += hits;
        let new_content = matcher.substitute(&content, &cfg.replacement);
        if new_content == content {
            continue;
        }

        if cfg.show_diff {
            emit_unified_diff(sink, &path, &content, &new_content);
        }

        if !cfg.apply {
            let shown = path.display().to_string();
            sink.emit(
                &format!("would modify {} ({} changes)", shown.as_str().magenta(), hits),
                &format!("would modify {shown} ({hits} changes)"),
            );
            continue;
        }

        if cfg.backup {
            let backup_path = format!("{}.bak", path.display());
            if let Err(err) = fs::copy(&path, &backup_path) {
                eprintln!("frep: backup {}: {err}", path.display());
                // A file the user asked to back up is never modified
                // without its backup.
                continue;
            }
        }
        match write_in_place(&path, &new_content) {
            Ok(()) => {
                counters.modified += 1;
                let shown = path.display().to_string();
                sink.emit(
                    &format!("modified {} ({} changes)", shown.as_str().magenta(), hits),
                    &format!("modified {shown} ({hits} changes)"),
                );
            }
            Err(err) => {
                eprintln!("frep: {}: {err}", path.display());
            }
        }
    }
    Ok(())
}

/// Replaces a file's content atomically: write a sibling tempfile, carry
/// over the permissions, persist over the original.
fn write_in_place(path: &Path, content: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut temp_file = NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_bytes())?;

    let perms = fs::metadata(path)?.permissions();
    fs::set_permissions(temp_file.path(), perms)?;

    temp_file.persist(path)?;
    Ok(())
}

/// Emits a unified diff of one pending change, hunk headers and all.
fn emit_unified_diff(sink: &mut OutputSink, path: &Path, old: &str, new: &str) {
    let diff = TextDiff::from_lines(old, new);

    let header_old = format!("--- {}", path.display());
    let header_new = format!("+++ {}", path.display());
    sink.emit(&header_old.as_str().bold().to_string(), &header_old);
    sink.emit(&header_new.as_str().bold().to_string(), &header_new);

    for group in diff.grouped_ops(3) {
        let first_op = &group[0];
        let old_start = match first_op {
            similar::DiffOp::Delete { old_index, .. }
            | similar::DiffOp::Replace { old_index, .. }
            | similar::DiffOp::Equal { old_index, .. } => *old_index,
            similar::DiffOp::Insert { .. } => 0,
        };
        let new_start = match first_op {
            similar::DiffOp::Insert { new_index, .. }
            | similar::DiffOp::Replace { new_index, .. }
            | similar::DiffOp::Equal { new_index, .. } => *new_index,
            similar::DiffOp::Delete { .. } => 0,
        };

        let (mut old_count, mut new_count) = (0, 0);
        for op in group.iter() {
            match op {
                similar::DiffOp::Delete { old_len, .. } => old_count += old_len,
                similar::DiffOp::Insert { new_len, .. } => new_count += new_len,
                similar::DiffOp::Replace {
                    old_len, new_len, ..
                } => {
                    old_count += old_len;
                    new_count += new_len;
                }
                similar::DiffOp::Equal { len, .. } => {
                    old_count += len;
                    new_count += len;
                }
            }
        }

        let hunk = format!(
            "@@ -{},{} +{},{} @@",
            old_start + 1,
            old_count,
            new_start + 1,
            new_count
        );
        sink.emit(&hunk.as_str().cyan().to_string(), &hunk);

        for op in group {
            for change in diff.iter_changes(&op) {
                let value = change.value();
                let text = value.strip_suffix('\n').unwrap_or(value);
                match change.tag() {
                    ChangeTag::Delete => {
                        let line = format!("-{text}");
                        sink.emit(&line.as_str().red().to_string(), &line);
                    }
                    ChangeTag::Insert => {
                        let line = format!("+{text}");
                        sink.emit(&line.as_str().green().to_string(), &line);
                    }
                    ChangeTag::Equal => sink.plain(&format!(" {text}")),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Scope, SearchConfig};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn config(root: &Path, pattern: &str, replacement: &str) -> ReplaceConfig {
        ReplaceConfig {
            search: SearchConfig {
                pattern: pattern.into(),
                is_regex: false,
                ignore_case: false,
                scope: Scope::Both,
                types: vec![],
                excludes: vec![],
                include_old: false,
                allow_binary: false,
                include_dirs: false,
                context: 0,
                first_only: false,
                count_only: false,
                summary_only: false,
                root: root.to_path_buf(),
            },
            replacement: replacement.into(),
            apply: false,
            backup: false,
            show_diff: false,
        }
    }

    fn run_to_string(cfg: &ReplaceConfig) -> (RunCounters, String) {
        let dir = TempDir::new().unwrap();
        let report = dir.path().join("report.txt");
        let mut sink = OutputSink::create(Some(&report)).unwrap();
        let counters = run_replace(cfg, &mut sink).unwrap();
        sink.finish().unwrap();
        (counters, fs::read_to_string(&report).unwrap())
    }

    #[test]
    fn apply_replaces_every_occurrence() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "foo foo\n").unwrap();

        let mut cfg = config(dir.path(), "foo", "baz");
        cfg.search.scope = Scope::Content;
        cfg.apply = true;
        let (counters, _) = run_to_string(&cfg);

        assert_eq!(fs::read_to_string(&file).unwrap(), "baz baz\n");
        assert_eq!(counters.scanned, 1);
        assert_eq!(counters.matched, 2);
        assert_eq!(counters.modified, 1);
    }

    #[test]
    fn dry_run_leaves_disk_untouched_and_reports_idempotently() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "foo bar\n").unwrap();

        let mut cfg = config(dir.path(), "foo", "baz");
        cfg.search.scope = Scope::Content;
        let (counters, first_report) = run_to_string(&cfg);

        assert_eq!(fs::read_to_string(&file).unwrap(), "foo bar\n");
        assert_eq!(counters.modified, 0);
        assert!(first_report.contains("would modify"));
        assert!(first_report.contains("Dry run"));

        let (_, second_report) = run_to_string(&cfg);
        assert_eq!(first_report, second_report);
    }

    #[test]
    fn backup_is_byte_identical_to_the_original() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        let original = "foo line one\nfoo line two\n";
        fs::write(&file, original).unwrap();

        let mut cfg = config(dir.path(), "foo", "baz");
        cfg.search.scope = Scope::Content;
        cfg.apply = true;
        cfg.backup = true;
        run_to_string(&cfg);

        let backup = PathBuf::from(format!("{}.bak", file.display()));
        assert_eq!(fs::read_to_string(&backup).unwrap(), original);
        assert!(fs::read_to_string(&file).unwrap().contains("baz"));
    }

    #[test]
    fn rename_applies_the_same_substitution_rules() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("foo_config.py"), "").unwrap();

        let mut cfg = config(dir.path(), "foo", "bar");
        cfg.search.scope = Scope::Names;
        cfg.apply = true;
        let (counters, report) = run_to_string(&cfg);

        assert!(dir.path().join("bar_config.py").exists());
        assert!(!dir.path().join("foo_config.py").exists());
        assert!(report.contains("renamed"));
        assert_eq!(counters.matched, 1);
        assert_eq!(counters.modified, 1);
    }

    #[test]
    fn rename_never_clobbers_an_existing_target() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("foo.txt"), "from foo\n").unwrap();
        fs::write(dir.path().join("bar.txt"), "from bar\n").unwrap();

        let mut cfg = config(dir.path(), "foo", "bar");
        cfg.search.scope = Scope::Names;
        cfg.apply = true;
        let (counters, _) = run_to_string(&cfg);

        // Both files intact, the collision reported, nothing modified.
        assert_eq!(
            fs::read_to_string(dir.path().join("bar.txt")).unwrap(),
            "from bar\n"
        );
        assert!(dir.path().join("foo.txt").exists());
        assert_eq!(counters.matched, 1);
        assert_eq!(counters.modified, 0);
    }

    #[test]
    fn dry_run_rename_only_proposes() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("foo.txt"), "").unwrap();

        let mut cfg = config(dir.path(), "foo", "bar");
        cfg.search.scope = Scope::Names;
        let (counters, report) = run_to_string(&cfg);

        assert!(dir.path().join("foo.txt").exists());
        assert!(!dir.path().join("bar.txt").exists());
        assert!(report.contains("rename"));
        assert_eq!(counters.matched, 1);
        assert_eq!(counters.modified, 0);
    }

    #[test]
    fn directory_renames_do_not_orphan_children() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("foo_pkg")).unwrap();
        fs::write(dir.path().join("foo_pkg/foo_mod.py"), "").unwrap();

        let mut cfg = config(dir.path(), "foo", "bar");
        cfg.search.scope = Scope::Names;
        cfg.search.include_dirs = true;
        cfg.apply = true;
        let (counters, _) = run_to_string(&cfg);

        assert!(dir.path().join("bar_pkg/bar_mod.py").exists());
        assert_eq!(counters.modified, 2);
    }

    #[test]
    fn regex_rename_expands_capture_groups() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("test_widget.py"), "").unwrap();

        let mut cfg = config(dir.path(), r"test_(.*)\.py", "spec_$1.py");
        cfg.search.is_regex = true;
        cfg.search.scope = Scope::Names;
        cfg.apply = true;
        run_to_string(&cfg);

        assert!(dir.path().join("spec_widget.py").exists());
    }

    #[test]
    fn binary_files_are_left_alone() {
        let dir = TempDir::new().unwrap();
        let blob = dir.path().join("blob.dat");
        let mut content = b"foo".to_vec();
        content.push(0);
        fs::write(&blob, &content).unwrap();

        let mut cfg = config(dir.path(), "foo", "baz");
        cfg.search.scope = Scope::Content;
        cfg.apply = true;
        let (counters, _) = run_to_string(&cfg);

        assert_eq!(fs::read(&blob).unwrap(), content);
        assert_eq!(counters.scanned, 0);
        assert_eq!(counters.modified, 0);
    }

    #[test]
    fn diff_preview_shows_old_and_new_lines() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "keep\nfoo bar\nkeep too\n").unwrap();

        let mut cfg = config(dir.path(), "foo", "baz");
        cfg.search.scope = Scope::Content;
        cfg.show_diff = true;
        let (_, report) = run_to_string(&cfg);

        assert!(report.contains("--- "));
        assert!(report.contains("+++ "));
        assert!(report.contains("-foo bar"));
        assert!(report.contains("+baz bar"));
        assert!(report.contains("@@ "));
    }

    #[test]
    fn summary_always_ends_the_run() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "no match\n").unwrap();

        let cfg = config(dir.path(), "foo", "baz");
        let (counters, report) = run_to_string(&cfg);

        assert!(report.contains("Files scanned : 1"));
        assert!(report.contains("Matches found : 0"));
        assert_eq!(counters.matched, 0);
    }
}
