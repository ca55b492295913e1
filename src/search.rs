use crate::config::SearchConfig;
use crate::errors::Result;
use crate::filter::{BinaryClassifier, ExclusionFilter};
use crate::matcher::PatternMatcher;
use crate::report::{OutputSink, RunCounters};
use crate::walk::Walker;
use colored::Colorize;
use std::borrow::Cow;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

/// The first reported match of a run, kept for the editor jump.
#[derive(Debug, Clone)]
pub struct FirstMatch {
    pub path: PathBuf,
    /// 1-based content line; `None` for a filename match.
    pub line: Option<usize>,
}

/// What a search run produced, beyond its report lines.
#[derive(Debug)]
pub struct SearchOutcome {
    pub counters: RunCounters,
    pub first: Option<FirstMatch>,
}

/// Runs the filename and content match streams selected by the config's
/// scope, each over its own traversal. Read-only: the filesystem is never
/// mutated here.
pub fn run_search(cfg: &SearchConfig, sink: &mut OutputSink) -> Result<SearchOutcome> {
    let matcher = PatternMatcher::new(&cfg.pattern, cfg.is_regex, cfg.ignore_case)?;
    let filter = ExclusionFilter::new(&cfg.excludes, cfg.include_old)?;
    let classifier = BinaryClassifier::new(cfg.allow_binary);
    let mut counters = RunCounters::default();
    let mut first: Option<FirstMatch> = None;

    if cfg.scope.names() {
        let walker = Walker::new(&cfg.root, filter.clone(), &cfg.types, cfg.include_dirs)?;
        for path in walker.entries() {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !matcher.is_match(name) {
                continue;
            }
            counters.matched += 1;
            if first.is_none() {
                first = Some(FirstMatch {
                    path: path.clone(),
                    line: None,
                });
            }
            if !cfg.count_only && !cfg.summary_only {
                let shown = path.display().to_string();
                sink.emit(&shown.as_str().magenta().bold().to_string(), &shown);
            }
            if cfg.first_only {
                return Ok(finish(cfg, sink, counters, first));
            }
        }
    }

    if cfg.scope.contents() {
        let walker = Walker::new(&cfg.root, filter, &cfg.types, false)?;
        for path in walker.files() {
            if classifier.is_binary(&path) {
                continue;
            }
            counters.scanned += 1;
            let stop = scan_file(cfg, &matcher, &path, sink, &mut counters, &mut first)?;
            if stop {
                return Ok(finish(cfg, sink, counters, first));
            }
        }
    }

    Ok(finish(cfg, sink, counters, first))
}

fn finish(
    cfg: &SearchConfig,
    sink: &mut OutputSink,
    counters: RunCounters,
    first: Option<FirstMatch>,
) -> SearchOutcome {
    if cfg.summary_only {
        sink.summary(&counters);
    }
    SearchOutcome { counters, first }
}

/// Scans one file's lines, emitting matches with their context window.
/// Returns true when `--first` says the whole run should stop.
fn scan_file(
    cfg: &SearchConfig,
    matcher: &PatternMatcher,
    path: &Path,
    sink: &mut OutputSink,
    counters: &mut RunCounters,
    first: &mut Option<FirstMatch>,
) -> Result<bool> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("frep: {}: {err}", path.display());
            return Ok(false);
        }
    };
    let mut lines: Vec<Cow<'_, str>> = bytes
        .split(|&b| b == b'\n')
        .map(String::from_utf8_lossy)
        .collect();
    // A trailing newline is a line terminator, not an extra empty line.
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    let shown_path = path.display().to_string();
    let emit_lines = !cfg.count_only && !cfg.summary_only;
    let mut file_hits = 0usize;
    let mut before: VecDeque<usize> = VecDeque::new();
    let mut after_remaining = 0usize;
    let mut last_printed: Option<usize> = None;

    for idx in 0..lines.len() {
        let line: &str = &lines[idx];
        if matcher.is_match(line) {
            counters.matched += 1;
            file_hits += 1;
            if first.is_none() {
                *first = Some(FirstMatch {
                    path: path.to_path_buf(),
                    line: Some(idx + 1),
                });
            }
            if emit_lines {
                if cfg.context > 0 {
                    let window_start = idx.saturating_sub(before.len());
                    if last_printed.is_some_and(|lp| window_start > lp + 1) {
                        sink.plain("--");
                    }
                    while let Some(bidx) = before.pop_front() {
                        emit_context_line(sink, &shown_path, bidx + 1, &lines[bidx]);
                        last_printed = Some(bidx);
                    }
                }
                emit_match_line(sink, matcher, &shown_path, idx + 1, line);
                last_printed = Some(idx);
                after_remaining = cfg.context;
            }
            if cfg.first_only {
                if cfg.count_only {
                    sink.plain(&format!("{shown_path}:{file_hits}"));
                }
                return Ok(true);
            }
        } else if emit_lines && after_remaining > 0 {
            emit_context_line(sink, &shown_path, idx + 1, line);
            last_printed = Some(idx);
            after_remaining -= 1;
        } else if emit_lines && cfg.context > 0 {
            before.push_back(idx);
            if before.len() > cfg.context {
                before.pop_front();
            }
        }
    }

    if cfg.count_only && !cfg.summary_only && file_hits > 0 {
        sink.emit(
            &format!("{}:{}", shown_path.as_str().magenta(), file_hits),
            &format!("{shown_path}:{file_hits}"),
        );
    }
    Ok(false)
}

fn emit_match_line(
    sink: &mut OutputSink,
    matcher: &PatternMatcher,
    path: &str,
    lineno: usize,
    line: &str,
) {
    let styled = format!(
        "{}:{}: {}",
        path.magenta(),
        lineno.to_string().as_str().green(),
        highlight(line, &matcher.find_ranges(line))
    );
    sink.emit(&styled, &format!("{path}:{lineno}: {line}"));
}

fn emit_context_line(sink: &mut OutputSink, path: &str, lineno: usize, line: &str) {
    let styled = format!(
        "{}:{}- {}",
        path.magenta(),
        lineno.to_string().as_str().green(),
        line
    );
    sink.emit(&styled, &format!("{path}:{lineno}- {line}"));
}

/// Wraps each matched segment of a line in the match color.
fn highlight(line: &str, ranges: &[(usize, usize)]) -> String {
    let mut out = String::new();
    let mut pos = 0;
    for &(start, end) in ranges {
        out.push_str(&line[pos..start]);
        out.push_str(&line[start..end].red().bold().to_string());
        pos = end;
    }
    out.push_str(&line[pos..]);
    out
}
