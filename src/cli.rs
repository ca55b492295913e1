use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Search file names and contents, optionally replacing in place.
///
/// `frep` walks a directory tree once per invocation, matching a literal or
/// regex pattern against file names and content lines. With a replacement it
/// renames files and rewrites contents, dry-run by default.
#[derive(Parser, Debug)]
#[command(
    name = "frep",
    version,
    disable_version_flag = true,
    about = "Search file names and contents under a directory tree, with in-place replace",
    long_about = "frep - search file names and contents, optionally replacing in place.

Searches are dry by default; nothing on disk changes without --apply.

QUICK EXAMPLES:
  frep foo                       # find 'foo' in names and contents under .
  frep -E 'fo+' src/             # regex search beneath src/
  frep foo baz                   # preview replacing 'foo' with 'baz'
  frep foo baz --apply --backup  # do it, keeping .bak copies
  frep -n foo -t py              # match only Python file names
  frep -l 120 -C 3 src/main.py   # show line 120 with three context lines"
)]
pub struct Args {
    /// Pattern to search for: a literal substring, or a regex with -E.
    /// With -l/--line this is the file to view instead.
    pub pattern: Option<String>,

    /// Replacement string, or the root path. A token starting with '.' or
    /// naming an existing directory is taken as the path.
    #[arg(value_name = "REPLACEMENT|PATH")]
    pub second: Option<String>,

    /// Root path to search beneath (defaults to the current directory).
    #[arg(value_name = "PATH")]
    pub third: Option<String>,

    /// Match case-insensitively (applies to literal and regex patterns).
    #[arg(short = 'i', long)]
    pub ignore_case: bool,

    /// Treat the pattern as a regular expression.
    #[arg(short = 'E', long)]
    pub regex: bool,

    /// Only consider files matching these name globs, comma-separated.
    /// Bare extensions are shorthand: 'py' means '*.py'.
    #[arg(short = 't', long = "type", value_name = "GLOBS", value_delimiter = ',')]
    pub types: Vec<String>,

    /// Match file names only.
    #[arg(short = 'n', long)]
    pub name_only: bool,

    /// Match file contents only.
    #[arg(short = 'c', long)]
    pub content_only: bool,

    /// Replacement string (alternative to the positional form).
    /// In regex mode, $1/${name} refer to capture groups; in literal mode
    /// the replacement is inserted verbatim.
    #[arg(short = 'r', long, value_name = "STRING")]
    pub replace: Option<String>,

    /// Write the changes. Without this, replace runs only report what they
    /// would do.
    #[arg(long)]
    pub apply: bool,

    /// Copy each file to <file>.bak before modifying it.
    #[arg(long)]
    pub backup: bool,

    /// Show a unified diff of each pending content change.
    #[arg(long)]
    pub diff: bool,

    /// Exclude paths matching this glob; matched against the root-relative
    /// path, a bare name also matches any single component. Repeatable.
    #[arg(long = "exclude", value_name = "GLOB")]
    pub excludes: Vec<String>,

    /// Also scan 'old' directories, which are skipped by default.
    #[arg(long)]
    pub include_old: bool,

    /// Also scan files classified as binary.
    #[arg(long)]
    pub binary: bool,

    /// Include directories as name-match candidates (and rename targets).
    #[arg(long)]
    pub dirs: bool,

    /// Show N lines of context around each content match (or around the
    /// target of -l/--line).
    #[arg(short = 'C', long, value_name = "N", default_value_t = 0)]
    pub context: usize,

    /// Report per-file match counts instead of matching lines.
    #[arg(long)]
    pub count: bool,

    /// Suppress per-match lines; report only the end-of-run summary.
    #[arg(long)]
    pub summary: bool,

    /// Stop the whole run after the first match of either kind.
    #[arg(long)]
    pub first: bool,

    /// Also write the report, uncolored, to this file.
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Open $EDITOR at the first match after the search.
    #[arg(short = 'e', long)]
    pub editor: bool,

    /// View one line of a file instead of searching: the pattern positional
    /// becomes the file path.
    #[arg(short = 'l', long, value_name = "N")]
    pub line: Option<usize>,

    /// Print version.
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    pub version: Option<bool>,
}
