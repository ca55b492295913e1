use crate::cli::Args;
use crate::errors::{Error, Result};
use std::path::{Path, PathBuf};

/// Which match streams a run operates on.
///
/// Resolved once from the `-n`/`-c` pair. Giving both flags means "neither
/// restricted" and resolves to `Both`, the same as giving neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Names,
    Content,
    Both,
}

impl Scope {
    pub fn from_flags(name_only: bool, content_only: bool) -> Self {
        match (name_only, content_only) {
            (true, false) => Scope::Names,
            (false, true) => Scope::Content,
            _ => Scope::Both,
        }
    }

    pub fn names(self) -> bool {
        matches!(self, Scope::Names | Scope::Both)
    }

    pub fn contents(self) -> bool {
        matches!(self, Scope::Content | Scope::Both)
    }
}

/// Everything a search run needs, validated at startup.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub pattern: String,
    pub is_regex: bool,
    pub ignore_case: bool,
    pub scope: Scope,
    pub types: Vec<String>,
    pub excludes: Vec<String>,
    pub include_old: bool,
    pub allow_binary: bool,
    pub include_dirs: bool,
    pub context: usize,
    pub first_only: bool,
    pub count_only: bool,
    pub summary_only: bool,
    pub root: PathBuf,
}

/// A search run that also rewrites names and contents.
#[derive(Debug, Clone)]
pub struct ReplaceConfig {
    pub search: SearchConfig,
    pub replacement: String,
    pub apply: bool,
    pub backup: bool,
    pub show_diff: bool,
}

/// The validated operating mode of one invocation.
///
/// Flag combinations are checked here, once, instead of re-testing booleans
/// at each call site; combinations the contract does not cover are usage
/// errors rather than guesses.
#[derive(Debug)]
pub enum Mode {
    Search(SearchConfig),
    Replace(ReplaceConfig),
    ViewLine {
        file: PathBuf,
        line: usize,
        context: usize,
    },
}

impl Mode {
    pub fn from_args(args: Args) -> Result<Self> {
        if let Some(line) = args.line {
            return view_mode(args, line);
        }

        let Some(pattern) = args.pattern else {
            return Err(Error::Usage(
                "missing search pattern\nUsage: frep <pattern> [replacement] [path]".into(),
            ));
        };
        if pattern.is_empty() {
            return Err(Error::Usage("search pattern must not be empty".into()));
        }

        let (replacement, root) =
            resolve_positionals(args.replace.clone(), args.second.clone(), args.third.clone())?;
        let root = root.unwrap_or_else(|| PathBuf::from("."));
        if !root.is_dir() {
            return Err(Error::Usage(format!(
                "root path '{}' is not a directory",
                root.display()
            )));
        }

        let search = SearchConfig {
            pattern,
            is_regex: args.regex,
            ignore_case: args.ignore_case,
            scope: Scope::from_flags(args.name_only, args.content_only),
            types: args.types.clone(),
            excludes: args.excludes.clone(),
            include_old: args.include_old,
            allow_binary: args.binary,
            include_dirs: args.dirs,
            context: args.context,
            first_only: args.first,
            count_only: args.count,
            summary_only: args.summary,
            root,
        };

        match replacement {
            Some(replacement) => {
                if replacement.is_empty() {
                    return Err(Error::Usage("replacement must not be empty".into()));
                }
                for (set, flag) in [
                    (args.first, "--first"),
                    (args.count, "--count"),
                    (args.editor, "--editor"),
                ] {
                    if set {
                        return Err(Error::Usage(format!(
                            "{flag} applies to search runs, not replace"
                        )));
                    }
                }
                Ok(Mode::Replace(ReplaceConfig {
                    search,
                    replacement,
                    apply: args.apply,
                    backup: args.backup,
                    show_diff: args.diff,
                }))
            }
            None => {
                if args.apply {
                    return Err(Error::Usage(
                        "--apply requires a replacement (use -r STRING or a second positional)"
                            .into(),
                    ));
                }
                if args.backup || args.diff {
                    return Err(Error::Usage(
                        "--backup and --diff only apply to replace runs".into(),
                    ));
                }
                Ok(Mode::Search(search))
            }
        }
    }
}

fn view_mode(args: Args, line: usize) -> Result<Mode> {
    if args.replace.is_some() || args.apply || args.backup || args.diff {
        return Err(Error::Usage(
            "-l/--line views a file; it cannot be combined with replace flags".into(),
        ));
    }
    let Some(file) = args.pattern else {
        return Err(Error::Usage(
            "missing file path\nUsage: frep -l N [-C K] <file>".into(),
        ));
    };
    if args.second.is_some() {
        return Err(Error::Usage("-l/--line takes a single file argument".into()));
    }
    if line == 0 {
        return Err(Error::Usage("line numbers are 1-based".into()));
    }
    Ok(Mode::ViewLine {
        file: PathBuf::from(file),
        line,
        context: args.context,
    })
}

/// Applies the positional ambiguity policy: a second positional that starts
/// with `.` or names an existing directory is a path, otherwise it is the
/// replacement. A third positional is always the path.
fn resolve_positionals(
    flag_replacement: Option<String>,
    second: Option<String>,
    third: Option<String>,
) -> Result<(Option<String>, Option<PathBuf>)> {
    match (second, third) {
        (None, _) => Ok((flag_replacement, None)),
        (Some(second), None) => {
            if flag_replacement.is_some() || looks_like_path(&second) {
                Ok((flag_replacement, Some(PathBuf::from(second))))
            } else {
                Ok((Some(second), None))
            }
        }
        (Some(second), Some(third)) => {
            if flag_replacement.is_some() {
                return Err(Error::Usage(format!(
                    "unexpected extra argument '{third}' (replacement already given with -r)"
                )));
            }
            if looks_like_path(&second) {
                return Err(Error::Usage(format!(
                    "unexpected extra argument '{third}' ('{second}' already names the path)"
                )));
            }
            Ok((Some(second), Some(PathBuf::from(third))))
        }
    }
}

fn looks_like_path(token: &str) -> bool {
    token.starts_with('.') || Path::new(token).is_dir()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn mode(argv: &[&str]) -> Result<Mode> {
        let mut full = vec!["frep"];
        full.extend_from_slice(argv);
        Mode::from_args(Args::try_parse_from(full).unwrap())
    }

    #[test]
    fn scope_resolution() {
        assert_eq!(Scope::from_flags(false, false), Scope::Both);
        assert_eq!(Scope::from_flags(true, false), Scope::Names);
        assert_eq!(Scope::from_flags(false, true), Scope::Content);
        // Both restrictions together mean "neither restricted".
        assert_eq!(Scope::from_flags(true, true), Scope::Both);
    }

    #[test]
    fn bare_pattern_is_a_search() {
        match mode(&["foo"]).unwrap() {
            Mode::Search(cfg) => {
                assert_eq!(cfg.pattern, "foo");
                assert_eq!(cfg.root, PathBuf::from("."));
            }
            other => panic!("expected search, got {other:?}"),
        }
    }

    #[test]
    fn second_positional_is_the_replacement() {
        match mode(&["foo", "baz"]).unwrap() {
            Mode::Replace(cfg) => {
                assert_eq!(cfg.replacement, "baz");
                assert!(!cfg.apply);
            }
            other => panic!("expected replace, got {other:?}"),
        }
    }

    #[test]
    fn dot_prefixed_second_positional_is_a_path() {
        match mode(&["foo", "."]).unwrap() {
            Mode::Search(cfg) => assert_eq!(cfg.root, PathBuf::from(".")),
            other => panic!("expected search, got {other:?}"),
        }
    }

    #[test]
    fn existing_directory_second_positional_is_a_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let dir_str = dir.path().to_str().unwrap().to_string();
        match mode(&["foo", &dir_str]).unwrap() {
            Mode::Search(cfg) => assert_eq!(cfg.root, dir.path()),
            other => panic!("expected search, got {other:?}"),
        }
    }

    #[test]
    fn three_positionals_are_pattern_replacement_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let dir_str = dir.path().to_str().unwrap().to_string();
        match mode(&["foo", "baz", &dir_str]).unwrap() {
            Mode::Replace(cfg) => {
                assert_eq!(cfg.replacement, "baz");
                assert_eq!(cfg.search.root, dir.path());
            }
            other => panic!("expected replace, got {other:?}"),
        }
    }

    #[test]
    fn replace_flag_frees_the_second_positional_for_the_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let dir_str = dir.path().to_str().unwrap().to_string();
        match mode(&["foo", &dir_str, "-r", "baz"]).unwrap() {
            Mode::Replace(cfg) => {
                assert_eq!(cfg.replacement, "baz");
                assert_eq!(cfg.search.root, dir.path());
            }
            other => panic!("expected replace, got {other:?}"),
        }
    }

    #[test]
    fn missing_pattern_is_a_usage_error() {
        assert!(matches!(mode(&[]), Err(Error::Usage(_))));
    }

    #[test]
    fn apply_without_replacement_is_a_usage_error() {
        assert!(matches!(mode(&["foo", "--apply"]), Err(Error::Usage(_))));
    }

    #[test]
    fn first_with_replacement_is_a_usage_error() {
        assert!(matches!(
            mode(&["foo", "baz", "--first"]),
            Err(Error::Usage(_))
        ));
    }

    #[test]
    fn nonexistent_root_is_a_usage_error() {
        assert!(matches!(
            mode(&["foo", "./no-such-dir-here"]),
            Err(Error::Usage(_))
        ));
    }

    #[test]
    fn line_view_takes_the_first_positional_as_a_file() {
        match mode(&["-l", "12", "-C", "2", "src/main.py"]).unwrap() {
            Mode::ViewLine {
                file,
                line,
                context,
            } => {
                assert_eq!(file, PathBuf::from("src/main.py"));
                assert_eq!(line, 12);
                assert_eq!(context, 2);
            }
            other => panic!("expected view mode, got {other:?}"),
        }
    }

    #[test]
    fn line_view_rejects_replace_flags() {
        assert!(matches!(
            mode(&["-l", "12", "file.py", "--apply"]),
            Err(Error::Usage(_))
        ));
    }
}
