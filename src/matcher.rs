use crate::errors::Result;
use regex::{NoExpand, Regex, RegexBuilder};

/// Evaluates whether a string matches the run's pattern, and computes
/// substitutions with the same rules.
///
/// Both dialects compile down to a single `Regex`: literal patterns are
/// escaped first, regex patterns compile as written. Case-insensitivity is
/// an orthogonal builder flag applying to either dialect. The matcher is a
/// pure function of its inputs, which is what lets dry-run and apply share
/// one substitution path.
#[derive(Debug)]
pub struct PatternMatcher {
    regex: Regex,
    literal: bool,
}

impl PatternMatcher {
    pub fn new(pattern: &str, is_regex: bool, ignore_case: bool) -> Result<Self> {
        let source = if is_regex {
            pattern.to_string()
        } else {
            regex::escape(pattern)
        };
        // multi_line keeps ^/$ anchored to line boundaries, so testing a
        // single line and substituting over whole content agree.
        let regex = RegexBuilder::new(&source)
            .case_insensitive(ignore_case)
            .multi_line(true)
            .build()?;
        Ok(Self {
            regex,
            literal: !is_regex,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Number of non-overlapping occurrences in `text`.
    pub fn count(&self, text: &str) -> usize {
        self.regex.find_iter(text).count()
    }

    /// Replaces every non-overlapping occurrence of the pattern in `text`.
    ///
    /// In regex mode the replacement may reference capture groups with the
    /// `regex` crate's `$1`/`${name}` syntax. In literal mode the
    /// replacement is inserted verbatim.
    pub fn substitute(&self, text: &str, replacement: &str) -> String {
        if self.literal {
            self.regex.replace_all(text, NoExpand(replacement)).into_owned()
        } else {
            self.regex.replace_all(text, replacement).into_owned()
        }
    }

    /// The match ranges within one line, for highlighting.
    pub fn find_ranges(&self, text: &str) -> Vec<(usize, usize)> {
        self.regex
            .find_iter(text)
            .map(|m| (m.start(), m.end()))
            .collect()
    }
}
