use crate::errors::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// The three run counters, owned by whichever orchestrator is running and
/// read once at the end of the run for the summary.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunCounters {
    /// Content-eligible files whose contents were read and tested.
    pub scanned: usize,
    /// Matches found, filename or content.
    pub matched: usize,
    /// Files actually renamed or rewritten.
    pub modified: usize,
}

/// Where report lines go: stdout always, and a plain-text copy of the same
/// report when `-o` names a file.
pub struct OutputSink {
    copy: Option<BufWriter<File>>,
}

impl OutputSink {
    pub fn create(path: Option<&Path>) -> Result<Self> {
        let copy = match path {
            Some(p) => Some(BufWriter::new(File::create(p)?)),
            None => None,
        };
        Ok(Self { copy })
    }

    /// Emits one report line: `styled` to stdout, `plain` to the copy.
    pub fn emit(&mut self, styled: &str, plain: &str) {
        println!("{styled}");
        if let Some(w) = &mut self.copy {
            let _ = writeln!(w, "{plain}");
        }
    }

    /// Emits a line with no styling.
    pub fn plain(&mut self, line: &str) {
        self.emit(line, line);
    }

    pub fn summary(&mut self, counters: &RunCounters) {
        self.plain(&format!("\n{}", "-".repeat(50)));
        self.plain(&format!("Files scanned : {}", counters.scanned));
        self.plain(&format!("Matches found : {}", counters.matched));
        self.plain(&format!("Files modified: {}", counters.modified));
    }

    pub fn finish(&mut self) -> Result<()> {
        if let Some(w) = &mut self.copy {
            w.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn copy_receives_the_plain_rendering() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("report.txt");

        let mut sink = OutputSink::create(Some(&out)).unwrap();
        sink.emit("\u{1b}[35mstyled\u{1b}[0m", "plain line");
        sink.plain("second line");
        sink.finish().unwrap();

        assert_eq!(fs::read_to_string(&out).unwrap(), "plain line\nsecond line\n");
    }

    #[test]
    fn summary_reports_all_three_counters() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("report.txt");

        let mut sink = OutputSink::create(Some(&out)).unwrap();
        sink.summary(&RunCounters {
            scanned: 3,
            matched: 2,
            modified: 1,
        });
        sink.finish().unwrap();

        let report = fs::read_to_string(&out).unwrap();
        assert!(report.contains("Files scanned : 3"));
        assert!(report.contains("Matches found : 2"));
        assert!(report.contains("Files modified: 1"));
    }
}
