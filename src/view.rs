use crate::errors::{Error, Result};
use crate::report::OutputSink;
use colored::Colorize;
use std::fs;
use std::path::Path;

/// Prints one line of a file with its surrounding context, the target line
/// highlighted. This is the `-l/--line` collaborator mode: no traversal,
/// no counters, just a window for the caller (or an editor wrapper) to
/// look at.
pub fn run_view(file: &Path, line: usize, context: usize, sink: &mut OutputSink) -> Result<()> {
    if line == 0 {
        return Err(Error::Usage("line numbers are 1-based".into()));
    }
    let content = fs::read_to_string(file)?;
    let lines: Vec<&str> = content.lines().collect();
    if line > lines.len() {
        return Err(Error::Usage(format!(
            "line {line} is out of range for {} ({} lines)",
            file.display(),
            lines.len()
        )));
    }

    let start = line.saturating_sub(context + 1);
    let end = (line - 1 + context).min(lines.len().saturating_sub(1));
    for idx in start..=end {
        let lineno = idx + 1;
        let text = lines[idx];
        if lineno == line {
            sink.emit(
                &format!(
                    "{}: {}",
                    lineno.to_string().as_str().green().bold(),
                    text.bold()
                ),
                &format!("{lineno}: {text}"),
            );
        } else {
            sink.emit(
                &format!("{}- {}", lineno.to_string().as_str().green(), text),
                &format!("{lineno}- {text}"),
            );
        }
    }
    Ok(())
}
