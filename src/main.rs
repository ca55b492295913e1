//! The main entry point for the `frep` command-line application.
//!
//! Parses arguments, resolves them into a single operating mode, and
//! dispatches to the matching orchestrator in the `frep` library. Exit
//! codes follow the tool's contract: 0 for a successful run (a replace run
//! that found nothing still succeeds), 1 when a search finds no match, for
//! usage problems, and for `--help`.

use anyhow::Context as _;
use clap::Parser;
use clap::error::ErrorKind;
use frep::cli::Args;
use frep::config::Mode;
use frep::search::FirstMatch;
use frep::{replace, report, search, view};
use std::env;
use std::process::{self, Command};

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = err.print();
            process::exit(code);
        }
    };

    match run(args) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("frep: {err:#}");
            process::exit(1);
        }
    }
}

fn run(args: Args) -> anyhow::Result<i32> {
    let output = args.output.clone();
    let editor = args.editor;
    let mode = Mode::from_args(args)?;

    let mut sink = report::OutputSink::create(output.as_deref()).with_context(|| {
        format!(
            "cannot open output file '{}'",
            output
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        )
    })?;

    let code = match mode {
        Mode::Search(cfg) => {
            let outcome = search::run_search(&cfg, &mut sink)?;
            if editor {
                if let Some(first) = &outcome.first {
                    launch_editor(first);
                }
            }
            // "Not found" is a normal, expected outcome with its own code.
            if outcome.counters.matched > 0 { 0 } else { 1 }
        }
        Mode::Replace(cfg) => {
            replace::run_replace(&cfg, &mut sink)?;
            0
        }
        Mode::ViewLine {
            file,
            line,
            context,
        } => {
            view::run_view(&file, line, context, &mut sink)?;
            0
        }
    };

    sink.finish()?;
    Ok(code)
}

/// Fire-and-forget editor jump to the first match. Formatting the
/// invocation is this tool's whole contract; the editor is external.
fn launch_editor(first: &FirstMatch) {
    let editor = env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    let line = first.line.unwrap_or(1);
    let _ = Command::new(editor)
        .arg(format!("+{line}"))
        .arg(&first.path)
        .spawn();
}
