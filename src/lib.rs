//! `frep` is a library for searching and replacing text across file names
//! and file contents beneath a directory tree.
//!
//! It provides the core logic for the `frep` command-line tool but can also
//! be used as a standalone library. The main components are:
//!
//! - `search`: The read-only orchestrator producing filename and content
//!   matches, with context windows and per-file counts.
//! - `replace`: The rename and in-place rewrite orchestrator, dry-run by
//!   default, with optional backups and diff previews.
//! - `walk`: One deterministic traversal per operation, built on the
//!   `ignore` crate.
//! - `filter`: The exclusion rules and the binary classifier.
//! - `matcher`: Literal-or-regex matching and substitution.
//! - `config`: The validated per-invocation operating mode.
//!
//! Every invocation traverses fresh; there is no cross-invocation state.

pub mod cli;
pub mod config;
pub mod errors;
pub mod filter;
pub mod matcher;
pub mod replace;
pub mod report;
pub mod search;
pub mod view;
pub mod walk;

// Re-export main types for easier access by library users.
pub use config::{Mode, ReplaceConfig, Scope, SearchConfig};
pub use errors::{Error, Result};
pub use report::{OutputSink, RunCounters};
pub use search::{FirstMatch, SearchOutcome};
