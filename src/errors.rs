use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for all operations in the `frep` application.
///
/// This enum uses `thiserror` to wrap the failure modes of a run, from I/O
/// problems to bad patterns. Per-file failures during a traversal are not
/// represented here; they are reported inline and the run continues.
#[derive(Error, Debug)]
pub enum Error {
    /// An error related to file system I/O.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An error that occurred during regex compilation.
    #[error("Pattern compilation failed: {0}")]
    Regex(#[from] regex::Error),

    /// An invalid exclusion or type-filter glob.
    #[error("Invalid glob: {0}")]
    Glob(#[from] globset::Error),

    /// An error from the `ignore` crate, which is used for directory traversal.
    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),

    /// An error related to persisting a temporary file.
    #[error("Tempfile error: {0}")]
    TempFile(#[from] tempfile::PersistError),

    /// A command-line usage error. Reported with guidance, no filesystem
    /// side effects.
    #[error("{0}")]
    Usage(String),

    /// A rename whose target already exists as a distinct file.
    #[error("rename target already exists: {}", .0.display())]
    RenameCollision(PathBuf),
}

/// A convenient type alias for `Result<T, frep::errors::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Usage(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Usage(s.to_string())
    }
}
