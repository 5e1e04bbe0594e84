//! Error handling for nextkit.
//! Defines the error taxonomy and the result alias used throughout the application.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for nextkit operations.
///
/// Every variant is local to one invocation; nothing is retried.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed invocation detected after argument parsing
    #[error("Usage error: {0}.")]
    Usage(String),

    /// A resolved variable violates a constraint
    #[error("Validation error: {0}.")]
    Validation(String),

    /// Destinations that already exist in the generation target
    #[error("Conflict: {} path(s) already exist ({}). Use --overwrite to replace them.", .paths.len(), display_paths(.paths))]
    Conflict { paths: Vec<PathBuf> },

    /// A template references a placeholder that has no value
    #[error("Unresolved placeholder in '{template}': {detail}.")]
    UnresolvedToken { template: String, detail: String },

    /// Any other template rendering failure
    #[error("Template error in '{template}': {detail}.")]
    Template { template: String, detail: String },

    /// Missing or invalid template manifest
    #[error("Manifest error: {0}.")]
    Manifest(String),

    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    Io(#[from] io::Error),

    /// File system error tied to a specific path
    #[error("IO error at '{}': {source}.", .path.display())]
    IoAt {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Generation failed and every change to the target was undone
    #[error("Generation failed, target left unchanged. {source}")]
    RolledBack {
        #[source]
        source: Box<Error>,
    },

    /// Generation failed and the rollback could not undo everything
    #[error("Generation incomplete, {} path(s) left behind ({}). {source}", .paths.len(), display_paths(.paths))]
    Incomplete {
        paths: Vec<PathBuf>,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Attaches a path to an IO error.
    pub fn io_at<P: Into<PathBuf>>(path: P) -> impl FnOnce(io::Error) -> Error {
        let path = path.into();
        move |source| Error::IoAt { path, source }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths.iter().map(|p| format!("'{}'", p.display())).collect::<Vec<_>>().join(", ")
}

/// Convenience type alias for Results with nextkit's Error as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(1);
}
