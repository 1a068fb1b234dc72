//! Error types shared by the parser, builtins and the dispatcher.
//!
//! Every variant here is non-fatal: the interpreter reports it on its own
//! standard output and goes on reading input.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`ShellError`].
pub type Result<T> = std::result::Result<T, ShellError>;

#[derive(Error, Debug)]
pub enum ShellError {
    /// A redirection operator with no target token after it, or a line that
    /// starts with an operator instead of a command name.
    #[error("syntax error: redirection `{operator}` is missing a file argument")]
    MalformedRedirection { operator: String },

    /// The redirection target could not be opened.
    #[error("failed to open or create file {}: {source}", path.display())]
    RedirectOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Neither a builtin nor a launchable executable.
    #[error("{0}: command not found")]
    CommandNotFound(String),

    /// `cd` target does not exist or is not enterable.
    #[error("cd: {0}: No such file or directory")]
    NoSuchDirectory(String),

    /// A builtin that needs an operand got none.
    #[error("{0}: missing argument")]
    MissingArgument(&'static str),

    /// Writing to one of the bound streams failed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
