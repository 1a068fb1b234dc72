//! Output redirection: operator recognition and target opening.

use crate::error::{Result, ShellError};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Which of the command's output streams is sent to the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// How the target file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Discard previous contents.
    Truncate,
    /// Keep previous contents and write after them.
    Append,
}

/// Recognized operators, in the order they are looked up. Only the first one
/// present in a command line takes effect.
pub const REDIRECT_OPERATORS: &[(&str, Stream, WriteMode)] = &[
    (">", Stream::Stdout, WriteMode::Truncate),
    ("1>", Stream::Stdout, WriteMode::Truncate),
    ("2>", Stream::Stderr, WriteMode::Truncate),
    (">>", Stream::Stdout, WriteMode::Append),
    ("1>>", Stream::Stdout, WriteMode::Append),
    ("2>>", Stream::Stderr, WriteMode::Append),
];

/// Returns true if `token` is one of the [`REDIRECT_OPERATORS`].
pub fn is_operator(token: &str) -> bool {
    REDIRECT_OPERATORS.iter().any(|(op, _, _)| *op == token)
}

/// A single output redirection attached to a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    pub stream: Stream,
    pub mode: WriteMode,
    pub path: PathBuf,
}

impl Redirection {
    pub fn new(stream: Stream, mode: WriteMode, path: impl Into<PathBuf>) -> Self {
        Self {
            stream,
            mode,
            path: path.into(),
        }
    }

    /// Opens the target for writing, creating it if absent.
    ///
    /// New files get mode `0o666` filtered through the process umask.
    pub fn open(&self) -> Result<File> {
        let mut options = OpenOptions::new();
        options.write(true).create(true);
        match self.mode {
            WriteMode::Truncate => options.truncate(true),
            WriteMode::Append => options.append(true),
        };
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o666);
        }

        let path = self.path();
        log::debug!("opening {} for {:?} ({:?})", path.display(), self.stream, self.mode);
        options.open(path).map_err(|source| ShellError::RedirectOpen {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Removes the winning redirection operator and its target from `args`.
///
/// Operators are tried in [`REDIRECT_OPERATORS`] order and the first one found
/// anywhere in `args` wins; any other operator tokens stay in the argument
/// list untouched. An operator with nothing after it is a
/// [`ShellError::MalformedRedirection`].
pub fn extract_redirection(mut args: Vec<String>) -> Result<(Vec<String>, Option<Redirection>)> {
    let found = REDIRECT_OPERATORS.iter().find_map(|&(op, stream, mode)| {
        args.iter()
            .position(|arg| arg == op)
            .map(|index| (op, index, stream, mode))
    });

    let Some((op, index, stream, mode)) = found else {
        return Ok((args, None));
    };

    if index + 1 >= args.len() {
        return Err(ShellError::MalformedRedirection {
            operator: op.to_string(),
        });
    }

    let target = args.remove(index + 1);
    args.remove(index);

    Ok((args, Some(Redirection::new(stream, mode, target.trim()))))
}
