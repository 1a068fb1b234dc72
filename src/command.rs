use std::io::Write;
use std::process::Stdio;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Abstraction over a writable output stream that can also be converted into
/// a [`Stdio`] handle for spawning external processes.
///
/// A blanket implementation exists for any type that implements `Write` and
/// `Into<Stdio>`: the process's own `Stdout`/`Stderr` and redirection `File`s.
pub trait Stdout: Write {
    /// Convert this output into a [`Stdio`] handle suitable for `std::process::Command`.
    fn stdio(self: Box<Self>) -> Stdio;
}

impl<T: Write + Into<Stdio>> Stdout for T {
    fn stdio(self: Box<Self>) -> Stdio {
        (*self).into()
    }
}

/// The shell's own standard streams.
///
/// Commands write here unless redirected, and the interpreter reports its
/// diagnostics on [`Console::stdout`] regardless of any redirection.
pub trait Console {
    fn stdout(&self) -> Box<dyn Stdout>;
    fn stderr(&self) -> Box<dyn Stdout>;
}
