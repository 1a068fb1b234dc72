//! A small interactive shell.
//!
//! A line of input goes through three stages:
//!
//! 1. [`lexer::tokenize`] resolves quoting and escaping into plain tokens,
//! 2. [`parser::parse_line`] splits off the command name and at most one output
//!    redirection (see [`redirect`]),
//! 3. [`Interpreter::dispatch`] runs the command, either as one of the builtins
//!    from [`builtin::BuiltinRegistry`] or as an external program found on `PATH`.
//!
//! [`Interpreter::repl`] wraps all of this in a prompt-driven read loop.

pub mod builtin;
pub mod command;
pub mod env;
pub mod error;
pub mod external;
mod interpreter;
mod io_adapters;
pub mod lexer;
pub mod parser;
pub mod redirect;

#[cfg(test)]
mod test_support;

pub use error::{Result, ShellError};
pub use interpreter::{Flow, Interpreter, PROMPT};
pub use io_adapters::{MemConsole, MemWriter, ProcessConsole};
pub use parser::ParsedCommand;
