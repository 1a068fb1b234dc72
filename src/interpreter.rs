use crate::builtin::{BuiltinContext, BuiltinRegistry};
use crate::command::{Console, ExitCode, Stdout};
use crate::env::Environment;
use crate::error::{Result, ShellError};
use crate::external::ExternalCommand;
use crate::io_adapters::ProcessConsole;
use crate::parser::{self, ParsedCommand};
use crate::redirect::Stream;
use anyhow::Context;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::Write;

/// Prompt printed before every line read.
pub const PROMPT: &str = "$ ";

/// Status of a line that could not run because of a shell-level error.
const FAILURE: ExitCode = 1;
/// Status of a line whose command could not be found or launched.
const NOT_FOUND: ExitCode = 127;
/// Status after Ctrl-C at the prompt, as if killed by SIGINT.
const INTERRUPTED: ExitCode = 130;

/// What the read loop should do after a line has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line; carries the status of the line that just ran.
    Continue(ExitCode),
    /// Stop reading and terminate with this status.
    Exit(ExitCode),
}

impl Flow {
    pub fn code(self) -> ExitCode {
        match self {
            Flow::Continue(code) | Flow::Exit(code) => code,
        }
    }
}

/// A minimal shell-like interpreter that can execute built-in and external commands.
///
/// The interpreter owns an [`Environment`], an immutable [`BuiltinRegistry`]
/// and the [`Console`] it treats as its own standard streams.
///
/// Example
/// ```
/// use myshell::{Flow, Interpreter, MemConsole};
/// let console = MemConsole::new();
/// let mut sh = Interpreter::with_console(Box::new(console.clone()));
/// assert_eq!(sh.run_line("echo hello   world"), Flow::Continue(0));
/// assert_eq!(console.stdout_text(), "hello world\n");
/// ```
pub struct Interpreter {
    env: Environment,
    builtins: BuiltinRegistry,
    console: Box<dyn Console>,
    last_status: ExitCode,
}

impl Interpreter {
    pub fn new(env: Environment, builtins: BuiltinRegistry, console: Box<dyn Console>) -> Self {
        log::debug!("builtins: {}", builtins.names().join(" "));
        Self {
            env,
            builtins,
            console,
            last_status: 0,
        }
    }

    /// Default builtins and the captured process environment, talking to `console`.
    pub fn with_console(console: Box<dyn Console>) -> Self {
        Self::new(Environment::new(), BuiltinRegistry::default(), console)
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// Status of the most recently completed line.
    pub fn last_status(&self) -> ExitCode {
        self.last_status
    }

    /// Parse and run one line of input.
    ///
    /// Errors never escape: they are written to the console's stdout and the
    /// line's status is set accordingly.
    pub fn run_line(&mut self, line: &str) -> Flow {
        log::debug!("input line: {line:?}");
        let status = match parser::parse_line(line).and_then(|cmd| self.dispatch(cmd)) {
            Ok(code) => code,
            Err(err) => {
                self.report(&err);
                match err {
                    ShellError::CommandNotFound(_) => NOT_FOUND,
                    _ => FAILURE,
                }
            }
        };
        self.last_status = status;

        match self.env.exit_requested() {
            Some(code) => Flow::Exit(code),
            None => Flow::Continue(status),
        }
    }

    /// Run a parsed command with its redirection applied.
    ///
    /// The redirection target, if any, is opened before anything runs and is
    /// closed when this returns, whatever the outcome.
    pub fn dispatch(&mut self, cmd: ParsedCommand) -> Result<ExitCode> {
        if cmd.is_empty() {
            return Ok(0);
        }

        let (mut stdout, stderr) = self.bind_streams(&cmd)?;

        if let Some(builtin) = self.builtins.get(&cmd.name) {
            log::debug!("running builtin {}", cmd.name);
            let mut ctx = BuiltinContext {
                env: &mut self.env,
                builtins: &self.builtins,
            };
            let status = builtin.execute(&cmd.args, &mut stdout, &mut ctx);
            stdout.flush()?;
            return status;
        }

        let external = ExternalCommand::resolve(&self.env, &cmd.name, &cmd.args)
            .ok_or_else(|| ShellError::CommandNotFound(cmd.name.clone()))?;
        log::debug!("running {} as {}", cmd.name, external.program().display());
        external.execute(stdout, stderr, &self.env)
    }

    fn bind_streams(&self, cmd: &ParsedCommand) -> Result<(Box<dyn Stdout>, Box<dyn Stdout>)> {
        let Some(redirect) = &cmd.redirect else {
            return Ok((self.console.stdout(), self.console.stderr()));
        };

        let file = Box::new(redirect.open()?);
        Ok(match redirect.stream {
            Stream::Stdout => (file, self.console.stderr()),
            Stream::Stderr => (self.console.stdout(), file),
        })
    }

    fn report(&self, err: &ShellError) {
        log::debug!("reporting {err:?}");
        let mut out = self.console.stdout();
        if writeln!(out, "{err}").and_then(|_| out.flush()).is_err() {
            log::warn!("could not report error: {err}");
        }
    }

    /// Read-eval loop over an interactive line editor.
    ///
    /// Returns the status the process should exit with: the one given to
    /// `exit`, 130 on Ctrl-C at the prompt, or 1 when input can no longer
    /// be read.
    pub fn repl(&mut self) -> anyhow::Result<ExitCode> {
        let mut rl = DefaultEditor::new().context("failed to initialize line editor")?;

        loop {
            let line = match rl.readline(PROMPT) {
                Ok(line) => line,
                Err(err) => return self.read_failed(err),
            };

            if !line.trim().is_empty() {
                if let Err(err) = rl.add_history_entry(line.as_str()) {
                    log::warn!("failed to record history: {err}");
                }
            }

            if let Flow::Exit(code) = self.run_line(&line) {
                return Ok(code);
            }
        }
    }

    /// Exit status for a failed prompt read.
    fn read_failed(&self, err: ReadlineError) -> anyhow::Result<ExitCode> {
        log::debug!("read failed: {err:?}");
        if let ReadlineError::Interrupted = err {
            return Ok(INTERRUPTED);
        }

        let mut out = self.console.stdout();
        writeln!(out, "Error reading input: {err}")?;
        out.flush()?;
        Ok(FAILURE)
    }
}

impl Default for Interpreter {
    /// The process environment, the default builtins and the real stdout/stderr.
    fn default() -> Self {
        Self::with_console(Box::new(ProcessConsole))
    }
}
