use crate::error::{Result, ShellError};
use crate::lexer;
use crate::redirect::{self, Redirection};

/// A command line ready for dispatch.
///
/// `name` is the first token, `args` are the remaining tokens with the
/// redirection operator and its target removed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedCommand {
    pub name: String,
    pub args: Vec<String>,
    pub redirect: Option<Redirection>,
}

impl ParsedCommand {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
            redirect: None,
        }
    }

    pub fn with_redirect(mut self, redirect: Redirection) -> Self {
        self.redirect = Some(redirect);
        self
    }

    /// True for a blank input line.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

/// Builds a [`ParsedCommand`] from already tokenized input.
///
/// An empty token list yields an empty command. A line that begins with a
/// redirection operator has no command name and is rejected.
pub fn construct_command(mut tokens: Vec<String>) -> Result<ParsedCommand> {
    if tokens.is_empty() {
        return Ok(ParsedCommand::default());
    }

    let name = tokens.remove(0);
    if redirect::is_operator(&name) {
        return Err(ShellError::MalformedRedirection { operator: name });
    }

    let (args, redirect) = redirect::extract_redirection(tokens)?;
    Ok(ParsedCommand {
        name,
        args,
        redirect,
    })
}

/// Tokenizes and parses one input line.
pub fn parse_line(line: &str) -> Result<ParsedCommand> {
    construct_command(lexer::tokenize(line))
}
