//! Lexical analysis of a single input line into argument tokens.
//!
//! Quoting follows the POSIX rules a shell user expects: single quotes keep
//! everything literal, double quotes keep everything literal except a handful
//! of backslash escapes, and a bare backslash makes the next character literal.
//! The lexer is permissive: unterminated quotes simply run to the end of the
//! line and never produce an error.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    /// Outside any quotes.
    Bare,
    /// Inside `'...'`.
    InSingle,
    /// Inside `"..."`.
    InDouble,
    /// The next character is taken literally, then scanning resumes in
    /// `InDouble` or `Bare`.
    Escaped { in_double: bool },
}

/// Characters a backslash may escape inside double quotes.
const DOUBLE_QUOTE_ESCAPABLE: [char; 4] = ['\\', '$', '"', '\n'];

struct LexingFSM {
    input: Vec<char>,
    pos: usize,
    state: LexingState,
    buffer: String,
}

impl LexingFSM {
    fn new(line: &str) -> Self {
        LexingFSM {
            input: line.trim().chars().collect(),
            pos: 0,
            state: LexingState::Bare,
            buffer: String::new(),
        }
    }

    /// Runs the scan to completion and returns the finished tokens.
    fn make_tokens(mut self) -> Vec<String> {
        let mut out = Vec::new();

        while let Some(ch) = self.read_char() {
            match self.state {
                LexingState::Bare => self.handle_bare(ch, &mut out),
                LexingState::InSingle => self.handle_single_quote(ch),
                LexingState::InDouble => self.handle_double_quote(ch),
                LexingState::Escaped { in_double } => self.handle_escaped(ch, in_double),
            }
        }

        // A dangling backslash has nothing to escape, keep it.
        if let LexingState::Escaped { .. } = self.state {
            self.buffer.push('\\');
        }
        self.flush(&mut out);

        out
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn handle_bare(&mut self, ch: char, out: &mut Vec<String>) {
        match ch {
            '\\' => self.state = LexingState::Escaped { in_double: false },
            '\'' => self.state = LexingState::InSingle,
            '"' => self.state = LexingState::InDouble,
            ' ' => self.flush(out),
            c => self.buffer.push(c),
        }
    }

    fn handle_single_quote(&mut self, ch: char) {
        match ch {
            '\'' => self.state = LexingState::Bare,
            c => self.buffer.push(c),
        }
    }

    fn handle_double_quote(&mut self, ch: char) {
        match ch {
            '"' => self.state = LexingState::Bare,
            '\\' => match self.peek_char() {
                Some(next) if DOUBLE_QUOTE_ESCAPABLE.contains(&next) => {
                    self.state = LexingState::Escaped { in_double: true };
                }
                _ => self.buffer.push('\\'),
            },
            c => self.buffer.push(c),
        }
    }

    fn handle_escaped(&mut self, ch: char, in_double: bool) {
        self.buffer.push(ch);
        self.state = if in_double {
            LexingState::InDouble
        } else {
            LexingState::Bare
        };
    }

    fn flush(&mut self, out: &mut Vec<String>) {
        if !self.buffer.is_empty() {
            out.push(std::mem::take(&mut self.buffer));
        }
    }
}

/// Splits `line` into unquoted, unescaped argument tokens.
///
/// Leading and trailing whitespace is ignored and an empty line yields no
/// tokens. Only an unquoted space separates tokens.
///
/// ```
/// use myshell::lexer::tokenize;
/// assert_eq!(tokenize("echo 'a b' c"), vec!["echo", "a b", "c"]);
/// ```
pub fn tokenize(line: &str) -> Vec<String> {
    LexingFSM::new(line).make_tokens()
}
