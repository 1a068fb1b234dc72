use crate::command::{Console, Stdout};
use std::cell::RefCell;
use std::io::{self, Result as IoResult, Write};
use std::process::Stdio;
use std::rc::Rc;

/// [`Console`] bound to the real process stdout and stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessConsole;

impl Console for ProcessConsole {
    fn stdout(&self) -> Box<dyn Stdout> {
        Box::new(io::stdout())
    }

    fn stderr(&self) -> Box<dyn Stdout> {
        Box::new(io::stderr())
    }
}

/// Memory-backed writer for capturing output from builtins.
pub struct MemWriter {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl MemWriter {
    pub fn new() -> Self {
        Self::sharing(Rc::new(RefCell::new(Vec::new())))
    }

    /// Writer appending into an existing shared buffer.
    pub fn sharing(buf: Rc<RefCell<Vec<u8>>>) -> Self {
        Self { buf }
    }
}

impl Default for MemWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

impl Stdout for MemWriter {
    /// Child processes cannot write into process memory, so their output
    /// is discarded.
    fn stdio(self: Box<Self>) -> Stdio {
        Stdio::null()
    }
}

/// [`Console`] that records everything written to it.
///
/// Useful to drive an [`crate::Interpreter`] from tests or from an embedding
/// program. Output of external programs that are not redirected is dropped.
#[derive(Default, Clone)]
pub struct MemConsole {
    out: Rc<RefCell<Vec<u8>>>,
    err: Rc<RefCell<Vec<u8>>>,
}

impl MemConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.out.borrow()).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.err.borrow()).into_owned()
    }

    /// Forget everything captured so far.
    pub fn clear(&self) {
        self.out.borrow_mut().clear();
        self.err.borrow_mut().clear();
    }
}

impl Console for MemConsole {
    fn stdout(&self) -> Box<dyn Stdout> {
        Box::new(MemWriter::sharing(self.out.clone()))
    }

    fn stderr(&self) -> Box<dyn Stdout> {
        Box::new(MemWriter::sharing(self.err.clone()))
    }
}
