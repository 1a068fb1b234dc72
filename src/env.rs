use crate::command::ExitCode;
use std::collections::HashMap;
use std::env as stdenv;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The interpreter's view of the process environment.
///
/// The environment contains:
/// - `vars`: variables captured at startup and passed on to launched programs.
/// - `current_dir`: mirror of the process working directory, kept in sync by [`Environment::change_dir`].
/// - `exit_request`: set by the `exit` builtin; the read loop stops once it is present.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    exit_request: Option<ExitCode>,
}

impl Environment {
    /// Capture the current process state. Variables that are not valid
    /// UTF-8 are skipped.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let vars = stdenv::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)));
        Self::with_vars(vars, current_dir)
    }

    /// Build an environment from explicit variables, without consulting the process.
    pub fn with_vars<I, K, V>(vars: I, current_dir: PathBuf) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            current_dir,
            exit_request: None,
        }
    }

    pub fn get_var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Raw `PATH` value, empty when unset.
    pub fn search_path(&self) -> OsString {
        self.get_var("PATH").map(OsString::from).unwrap_or_default()
    }

    pub fn home_dir(&self) -> Option<PathBuf> {
        self.get_var("HOME")
            .filter(|home| !home.is_empty())
            .map(PathBuf::from)
    }

    /// Change the process working directory and update the mirror.
    ///
    /// Relative paths are resolved against [`Environment::current_dir`]. On
    /// error neither the process nor the mirror is touched.
    pub fn change_dir(&mut self, path: &Path) -> io::Result<()> {
        let target = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.current_dir.join(path)
        };

        let canonical = fs::canonicalize(&target)?;
        stdenv::set_current_dir(&canonical)?;
        log::debug!("working directory is now {}", canonical.display());
        self.current_dir = canonical;
        Ok(())
    }

    pub fn request_exit(&mut self, code: ExitCode) {
        self.exit_request = Some(code);
    }

    pub fn exit_requested(&self) -> Option<ExitCode> {
        self.exit_request
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
