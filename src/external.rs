use crate::command::{ExitCode, Stdout};
use crate::env::Environment;
use crate::error::{Result, ShellError};
use std::borrow::Cow;
use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

/// Command that is not a builtin, resolved to an executable on disk.
#[derive(Debug)]
pub struct ExternalCommand {
    name: String,
    program: PathBuf,
    args: Vec<String>,
}

impl ExternalCommand {
    /// Look `name` up the way a shell does and bind it to `args`.
    ///
    /// Returns `None` when no executable can be found.
    pub fn resolve(env: &Environment, name: &str, args: &[String]) -> Option<Self> {
        let search_paths = env.search_path();
        let program = find_command_path(&search_paths, Path::new(name))?.into_owned();
        Some(Self {
            name: name.to_string(),
            program,
            args: args.to_vec(),
        })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Launch the program and block until it exits.
    ///
    /// The child sees the shell's stdin, the given output streams and the
    /// environment's variables and working directory. `argv[0]` is the name
    /// as typed, not the resolved path.
    pub fn execute(
        self,
        stdout: Box<dyn Stdout>,
        stderr: Box<dyn Stdout>,
        env: &Environment,
    ) -> Result<ExitCode> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(stdout.stdio())
            .stderr(stderr.stdio())
            .env_clear()
            .envs(env.vars.iter())
            .current_dir(&env.current_dir);
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.arg0(&self.name);
        }

        log::debug!("spawning {} {:?}", self.program.display(), self.args);
        let mut child = cmd.spawn().map_err(|e| {
            log::debug!("failed to spawn {}: {e}", self.program.display());
            ShellError::CommandNotFound(self.name.clone())
        })?;
        // Dropping `cmd` closes the parent's copies of redirected descriptors.
        drop(cmd);

        let exit_status = child.wait()?;
        log::debug!("{} exited with {exit_status}", self.name);
        Ok(match exit_status.code() {
            Some(x) => x,
            None => terminated_by_signal(exit_status),
        })
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it is an executable file.
/// - Any path containing a separator (`./foo`, `bin/sh`): returns it if it is
///   an executable file relative to the current directory.
/// - Single path component: searches each directory in `search_paths` (PATH)
///   in order and returns the first executable match.
/// - Empty path: returns `None`.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        (None, None) => None,
        (Some(Component::Normal(x)), None) => {
            find_in_path(search_paths, x).map(Cow::Owned)
        }
        _ => find_by_path(path).map(Cow::Borrowed),
    }
}

/// First executable file named `cmd` directly inside one of `search_paths`.
///
/// `cmd` must be a plain file name. Empty and relative entries of
/// `search_paths` are ignored, so the result is always an absolute path.
pub fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    let mut components = Path::new(cmd).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => {}
        _ => return None,
    }

    std::env::split_paths(search_paths)
        .filter(|dir| dir.is_absolute())
        .map(|dir| dir.join(cmd))
        .find(|candidate| is_executable(candidate))
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if is_executable(path) { Some(path) } else { None }
}

/// Regular file with at least one execute bit set.
pub fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}
