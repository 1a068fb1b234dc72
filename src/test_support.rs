//! Helpers shared by unit tests.

use crate::env::Environment;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock};

/// Serializes tests that read or change the process working directory.
pub fn lock_current_dir() -> MutexGuard<'static, ()> {
    static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
    MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Environment with no variables, rooted at the process working directory.
pub fn empty_env() -> Environment {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
    Environment::with_vars(Vec::<(String, String)>::new(), cwd)
}

/// Writes an executable `/bin/sh` script named `name` into `dir`.
#[cfg(unix)]
pub fn make_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod script");
    path
}
