//! Commands implemented inside the shell process.

use crate::command::ExitCode;
use crate::env::Environment;
use crate::error::{Result, ShellError};
use crate::external;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

/// What a builtin may touch besides its output stream.
pub struct BuiltinContext<'a> {
    pub env: &'a mut Environment,
    pub builtins: &'a BuiltinRegistry,
}

/// Built-in commands known to the shell at compile time.
///
/// Builtins are executed directly in-process without spawning a child process.
pub trait BuiltinCommand {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name(&self) -> &'static str;

    /// Executes the command, writing regular output to `stdout`.
    ///
    /// Diagnostics are returned as errors and reported by the interpreter
    /// on the shell's own output, never through `stdout`.
    fn execute(
        &self,
        args: &[String],
        stdout: &mut dyn Write,
        ctx: &mut BuiltinContext<'_>,
    ) -> Result<ExitCode>;
}

/// Name → builtin table. Built once and never modified afterwards.
pub struct BuiltinRegistry {
    table: HashMap<&'static str, Box<dyn BuiltinCommand>>,
}

impl BuiltinRegistry {
    /// Registry with exactly the given commands. A later entry with the same
    /// name replaces an earlier one.
    pub fn new(commands: Vec<Box<dyn BuiltinCommand>>) -> Self {
        let table = commands.into_iter().map(|cmd| (cmd.name(), cmd)).collect();
        Self { table }
    }

    pub fn get(&self, name: &str) -> Option<&dyn BuiltinCommand> {
        self.table.get(name).map(|cmd| cmd.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Registered names in alphabetical order.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.table.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for BuiltinRegistry {
    /// `cd`, `echo`, `exit`, `pwd` and `type`.
    fn default() -> Self {
        Self::new(vec![
            Box::new(Cd),
            Box::new(Echo),
            Box::new(Exit),
            Box::new(Pwd),
            Box::new(Type),
        ])
    }
}

/// Print the current working directory.
pub struct Pwd;

impl BuiltinCommand for Pwd {
    fn name(&self) -> &'static str {
        "pwd"
    }

    fn execute(
        &self,
        _args: &[String],
        stdout: &mut dyn Write,
        ctx: &mut BuiltinContext<'_>,
    ) -> Result<ExitCode> {
        writeln!(stdout, "{}", ctx.env.current_dir.display())?;
        Ok(0)
    }
}

/// Change the current working directory.
///
/// A leading `~` stands for `$HOME`. The target is normalized lexically
/// before the change, so `a/../b` never requires `a` to exist.
pub struct Cd;

impl BuiltinCommand for Cd {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn execute(
        &self,
        args: &[String],
        _stdout: &mut dyn Write,
        ctx: &mut BuiltinContext<'_>,
    ) -> Result<ExitCode> {
        let Some(target) = args.first() else {
            return Err(ShellError::MissingArgument("cd"));
        };

        let expanded = match target.strip_prefix('~') {
            Some(rest) => match ctx.env.home_dir() {
                Some(home) => home.join(rest.trim_start_matches('/')),
                None => return Err(ShellError::NoSuchDirectory(target.clone())),
            },
            None => PathBuf::from(target),
        };

        ctx.env
            .change_dir(&normalize(&expanded))
            .map_err(|e| {
                log::debug!("cd {target}: {e}");
                ShellError::NoSuchDirectory(target.clone())
            })?;
        Ok(0)
    }
}

/// Lexically clean `path`: drop `.` and repeated separators, fold `..` into
/// the preceding component where there is one.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Write the arguments separated by single spaces, followed by a newline.
pub struct Echo;

impl BuiltinCommand for Echo {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn execute(
        &self,
        args: &[String],
        stdout: &mut dyn Write,
        _ctx: &mut BuiltinContext<'_>,
    ) -> Result<ExitCode> {
        writeln!(stdout, "{}", args.join(" "))?;
        Ok(0)
    }
}

/// Exit the shell.
///
/// The status is the first argument, `0` when absent and `1` when it is not
/// an integer. The interpreter stops reading input once this has run.
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn execute(
        &self,
        args: &[String],
        _stdout: &mut dyn Write,
        ctx: &mut BuiltinContext<'_>,
    ) -> Result<ExitCode> {
        let code = match args.first() {
            Some(arg) => arg.parse::<ExitCode>().unwrap_or(1),
            None => 0,
        };
        ctx.env.request_exit(code);
        Ok(code)
    }
}

/// Describe how each name would be interpreted as a command.
pub struct Type;

impl BuiltinCommand for Type {
    fn name(&self) -> &'static str {
        "type"
    }

    fn execute(
        &self,
        args: &[String],
        stdout: &mut dyn Write,
        ctx: &mut BuiltinContext<'_>,
    ) -> Result<ExitCode> {
        let search_paths = ctx.env.search_path();
        let mut status = 0;
        for name in args {
            if ctx.builtins.contains(name) {
                writeln!(stdout, "{name} is a shell builtin")?;
            } else if let Some(path) = external::find_in_path(&search_paths, OsStr::new(name)) {
                writeln!(stdout, "{name} is {}", path.display())?;
            } else {
                writeln!(stdout, "{name} not found")?;
                status = 1;
            }
        }
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{empty_env, lock_current_dir, make_script};
    use std::env as stdenv;
    use std::fs;

    fn run(
        builtin: &dyn BuiltinCommand,
        args: &[&str],
        env: &mut Environment,
    ) -> (Result<ExitCode>, String) {
        let registry = BuiltinRegistry::default();
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let mut out = Vec::new();
        let mut ctx = BuiltinContext {
            env,
            builtins: &registry,
        };
        let res = builtin.execute(&args, &mut out, &mut ctx);
        (res, String::from_utf8(out).unwrap())
    }

    #[test]
    fn registry_holds_default_builtins() {
        let registry = BuiltinRegistry::default();
        assert_eq!(registry.names(), vec!["cd", "echo", "exit", "pwd", "type"]);
        assert!(registry.contains("cd"));
        assert!(!registry.contains("ls"));
        assert_eq!(registry.get("echo").map(|b| b.name()), Some("echo"));
        assert!(registry.get("cat").is_none());
    }

    #[test]
    fn registry_later_entry_wins() {
        struct Loud;
        impl BuiltinCommand for Loud {
            fn name(&self) -> &'static str {
                "echo"
            }
            fn execute(
                &self,
                args: &[String],
                stdout: &mut dyn Write,
                _ctx: &mut BuiltinContext<'_>,
            ) -> Result<ExitCode> {
                writeln!(stdout, "{}", args.join(" ").to_uppercase())?;
                Ok(0)
            }
        }

        let registry = BuiltinRegistry::new(vec![Box::new(Echo), Box::new(Loud)]);
        let mut env = empty_env();
        let (res, out) = run(registry.get("echo").unwrap(), &["hi"], &mut env);
        assert_eq!(res.unwrap(), 0);
        assert_eq!(out, "HI\n");
    }

    #[test]
    fn test_echo_joins_with_single_spaces() {
        let mut env = empty_env();
        let (res, out) = run(&Echo, &["hello", "world"], &mut env);
        assert_eq!(res.unwrap(), 0);
        assert_eq!(out, "hello world\n");

        let (_, out) = run(&Echo, &["a  b", "c"], &mut env);
        assert_eq!(out, "a  b c\n");

        let (_, out) = run(&Echo, &[], &mut env);
        assert_eq!(out, "\n");
    }

    #[test]
    fn test_echo_prints_flags_verbatim() {
        let mut env = empty_env();
        let (_, out) = run(&Echo, &["-n", "x"], &mut env);
        assert_eq!(out, "-n x\n");
    }

    #[test]
    fn test_pwd_prints_current_dir() {
        let mut env = empty_env();
        env.current_dir = PathBuf::from("/some/where");
        let (res, out) = run(&Pwd, &[], &mut env);
        assert_eq!(res.unwrap(), 0);
        assert_eq!(out, "/some/where\n");
    }

    #[test]
    fn test_exit_codes() {
        let cases: [(&[&str], ExitCode); 5] = [
            (&[], 0),
            (&["7"], 7),
            (&["abc"], 1),
            (&["0", "extra"], 0),
            (&["-3"], -3),
        ];
        for (args, expected) in cases {
            let mut env = empty_env();
            let (res, out) = run(&Exit, args, &mut env);
            assert_eq!(res.unwrap(), expected, "exit {args:?}");
            assert_eq!(env.exit_requested(), Some(expected), "exit {args:?}");
            assert!(out.is_empty());
        }
    }

    #[test]
    fn test_type_builtin_and_missing() {
        let mut env = empty_env();
        env.set_var("PATH", "/nonexistent-dir-for-type-test");

        let (res, out) = run(&Type, &["cd"], &mut env);
        assert_eq!(res.unwrap(), 0);
        assert_eq!(out, "cd is a shell builtin\n");

        let (res, out) = run(&Type, &["nonexistent_cmd_xyz"], &mut env);
        assert_eq!(res.unwrap(), 1);
        assert_eq!(out, "nonexistent_cmd_xyz not found\n");

        let (_, out) = run(&Type, &["type", "exit"], &mut env);
        assert_eq!(out, "type is a shell builtin\nexit is a shell builtin\n");
    }

    #[test]
    fn test_type_no_args_prints_nothing() {
        let mut env = empty_env();
        let (res, out) = run(&Type, &[], &mut env);
        assert_eq!(res.unwrap(), 0);
        assert!(out.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_type_searches_path_in_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(first.path().join("my_tool"), "not executable").unwrap();
        let expected = make_script(second.path(), "my_tool", "exit 0");
        make_script(second.path(), "echo", "exit 0");

        let mut env = empty_env();
        let search = stdenv::join_paths([first.path(), second.path()]).unwrap();
        env.set_var("PATH", search.to_string_lossy());

        let (res, out) = run(&Type, &["my_tool", "echo"], &mut env);
        assert_eq!(res.unwrap(), 0);
        assert_eq!(
            out,
            format!(
                "my_tool is {}\necho is a shell builtin\n",
                expected.display()
            )
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_type_reports_only_full_paths() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let temp = tempfile::tempdir().unwrap();
        make_script(temp.path(), "localtool", "exit 0");

        let mut env = empty_env();
        env.set_var("PATH", "/nonexistent-x:");

        stdenv::set_current_dir(temp.path()).expect("set cwd");
        let (res, out) = run(&Type, &["localtool", "/bin/sh", "./localtool"], &mut env);
        stdenv::set_current_dir(orig).expect("failed to restore cwd");

        assert_eq!(res.unwrap(), 1);
        assert_eq!(
            out,
            "localtool not found\n/bin/sh not found\n./localtool not found\n"
        );
    }

    #[test]
    fn test_cd_without_argument() {
        let mut env = empty_env();
        let before = env.current_dir.clone();
        let (res, _) = run(&Cd, &[], &mut env);
        assert!(matches!(res, Err(ShellError::MissingArgument("cd"))));
        assert_eq!(env.current_dir, before);
    }

    #[test]
    fn test_cd_to_absolute_path() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let temp = tempfile::tempdir().unwrap();
        let canonical_temp = fs::canonicalize(temp.path()).unwrap();

        let mut env = empty_env();
        let (res, _) = run(&Cd, &[canonical_temp.to_str().unwrap()], &mut env);
        assert_eq!(res.unwrap(), 0);
        assert_eq!(env.current_dir, canonical_temp);
        assert_eq!(
            fs::canonicalize(stdenv::current_dir().unwrap()).unwrap(),
            canonical_temp
        );

        stdenv::set_current_dir(orig).expect("failed to restore cwd");
    }

    #[test]
    fn test_cd_relative_with_dots() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let temp = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(temp.path()).unwrap();
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::create_dir_all(root.join("c")).unwrap();

        let mut env = empty_env();
        env.change_dir(&root.join("a/b")).unwrap();

        let (res, _) = run(&Cd, &["./../../c/."], &mut env);
        assert_eq!(res.unwrap(), 0);
        assert_eq!(env.current_dir, root.join("c"));

        let (res, _) = run(&Cd, &[".."], &mut env);
        assert_eq!(res.unwrap(), 0);
        assert_eq!(env.current_dir, root);

        stdenv::set_current_dir(orig).expect("failed to restore cwd");
    }

    #[test]
    fn test_cd_tilde_expands_home() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let temp = tempfile::tempdir().unwrap();
        let home = fs::canonicalize(temp.path()).unwrap();
        fs::create_dir(home.join("projects")).unwrap();

        let mut env = empty_env();
        env.set_var("HOME", home.to_string_lossy());

        let (res, _) = run(&Cd, &["~/projects"], &mut env);
        assert_eq!(res.unwrap(), 0);
        assert_eq!(env.current_dir, home.join("projects"));

        let (res, _) = run(&Cd, &["~"], &mut env);
        assert_eq!(res.unwrap(), 0);
        assert_eq!(env.current_dir, home);

        stdenv::set_current_dir(orig).expect("failed to restore cwd");
    }

    #[test]
    fn test_cd_tilde_missing_reports_typed_path() {
        let _lock = lock_current_dir();
        let temp = tempfile::tempdir().unwrap();
        let mut env = empty_env();
        env.set_var("HOME", temp.path().to_string_lossy());
        let before = env.current_dir.clone();

        let (res, _) = run(&Cd, &["~/missing/../missing"], &mut env);
        assert_eq!(
            res.unwrap_err().to_string(),
            "cd: ~/missing/../missing: No such file or directory"
        );
        assert_eq!(env.current_dir, before);
    }

    #[test]
    fn test_cd_tilde_without_home() {
        let mut env = empty_env();
        let (res, _) = run(&Cd, &["~"], &mut env);
        assert_eq!(
            res.unwrap_err().to_string(),
            "cd: ~: No such file or directory"
        );
    }

    #[test]
    fn test_cd_nonexistent_path_errors() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let mut env = empty_env();
        let before = env.current_dir.clone();

        let name = format!("/nonexistent_dir_for_cd_test_{}", std::process::id());
        let (res, out) = run(&Cd, &[name.as_str()], &mut env);

        assert_eq!(
            res.unwrap_err().to_string(),
            format!("cd: {name}: No such file or directory")
        );
        assert!(out.is_empty());
        assert_eq!(env.current_dir, before);
        assert_eq!(stdenv::current_dir().unwrap(), orig);
    }

    #[test]
    fn test_cd_into_file_fails() {
        let _lock = lock_current_dir();
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("plain.txt");
        fs::write(&file, "x").unwrap();

        let mut env = empty_env();
        let before = env.current_dir.clone();
        let (res, _) = run(&Cd, &[file.to_str().unwrap()], &mut env);
        assert!(matches!(res, Err(ShellError::NoSuchDirectory(_))));
        assert_eq!(env.current_dir, before);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("a/./b//c")), PathBuf::from("a/b/c"));
        assert_eq!(normalize(Path::new("a/../b")), PathBuf::from("b"));
        assert_eq!(normalize(Path::new("a/..")), PathBuf::from("."));
        assert_eq!(normalize(Path::new("../x")), PathBuf::from("../x"));
        assert_eq!(normalize(Path::new("../../x")), PathBuf::from("../../x"));
        assert_eq!(normalize(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(normalize(Path::new("/usr/./lib/../bin/")), PathBuf::from("/usr/bin"));
        assert_eq!(normalize(Path::new("")), PathBuf::from("."));
    }
}
