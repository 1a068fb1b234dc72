use anyhow::Result;
use argh::FromArgs;
use myshell::Interpreter;
use std::io::Write;

#[derive(FromArgs)]
/// A small interactive shell with quoting, builtins and output redirection.
struct ShellArgs {
    #[argh(option, short = 'c')]
    /// run a single command line, then exit with its status
    command: Option<String>,

    #[argh(switch, short = 'v')]
    /// log dispatch decisions to stderr
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn main() -> Result<()> {
    let args: ShellArgs = argh::from_env();
    init_logging(args.verbose);

    let mut shell = Interpreter::default();
    let code = match args.command {
        Some(line) => shell.run_line(&line).code(),
        None => shell.repl()?,
    };

    std::io::stdout().flush()?;
    std::process::exit(code)
}
