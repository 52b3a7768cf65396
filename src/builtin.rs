use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::env::Environment;
use crate::interpreter::Factory;
use anyhow::{Context, Result, anyhow, bail};
use argh::{EarlyExit, FromArgs};
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "cd" or "exit".
    fn name() -> &'static str;

    /// Executes the command against the interpreter's environment.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(self, stderr: &mut dyn Write, env: &mut Environment) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        _stdout: &mut dyn Write,
        stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        match T::execute(*self, stderr, env) {
            Ok(x) => Ok(x),
            Err(e) => {
                writeln!(stderr, "{}: {:#}", crate::SHELL_NAME, e)?;
                Ok(1)
            }
        }
    }
}

/// Outcome of a builtin whose arguments argh rejected, or of `--help`.
struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        if self.is_error {
            writeln!(stderr, "{}", self.output.trim_end())?;
            Ok(1)
        } else {
            writeln!(stdout, "{}", self.output.trim_end())?;
            Ok(0)
        }
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(match T::from_args(&[name], args) {
                Ok(cmd) => Box::new(cmd),
                Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                    output,
                    is_error: status.is_err(),
                }),
            })
        } else {
            None
        }
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
/// If no target is provided, changes to the home directory of the invoking user.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory. Defaults to the home directory when omitted.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(self, _stderr: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        let target = match &self.target {
            Some(t) if !t.is_empty() => PathBuf::from(t),
            _ => match env.home_dir() {
                Some(home) => home.to_path_buf(),
                None => bail!("cd: home directory unknown"),
            },
        };

        let new_dir = if target.is_absolute() {
            target
        } else {
            env.current_dir.join(target)
        };

        let canonical = fs::canonicalize(&new_dir)
            .with_context(|| format!("cd: {}", new_dir.display()))?;

        env::set_current_dir(&canonical)
            .with_context(|| format!("cd: {}", canonical.display()))?;
        log::debug!("working directory is now {}", canonical.display());
        env.current_dir = canonical;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Leave the shell with the given status (0 when omitted).
pub struct Exit {
    #[argh(positional)]
    /// exit status, reduced modulo 256.
    pub code: Option<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    /// Only computes the status; stopping the session is the read loop's job.
    fn execute(self, stderr: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode> {
        match parse_exit_code(self.code.as_deref()) {
            Ok(code) => Ok(code),
            Err(e) => {
                writeln!(stderr, "{}: {}", crate::SHELL_NAME, e)?;
                Ok(2)
            }
        }
    }
}

/// Interpret the optional argument of `exit`.
pub(crate) fn parse_exit_code(arg: Option<&str>) -> Result<ExitCode> {
    let Some(arg) = arg else {
        return Ok(0);
    };
    let value: i64 = arg
        .parse()
        .map_err(|_| anyhow!("exit: {}: numeric argument required", arg))?;
    Ok(value.rem_euclid(256) as ExitCode)
}
