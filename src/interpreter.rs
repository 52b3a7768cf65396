use crate::SHELL_NAME;
use crate::command::{Command, CommandFactory, ExitCode};
use crate::env::Environment;
use crate::error::CommandError;
use crate::external::{ProcessSpawner, SpawnRequest, Spawner, Termination, find_command_path};
use crate::validate::validate;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, Write};

/// Result code for a child that did not exit normally.
pub const GENERIC_FAILURE: ExitCode = 1;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports the builtins defined in this crate.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// Runs one [`Command`]: either a builtin in-process or an external program
/// in a child process, and records the outcome on the command.
///
/// Example
/// ```
/// use dsh::{Command, Environment, Executor};
/// let mut executor = Executor::new(Environment::new());
/// let mut cmd = Command::parse("true");
/// assert_eq!(executor.execute(&mut cmd), 0);
/// ```
pub struct Executor<S = ProcessSpawner> {
    env: Environment,
    builtins: Vec<Box<dyn CommandFactory>>,
    spawner: S,
}

impl Executor {
    /// Executor that launches real processes.
    pub fn new(env: Environment) -> Self {
        Self::with_spawner(env, ProcessSpawner)
    }
}

impl<S: Spawner> Executor<S> {
    /// Create an executor with the default builtins (`cd`, `exit`) and a custom spawner.
    pub fn with_spawner(env: Environment, spawner: S) -> Self {
        use crate::builtin::*;
        Self {
            env,
            builtins: vec![
                Box::new(Factory::<Cd>::default()),
                Box::new(Factory::<Exit>::default()),
            ],
            spawner,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    #[cfg(test)]
    fn spawner(&self) -> &S {
        &self.spawner
    }

    /// Execute `command`, writing shell diagnostics to the process's stdout and stderr.
    pub fn execute(&mut self, command: &mut Command) -> ExitCode {
        self.execute_with(command, &mut io::stdout(), &mut io::stderr())
    }

    /// Execute `command` and return its result code, which is also stored on it.
    ///
    /// Never fails: every problem is reported on `stderr` and folded into the
    /// result code. Spawned children write straight to the inherited stdio.
    pub fn execute_with(
        &mut self,
        command: &mut Command,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> ExitCode {
        let args: Vec<&str> = command.args().iter().map(String::as_str).collect();
        for factory in &self.builtins {
            if let Some(builtin) = factory.try_create(command.name(), &args) {
                let code = builtin
                    .execute(stdout, stderr, &mut self.env)
                    .unwrap_or_else(|e| {
                        log::warn!("builtin {} failed: {:#}", command.name(), e);
                        GENERIC_FAILURE
                    });
                command.set_result_code(code);
                return code;
            }
        }

        if let Err(e) = self.run_external(command) {
            let _ = writeln!(stderr, "{}: {}", SHELL_NAME, e);
            if let Some(code) = e.exit_code() {
                command.set_result_code(code);
            }
        }
        command.result_code()
    }

    fn run_external(&mut self, command: &mut Command) -> Result<(), CommandError> {
        command.set_resolved_path(find_command_path(self.env.search_path(), command.name()));
        let program = validate(command.resolved_path(), command.name())?;
        let request = SpawnRequest {
            program,
            argv: command.arguments(),
            current_dir: &self.env.current_dir,
        };
        let termination =
            self.spawner
                .spawn_and_wait(&request)
                .map_err(|source| CommandError::Spawn {
                    name: command.name().into(),
                    source,
                })?;
        if let Termination::ExecFailed(errno) = termination {
            return Err(CommandError::Exec {
                name: command.name().into(),
                source: io::Error::from_raw_os_error(errno),
            });
        }
        command.set_result_code(result_code_for(command.name(), termination));
        Ok(())
    }
}

fn result_code_for(name: &str, termination: Termination) -> ExitCode {
    match termination {
        Termination::Exited(code) => code,
        Termination::Signaled(signal) => {
            log::info!("{} terminated by signal {}", name, signal);
            GENERIC_FAILURE
        }
        Termination::ExecFailed(_) | Termination::Unknown => {
            log::info!("{} did not exit normally", name);
            GENERIC_FAILURE
        }
    }
}

/// What a [`LineSource`] produced for one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// The user abandoned the current line (Ctrl-C).
    Interrupted,
    Eof,
}

/// Interactive input with history, as consumed by [`Interpreter::repl`].
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<ReadOutcome>;

    /// Record a line in the history. Failures are not reported.
    fn add_history(&mut self, line: &str);
}

/// [`LineSource`] backed by a rustyline editor.
pub struct EditorLineSource {
    editor: DefaultEditor,
}

impl EditorLineSource {
    pub fn new() -> rustyline::Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for EditorLineSource {
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<ReadOutcome> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadOutcome::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(err) => Err(err.into()),
        }
    }

    fn add_history(&mut self, line: &str) {
        if let Err(e) = self.editor.add_history_entry(line) {
            log::debug!("history not updated: {}", e);
        }
    }
}

/// The interactive shell: prompt, read, parse, execute, repeat.
pub struct Interpreter<S = ProcessSpawner> {
    executor: Executor<S>,
    debug: bool,
}

impl Interpreter {
    /// Interpreter over the current process environment that launches real processes.
    pub fn new() -> Self {
        Self::with_executor(Executor::new(Environment::new()))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Spawner> Interpreter<S> {
    pub fn with_executor(executor: Executor<S>) -> Self {
        Self {
            executor,
            debug: false,
        }
    }

    /// Dump every executed [`Command`] to stdout after it ran.
    pub fn debug(mut self, on: bool) -> Self {
        self.debug = on;
        self
    }

    pub fn executor(&self) -> &Executor<S> {
        &self.executor
    }

    /// Parse and execute a single line, returning the finished command.
    pub fn run(&mut self, line: &str) -> Command {
        let mut command = Command::parse(line);
        self.executor.execute(&mut command);
        command
    }

    /// Read-Eval-Print Loop on the process's stdout and stderr.
    ///
    /// Returns the status the shell should exit with.
    pub fn repl(&mut self, source: &mut dyn LineSource) -> ExitCode {
        self.repl_with(source, &mut io::stdout(), &mut io::stderr())
    }

    pub fn repl_with(
        &mut self,
        source: &mut dyn LineSource,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> ExitCode {
        loop {
            let prompt = prompt(self.executor.env());
            let line = match source.read_line(&prompt) {
                Ok(ReadOutcome::Line(line)) => line,
                Ok(ReadOutcome::Interrupted) => continue,
                Ok(ReadOutcome::Eof) => {
                    let _ = writeln!(stdout, "exit");
                    return 0;
                }
                Err(e) => {
                    log::error!("failed to read input: {:#}", e);
                    return GENERIC_FAILURE;
                }
            };
            if line.is_empty() {
                continue;
            }
            source.add_history(&line);

            let mut command = Command::parse(&line);
            if command.name().is_empty() {
                continue;
            }
            if command.is_exit() {
                return command.exit_status().unwrap_or_else(|e| {
                    let _ = writeln!(stderr, "{}: {}", SHELL_NAME, e);
                    2
                });
            }

            let code = self.executor.execute_with(&mut command, stdout, stderr);
            log::debug!("{} finished with {}", command.name(), code);
            if self.debug {
                let _ = write!(stdout, "{}", command);
            }
        }
    }
}

/// `[user@host cwd]$ `, with `#` for the superuser.
fn prompt(env: &Environment) -> String {
    // SAFETY: geteuid has no preconditions and cannot fail.
    let is_root = unsafe { libc::geteuid() } == 0;
    format_prompt(
        env.user_name().unwrap_or("?"),
        &host_name().unwrap_or_else(|| "localhost".into()),
        &env.current_dir.display().to_string(),
        is_root,
    )
}

fn format_prompt(user: &str, host: &str, cwd: &str, is_root: bool) -> String {
    let sigil = if is_root { '#' } else { '$' };
    format!("[{}@{} {}]{} ", user, host, cwd, sigil)
}

fn host_name() -> Option<String> {
    let mut buf = [0u8; 256];
    // SAFETY: the buffer is valid for writes of its full length.
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast(), buf.len()) };
    if rc != 0 {
        return None;
    }
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    Some(String::from_utf8_lossy(&buf[..end]).into_owned())
}
