use crate::env::Environment;
use crate::lexer::{self, DELIMITER};
use anyhow::Result;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// 126 and 127 are reserved for "not executable" and "not found".
pub type ExitCode = i32;

/// Name that ends the interactive session.
pub const EXIT_COMMAND: &str = "exit";

/// One parsed invocation: its argument vector, where it resolved to and how it ended.
///
/// A `Command` is built fresh for every input line, executed once and then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    arguments: Vec<String>,
    resolved_path: Option<PathBuf>,
    result_code: ExitCode,
}

impl Command {
    /// Parse a raw input line. Never fails.
    ///
    /// A line with no tokens at all produces a single empty argument, which no
    /// lookup can resolve.
    pub fn parse(line: &str) -> Self {
        let mut arguments = lexer::split_into_tokens(line, DELIMITER);
        if arguments.is_empty() {
            arguments.push(String::new());
        }
        Self {
            arguments,
            resolved_path: None,
            result_code: 0,
        }
    }

    /// The command name, always equal to `arguments()[0]`.
    pub fn name(&self) -> &str {
        &self.arguments[0]
    }

    /// Full argument vector handed to the child, name included.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Arguments following the name.
    pub fn args(&self) -> &[String] {
        &self.arguments[1..]
    }

    pub fn resolved_path(&self) -> Option<&Path> {
        self.resolved_path.as_deref()
    }

    pub(crate) fn set_resolved_path(&mut self, path: Option<PathBuf>) {
        debug_assert!(self.resolved_path.is_none(), "path resolved twice");
        self.resolved_path = path;
    }

    pub fn result_code(&self) -> ExitCode {
        self.result_code
    }

    pub fn set_result_code(&mut self, code: ExitCode) {
        self.result_code = code;
    }

    /// Whether this line asks the read loop to stop.
    pub fn is_exit(&self) -> bool {
        self.name() == EXIT_COMMAND
    }

    /// Code the session should end with when [`Command::is_exit`] holds.
    ///
    /// Only the first argument is considered.
    pub fn exit_status(&self) -> Result<ExitCode> {
        crate::builtin::parse_exit_code(self.args().first().map(String::as_str))
    }
}

impl fmt::Display for Command {
    /// Human-readable dump used by the `--debug` flag.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== COMMAND SUMMARY ===")?;
        writeln!(f, "name\t{}", self.name())?;
        match &self.resolved_path {
            Some(path) => writeln!(f, "path\t{}", path.display())?,
            None => writeln!(f, "path\t(none)")?,
        }
        writeln!(f, "argc\t{}", self.arguments.len())?;
        for (i, arg) in self.arguments.iter().enumerate() {
            writeln!(f, "argv[{}]\t{}", i, arg)?;
        }
        writeln!(f, "rc\t{}", self.result_code)?;
        writeln!(f, "=======================")
    }
}

/// Object-safe trait for any command the shell runs in-process.
pub trait ExecutableCommand {
    /// Executes the command.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`.
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided name and arguments.
    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>>;
}
