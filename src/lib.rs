//! `dsh`, a small interactive command interpreter.
//!
//! Each input line is split on spaces into a [`Command`], which is either run
//! in-process as a builtin (`cd`, `exit`) or resolved against `PATH`, checked
//! for being runnable and launched as a child process. The child's termination
//! state becomes the command's result code: its exit status, 126 when the file
//! cannot be executed, 127 when nothing was found and 1 when it was killed.
//!
//! The main entry points are [`Executor`], which runs one command, and
//! [`Interpreter`], which drives the interactive read loop over a
//! [`LineSource`]. Process creation sits behind the [`Spawner`] trait so the
//! status handling can be exercised without launching anything.

mod builtin;
pub mod command;
pub mod env;
pub mod error;
pub mod external;
mod interpreter;
pub mod lexer;
pub mod validate;

/// Name used as the prefix of every diagnostic the shell prints.
pub const SHELL_NAME: &str = "dsh";

pub use command::{Command, ExitCode};
pub use env::Environment;
pub use error::CommandError;
pub use external::{ProcessSpawner, SpawnRequest, Spawner, Termination};
pub use interpreter::{
    EditorLineSource, Executor, GENERIC_FAILURE, Interpreter, LineSource, ReadOutcome,
};
