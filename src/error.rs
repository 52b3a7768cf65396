//! Failures that stop an external command before or while it is launched.

use std::io;

use crate::command::ExitCode;

/// Result code reported when a command cannot be found.
pub const NOT_FOUND: ExitCode = 127;
/// Result code reported when a command is found but cannot be executed.
pub const NOT_EXECUTABLE: ExitCode = 126;
/// Result code reported when the child could not load the program.
pub const EXEC_FAILED: ExitCode = 255;

/// Classified reasons an external command did not run.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{name}: command not found")]
    NotFound { name: String },

    #[error("{name}: permission denied")]
    PermissionDenied { name: String },

    #[error("{name}: is a directory")]
    IsADirectory { name: String },

    #[error("{name}: cannot execute: {source}")]
    Exec {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("{name}: failed to spawn process: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },
}

impl CommandError {
    /// The result code this failure stands for.
    ///
    /// A spawn failure has none: the command keeps whatever code it had.
    pub fn exit_code(&self) -> Option<ExitCode> {
        match self {
            CommandError::NotFound { .. } => Some(NOT_FOUND),
            CommandError::PermissionDenied { .. } | CommandError::IsADirectory { .. } => {
                Some(NOT_EXECUTABLE)
            }
            CommandError::Exec { .. } => Some(EXEC_FAILED),
            CommandError::Spawn { .. } => None,
        }
    }
}
