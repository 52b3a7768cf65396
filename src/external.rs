use std::ffi::OsStr;
use std::io;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// Resolve a command name the way a typical shell would.
///
/// Behavior:
/// - Name containing a `/` (absolute, `./foo`, `bin/sh`): returned unchanged if it
///   exists. The search path is not consulted.
/// - Bare name: each non-empty entry of the colon-separated `search_paths` is tried
///   left to right and the first existing `dir/name` wins.
/// - Empty name, missing search path or no match: `None`.
///
/// Only existence is checked here; whether the file may be executed is decided
/// by [`crate::validate::validate`].
pub fn find_command_path(search_paths: Option<&OsStr>, name: &str) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    if name.contains('/') {
        return find_by_path(Path::new(name)).map(Path::to_path_buf);
    }
    find_in_path(search_paths?, OsStr::new(name))
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    for dir in std::env::split_paths(search_paths) {
        if dir.as_os_str().is_empty() {
            continue;
        }
        let path = dir.join(cmd);
        if find_by_path(&path).is_some() {
            log::debug!("resolved {} to {}", cmd.to_string_lossy(), path.display());
            return Some(path);
        }
    }
    None
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.exists() { Some(path) } else { None }
}

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Normal exit with the given status.
    Exited(i32),
    /// Killed by the given signal.
    Signaled(i32),
    /// The child could not load the program; carries the OS error number.
    ExecFailed(i32),
    /// Anything else the platform reports.
    Unknown,
}

impl From<ExitStatus> for Termination {
    fn from(status: ExitStatus) -> Self {
        match (status.code(), status.signal()) {
            (Some(code), _) => Termination::Exited(code),
            (None, Some(signal)) => Termination::Signaled(signal),
            (None, None) => Termination::Unknown,
        }
    }
}

/// Everything needed to start one child process.
#[derive(Debug, Clone, Copy)]
pub struct SpawnRequest<'a> {
    /// Executable to load.
    pub program: &'a Path,
    /// Argument vector; element 0 is the name as the user typed it.
    pub argv: &'a [String],
    /// Working directory of the child.
    pub current_dir: &'a Path,
}

/// Starts a child process and blocks until it terminates.
///
/// The interpreter only ever talks to this trait, so tests can script the
/// outcome without launching anything.
pub trait Spawner {
    fn spawn_and_wait(&mut self, request: &SpawnRequest<'_>) -> io::Result<Termination>;
}

/// [`Spawner`] backed by `std::process::Command`.
///
/// The child inherits stdin, stdout, stderr and the process environment.
/// Only a failure to create the process (`EAGAIN`, `ENOMEM`) is returned as an
/// error; anything that goes wrong after that, such as `execve` rejecting the
/// file, is reported as [`Termination::ExecFailed`].
#[derive(Debug, Default)]
pub struct ProcessSpawner;

impl Spawner for ProcessSpawner {
    fn spawn_and_wait(&mut self, request: &SpawnRequest<'_>) -> io::Result<Termination> {
        let (arg0, rest) = match request.argv.split_first() {
            Some((first, rest)) => (first.as_str(), rest),
            None => (request.program.as_os_str().to_str().unwrap_or_default(), &[][..]),
        };
        let spawned = std::process::Command::new(request.program)
            .arg0(arg0)
            .args(rest)
            .current_dir(request.current_dir)
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                return match e.raw_os_error() {
                    Some(errno) if !is_fork_failure(errno) => {
                        log::debug!("exec of {} failed: {}", request.program.display(), e);
                        Ok(Termination::ExecFailed(errno))
                    }
                    _ => Err(e),
                };
            }
        };
        log::debug!("spawned {} as pid {}", request.program.display(), child.id());
        let exit_status = child.wait()?;
        Ok(exit_status.into())
    }
}

fn is_fork_failure(errno: i32) -> bool {
    errno == libc::EAGAIN || errno == libc::ENOMEM
}
